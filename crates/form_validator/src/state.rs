//! Form value snapshot.
//!
//! `FormValues` is the only input the validation rules see. It is captured
//! from the document right before validation (see `accessor.rs`) or built by
//! hand in tests:
//!
//! ```
//! use form_validator::{FieldKey, FormValues};
//!
//! let values = FormValues::builder()
//!     .set(FieldKey::Name, "Ada")
//!     .set(FieldKey::Email, "ada@example.com")
//!     .build();
//! assert_eq!(values.get(FieldKey::Name), Some("Ada"));
//! assert_eq!(values.get(FieldKey::Password), None);
//! ```
//!
//! A missing entry means the field's element is absent from the form, which
//! the rules treat as a failure for every required field.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::field::FieldKey;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct FormValues {
    values: BTreeMap<FieldKey, String>,
}

impl FormValues {
    pub fn builder() -> FormValuesBuilder {
        FormValuesBuilder::default()
    }

    /// Set (or replace) the value of a field.
    pub fn set_value(&mut self, key: FieldKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    /// Mark a field's element as absent.
    pub fn remove(&mut self, key: FieldKey) {
        self.values.remove(&key);
    }

    /// Current value, `None` when the element is absent.
    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    pub fn is_present(&self, key: FieldKey) -> bool {
        self.values.contains_key(&key)
    }
}

#[derive(Debug, Default)]
pub struct FormValuesBuilder {
    values: FormValues,
}

impl FormValuesBuilder {
    pub fn set(mut self, key: FieldKey, value: impl Into<String>) -> Self {
        self.values.set_value(key, value);
        self
    }

    pub fn build(self) -> FormValues {
        self.values
    }
}
