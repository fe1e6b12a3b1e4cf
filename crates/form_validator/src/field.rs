//! Logical fields of the registration form.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};

/// One of the five fields the validator knows about.
///
/// The string form (`Display` / `AsRef<str>`) is the element id the field is
/// looked up by inside the form (`#name`, `#email`, ...).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FieldKey {
    Name,
    Email,
    Password,
    Confirm,
    /// Phone number. Optional: a blank value skips its rule entirely.
    Number,
}

impl FieldKey {
    pub fn element_id(self) -> &'static str {
        match self {
            FieldKey::Name => "name",
            FieldKey::Email => "email",
            FieldKey::Password => "password",
            FieldKey::Confirm => "confirm",
            FieldKey::Number => "number",
        }
    }

    pub fn is_optional(self) -> bool {
        matches!(self, FieldKey::Number)
    }

    /// Field whose element carries the given id, if any.
    pub fn from_element_id(element_id: &str) -> Option<Self> {
        FieldKey::iter().find(|k| k.element_id() == element_id)
    }

    pub fn all() -> impl Iterator<Item = FieldKey> {
        FieldKey::iter()
    }
}
