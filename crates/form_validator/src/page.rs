//! Registration page builder.
//!
//! Produces the document the validator expects:
//!
//! ```text
//! body
//! └── form.registration-form
//!     ├── div.form-group > label + input#name
//!     ├── div.form-group > label + input#email
//!     ├── div.form-group > label + input#password
//!     ├── div.form-group > label + input#confirm
//!     ├── div.form-group > label + input#number
//!     ├── button[type=submit]
//!     └── button[type=reset]
//! ```
//!
//! Variants (no groups, missing fields, no form at all) exist for hosts and
//! tests that need to exercise the degraded paths.

use crate::dom::{Document, NodeId, Result};
use crate::field::FieldKey;

#[derive(Debug, Clone)]
pub struct RegistrationPage {
    form_class: String,
    group_class: String,
    with_form: bool,
    with_groups: bool,
    omitted: Vec<FieldKey>,
}

impl Default for RegistrationPage {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationPage {
    pub fn new() -> Self {
        Self {
            form_class: "registration-form".to_string(),
            group_class: "form-group".to_string(),
            with_form: true,
            with_groups: true,
            omitted: Vec::new(),
        }
    }

    /// Use different form / group classes (see `ValidatorConfig`).
    pub fn classes(mut self, form_class: impl Into<String>, group_class: impl Into<String>) -> Self {
        self.form_class = form_class.into();
        self.group_class = group_class.into();
        self
    }

    /// Put the fields in a plain `div` instead of a registration form.
    pub fn without_form(mut self) -> Self {
        self.with_form = false;
        self
    }

    /// Place inputs directly in the form, without `.form-group` wrappers.
    pub fn without_groups(mut self) -> Self {
        self.with_groups = false;
        self
    }

    pub fn without_field(mut self, field: FieldKey) -> Self {
        if !self.omitted.contains(&field) {
            self.omitted.push(field);
        }
        self
    }

    pub fn build(self) -> Result<Document> {
        let mut doc = Document::new();
        self.populate(&mut doc)?;
        Ok(doc)
    }

    fn populate(&self, doc: &mut Document) -> Result<()> {
        let container = if self.with_form {
            let form = doc.create_element("form");
            doc.add_class(form, &self.form_class)?;
            doc.set_attribute(form, "novalidate", "")?;
            form
        } else {
            doc.create_element("div")
        };
        doc.append_child(doc.root(), container)?;

        for field in FieldKey::all().filter(|f| !self.omitted.contains(f)) {
            let parent = if self.with_groups {
                let group = doc.create_element("div");
                doc.add_class(group, &self.group_class)?;
                doc.append_child(container, group)?;
                group
            } else {
                container
            };
            self.add_field(doc, parent, field)?;
        }

        for (kind, text) in [("submit", "Register"), ("reset", "Clear")] {
            let button = doc.create_element("button");
            doc.set_attribute(button, "type", kind)?;
            doc.set_text(button, text)?;
            doc.append_child(container, button)?;
        }
        Ok(())
    }

    fn add_field(&self, doc: &mut Document, parent: NodeId, field: FieldKey) -> Result<()> {
        let id = field.element_id();
        let label = doc.create_element("label");
        doc.set_attribute(label, "for", id)?;
        doc.set_text(label, label_text(field))?;
        doc.append_child(parent, label)?;

        let input = doc.create_element("input");
        doc.set_id(input, id)?;
        doc.set_attribute(input, "name", id)?;
        doc.set_attribute(input, "type", input_type(field))?;
        doc.append_child(parent, input)?;
        Ok(())
    }
}

fn label_text(field: FieldKey) -> &'static str {
    match field {
        FieldKey::Name => "Full name",
        FieldKey::Email => "Email",
        FieldKey::Password => "Password",
        FieldKey::Confirm => "Confirm password",
        FieldKey::Number => "Phone (optional)",
    }
}

fn input_type(field: FieldKey) -> &'static str {
    match field {
        FieldKey::Name => "text",
        FieldKey::Email => "email",
        FieldKey::Password | FieldKey::Confirm => "password",
        FieldKey::Number => "tel",
    }
}
