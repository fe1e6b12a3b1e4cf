//! Document renderer for validation feedback.
//!
//! Turns rule outcomes into document mutations:
//! - per-field error nodes inside the field's group (`div.form-error`)
//! - a single summary alert at the top of the form (`div.form-alert`)
//! - the disabled / cleared state of the form controls
//!
//! The renderer holds no state of its own; everything it needs is looked up
//! in the document on each call.

use serde::Serialize;
use strum::Display;

use crate::config::ValidatorConfig;
use crate::dom::{Document, NodeId, Result};

pub const ARIA_INVALID: &str = "aria-invalid";
/// Attribute on an error node naming the id of the field it describes.
pub const ERROR_OWNER: &str = "data-field";

/// Visual variant of the summary alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AlertVariant {
    Success,
    Danger,
}

pub struct FormRenderer<'a> {
    doc: &'a mut Document,
    config: &'a ValidatorConfig,
}

impl<'a> FormRenderer<'a> {
    pub fn new(doc: &'a mut Document, config: &'a ValidatorConfig) -> Self {
        Self { doc, config }
    }

    /// Group an error for `field` belongs to: nearest `.form-group`, else the parent.
    fn group_of(&self, field: NodeId) -> Result<Option<NodeId>> {
        match self.doc.closest_with_class(field, &self.config.group_class)? {
            Some(group) => Ok(Some(group)),
            None => self.doc.parent(field),
        }
    }

    /// Replace the field's error annotation with `message`.
    pub fn set_error(&mut self, field: NodeId, message: &str) -> Result<()> {
        self.clear_error(field)?;
        let Some(group) = self.group_of(field)? else {
            // detached field: nowhere to put the message, still flag it
            return self.doc.set_attribute(field, ARIA_INVALID, "true");
        };
        let owner = self.doc.element_id(field)?.map(str::to_string);
        let err = self.doc.create_element("div");
        self.doc.add_class(err, &self.config.error_class)?;
        if let Some(owner) = owner {
            self.doc.set_attribute(err, ERROR_OWNER, owner)?;
        }
        self.doc.set_text(err, message)?;
        self.doc.append_child(group, err)?;
        self.doc.set_attribute(field, ARIA_INVALID, "true")
    }

    /// Remove the field's error node and invalid marker, if any.
    ///
    /// Only direct children of the group owned by this field are considered,
    /// so fields sharing a parent never clear each other's errors.
    pub fn clear_error(&mut self, field: NodeId) -> Result<()> {
        if let Some(group) = self.group_of(field)? {
            let owner = self.doc.element_id(field)?;
            let mut prev = None;
            for child in self.doc.children(group)? {
                if self.doc.has_class(*child, &self.config.error_class)?
                    && self.doc.attribute(*child, ERROR_OWNER)? == owner
                {
                    prev = Some(*child);
                    break;
                }
            }
            if let Some(prev) = prev {
                self.doc.delete(prev)?;
            }
        }
        self.doc.remove_attribute(field, ARIA_INVALID)
    }

    /// Remove every error node and invalid marker below `form`.
    pub fn clear_all_errors(&mut self, form: NodeId) -> Result<()> {
        for err in self
            .doc
            .find_descendants_by_class(form, &self.config.error_class)?
        {
            self.doc.delete(err)?;
        }
        for node in self.doc.descendants(form)? {
            self.doc.remove_attribute(node, ARIA_INVALID)?;
        }
        Ok(())
    }

    /// Show `message` as the form's only alert, returning the new alert node.
    pub fn show_alert(
        &mut self,
        form: NodeId,
        message: &str,
        variant: AlertVariant,
    ) -> Result<NodeId> {
        self.remove_alert(form)?;
        let alert = self.doc.create_element("div");
        self.doc.add_class(
            alert,
            &format!("{} alert alert-{variant}", self.config.alert_class),
        )?;
        self.doc.set_attribute(alert, "role", "status")?;
        self.doc.set_attribute(alert, "aria-live", "polite")?;
        self.doc.set_text(alert, message)?;
        self.doc.prepend_child(form, alert)?;
        Ok(alert)
    }

    /// Current alert node, if one is shown.
    pub fn current_alert(&self, form: NodeId) -> Result<Option<NodeId>> {
        self.doc.find_first_by_class(form, &self.config.alert_class)
    }

    pub fn remove_alert(&mut self, form: NodeId) -> Result<()> {
        if let Some(existing) = self.current_alert(form)? {
            self.doc.delete(existing)?;
        }
        Ok(())
    }

    /// Enable or disable every input, select, button and textarea in the form.
    pub fn set_controls_disabled(&mut self, form: NodeId, disabled: bool) -> Result<()> {
        for control in self.doc.find_controls(form)? {
            self.doc.set_disabled(control, disabled)?;
        }
        Ok(())
    }

    /// Empty the value of every editable control in the form.
    pub fn clear_fields(&mut self, form: NodeId) -> Result<()> {
        for node in self.doc.descendants(form)? {
            if self.doc.is_editable(node)? {
                self.doc.set_value(node, "")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Fixture {
        doc: Document,
        config: ValidatorConfig,
        form: NodeId,
        grouped: NodeId,
        bare: NodeId,
    }

    /// form > (div.form-group > input#email) + input#name (no group)
    fn fixture() -> Fixture {
        let mut doc = Document::new();
        let form = doc.create_element("form");
        doc.append_child(doc.root(), form).unwrap();

        let group = doc.create_element("div");
        doc.add_class(group, "form-group").unwrap();
        doc.append_child(form, group).unwrap();
        let grouped = doc.create_element("input");
        doc.set_id(grouped, "email").unwrap();
        doc.append_child(group, grouped).unwrap();

        let bare = doc.create_element("input");
        doc.set_id(bare, "name").unwrap();
        doc.append_child(form, bare).unwrap();

        Fixture {
            doc,
            config: ValidatorConfig::default(),
            form,
            grouped,
            bare,
        }
    }

    #[test]
    fn set_error_appends_to_group_and_marks_field() {
        let mut f = fixture();
        let mut r = FormRenderer::new(&mut f.doc, &f.config);
        r.set_error(f.grouped, "Please enter a valid email address.")
            .unwrap();

        let group = f.doc.parent(f.grouped).unwrap().unwrap();
        let children = f.doc.children(group).unwrap().to_vec();
        assert_eq!(children.len(), 2);
        let err = children[1];
        assert!(f.doc.has_class(err, "form-error").unwrap());
        assert_eq!(
            f.doc.text(err).unwrap(),
            "Please enter a valid email address."
        );
        assert_eq!(
            f.doc.attribute(f.grouped, ARIA_INVALID).unwrap(),
            Some("true")
        );
    }

    #[test]
    fn set_error_twice_keeps_one_node() {
        let mut f = fixture();
        let mut r = FormRenderer::new(&mut f.doc, &f.config);
        r.set_error(f.grouped, "first").unwrap();
        r.set_error(f.grouped, "second").unwrap();

        let errors = f.doc.find_descendants_by_class(f.form, "form-error").unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(f.doc.text(errors[0]).unwrap(), "second");
    }

    #[test]
    fn ungrouped_field_uses_parent() {
        let mut f = fixture();
        let mut r = FormRenderer::new(&mut f.doc, &f.config);
        r.set_error(f.bare, "Please enter your name.").unwrap();

        let last = *f.doc.children(f.form).unwrap().last().unwrap();
        assert!(f.doc.has_class(last, "form-error").unwrap());
    }

    #[test]
    fn clear_error_only_touches_that_field() {
        let mut f = fixture();
        let mut r = FormRenderer::new(&mut f.doc, &f.config);
        r.set_error(f.grouped, "email").unwrap();
        r.set_error(f.bare, "name").unwrap();
        r.clear_error(f.grouped).unwrap();

        let errors = f.doc.find_descendants_by_class(f.form, "form-error").unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(f.doc.text(errors[0]).unwrap(), "name");
        assert_eq!(f.doc.attribute(f.grouped, ARIA_INVALID).unwrap(), None);
        assert_eq!(f.doc.attribute(f.bare, ARIA_INVALID).unwrap(), Some("true"));
    }

    #[test]
    fn ungrouped_field_leaves_nested_group_errors_alone() {
        let mut f = fixture();
        let mut r = FormRenderer::new(&mut f.doc, &f.config);
        r.set_error(f.grouped, "email").unwrap();
        r.set_error(f.bare, "name").unwrap();
        r.clear_error(f.bare).unwrap();

        let errors = f.doc.find_descendants_by_class(f.form, "form-error").unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(f.doc.text(errors[0]).unwrap(), "email");
    }

    #[test]
    fn show_alert_replaces_previous_and_is_first_child() {
        let mut f = fixture();
        let mut r = FormRenderer::new(&mut f.doc, &f.config);
        let first = r
            .show_alert(f.form, "Please fix the errors above and try again.", AlertVariant::Danger)
            .unwrap();
        let second = r
            .show_alert(f.form, "Registration successful — thank you!", AlertVariant::Success)
            .unwrap();

        assert!(!f.doc.contains(first));
        assert_eq!(f.doc.children(f.form).unwrap()[0], second);
        assert_eq!(
            f.doc.to_html(second).unwrap(),
            "<div class=\"form-alert alert alert-success\" aria-live=\"polite\" role=\"status\">\
             Registration successful — thank you!</div>"
        );
        assert_eq!(
            f.doc.find_descendants_by_class(f.form, "form-alert").unwrap().len(),
            1
        );
    }

    #[test]
    fn controls_toggle_and_fields_clear() {
        let mut f = fixture();
        let button = f.doc.create_element("button");
        f.doc.set_text(button, "Register").unwrap();
        f.doc.append_child(f.form, button).unwrap();
        f.doc.set_value(f.grouped, "ada@example.com").unwrap();

        let mut r = FormRenderer::new(&mut f.doc, &f.config);
        r.set_controls_disabled(f.form, true).unwrap();
        r.clear_fields(f.form).unwrap();

        for control in [f.grouped, f.bare, button] {
            assert!(f.doc.is_disabled(control).unwrap());
        }
        assert_eq!(f.doc.value(f.grouped).unwrap(), "");
    }
}
