//! Field accessor capability.
//!
//! The validator never holds on to field elements between events. Every
//! submission asks a [`FieldAccessor`] for the current element handles and
//! values, keeping the document the single source of truth.

use crate::dom::{Document, NodeId};
use crate::field::FieldKey;
use crate::state::FormValues;

/// Maps logical field names to element handles and values.
pub trait FieldAccessor {
    /// Element backing the field, `None` if the form does not contain it.
    fn element(&self, field: FieldKey) -> Option<NodeId>;

    /// Current value of the field, `None` if the element is absent.
    fn value(&self, field: FieldKey) -> Option<String>;

    /// Values of every field at this instant.
    fn snapshot(&self) -> FormValues {
        let mut values = FormValues::default();
        for key in FieldKey::all() {
            if let Some(v) = self.value(key) {
                values.set_value(key, v);
            }
        }
        values
    }
}

/// [`FieldAccessor`] over the descendants of a form element.
pub struct DocumentFields<'a> {
    document: &'a Document,
    form: NodeId,
}

impl<'a> DocumentFields<'a> {
    pub fn new(document: &'a Document, form: NodeId) -> Self {
        Self { document, form }
    }
}

impl FieldAccessor for DocumentFields<'_> {
    fn element(&self, field: FieldKey) -> Option<NodeId> {
        self.document
            .find_descendant_by_id(self.form, field.element_id())
            .ok()
            .flatten()
    }

    fn value(&self, field: FieldKey) -> Option<String> {
        let node = self.element(field)?;
        self.document.value(node).ok().map(str::to_string)
    }
}
