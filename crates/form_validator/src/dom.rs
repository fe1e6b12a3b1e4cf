//! In-memory document tree.
//!
//! A small arena of element nodes standing in for the host page. Nodes are
//! addressed by generational [`NodeId`] handles. [`Document::remove`] only
//! detaches a node, so it can be re-inserted later; [`Document::delete`] frees
//! the whole subtree and its slots are reused by later elements. A handle to a
//! deleted node keeps failing with [`DomError::UnknownNode`] even after its
//! slot has been reused.
//!
//! Only the slice of DOM behavior the form validator relies on is modelled:
//! ids, class lists, attributes, text content, control values and the
//! disabled flag, plus ancestor/descendant queries.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;
use thiserror::Error;

/// Tags treated as interactive form controls.
pub const CONTROL_TAGS: [&str; 4] = ["input", "select", "button", "textarea"];

/// Tags whose `value` is user editable (and cleared on form reset).
pub const EDITABLE_TAGS: [&str; 3] = ["input", "select", "textarea"];

const VOID_TAGS: [&str; 2] = ["input", "br"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("cannot insert {child} into {parent}: would create a cycle")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("the document root cannot be deleted")]
    DeleteRoot,
}

pub type Result<T> = std::result::Result<T, DomError>;

/// Handle to a node inside one [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.generation == 0 {
            write!(f, "#{}", self.index)
        } else {
            write!(f, "#{}v{}", self.index, self.generation)
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    text: String,
    value: String,
    disabled: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-backed element tree with a `body` root.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<usize>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let body = Node {
            tag: "body".to_string(),
            ..Node::default()
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(body),
            }],
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached element. Attach it with [`Document::append_child`].
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let node = Node {
            tag: tag.to_ascii_lowercase(),
            ..Node::default()
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    /// Number of live nodes, attached or not, including the root.
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// True if `id` refers to a live node of this document.
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(DomError::UnknownNode(id))
    }

    // ---------------------------------------------------------------------
    // Tree structure
    // ---------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(self.node(id)?.children.as_slice())
    }

    /// True if `ancestor` is `node` itself or one of its ancestors.
    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> Result<bool> {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return Ok(true);
            }
            cursor = self.node(current)?.parent;
        }
        Ok(false)
    }

    /// True if the node is reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> Result<bool> {
        self.is_inclusive_ancestor(self.root, id)
    }

    fn insert_child(&mut self, parent: NodeId, child: NodeId, at_front: bool) -> Result<()> {
        self.node(parent)?;
        if self.is_inclusive_ancestor(child, parent)? {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        self.remove(child)?;
        let p = self.node_mut(parent)?;
        if at_front {
            p.children.insert(0, child);
        } else {
            p.children.push(child);
        }
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_child(parent, child, false)
    }

    /// Insert `child` as the first child of `parent`, moving it if attached elsewhere.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_child(parent, child, true)
    }

    /// Detach a node from its parent. Detaching a detached node is a no-op.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(());
        };
        self.node_mut(parent)?.children.retain(|c| *c != id);
        self.node_mut(id)?.parent = None;
        Ok(())
    }

    /// Detach a node and free it together with its whole subtree.
    ///
    /// Every handle into the subtree becomes unknown. The root cannot be deleted.
    pub fn delete(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(DomError::DeleteRoot);
        }
        self.remove(id)?;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let slot = &mut self.slots[current.index];
            if let Some(node) = slot.node.take() {
                stack.extend(node.children);
            }
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(current.index);
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Element properties
    // ---------------------------------------------------------------------

    pub fn tag(&self, id: NodeId) -> Result<&str> {
        Ok(self.node(id)?.tag.as_str())
    }

    pub fn element_id(&self, id: NodeId) -> Result<Option<&str>> {
        Ok(self.node(id)?.id.as_deref())
    }

    pub fn set_id(&mut self, id: NodeId, element_id: impl Into<String>) -> Result<()> {
        self.node_mut(id)?.id = Some(element_id.into());
        Ok(())
    }

    pub fn classes(&self, id: NodeId) -> Result<&[String]> {
        Ok(self.node(id)?.classes.as_slice())
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> Result<bool> {
        Ok(self.node(id)?.classes.iter().any(|c| c == class))
    }

    /// Add every whitespace separated class in `classes` (duplicates are skipped).
    pub fn add_class(&mut self, id: NodeId, classes: &str) -> Result<()> {
        let node = self.node_mut(id)?;
        for class in classes.split_whitespace() {
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_string());
            }
        }
        Ok(())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Result<Option<&str>> {
        Ok(self.node(id)?.attributes.get(name).map(String::as_str))
    }

    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        self.node_mut(id)?
            .attributes
            .insert(name.into(), value.into());
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<()> {
        self.node_mut(id)?.attributes.remove(name);
        Ok(())
    }

    pub fn text(&self, id: NodeId) -> Result<&str> {
        Ok(self.node(id)?.text.as_str())
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<()> {
        self.node_mut(id)?.text = text.into();
        Ok(())
    }

    pub fn value(&self, id: NodeId) -> Result<&str> {
        Ok(self.node(id)?.value.as_str())
    }

    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) -> Result<()> {
        self.node_mut(id)?.value = value.into();
        Ok(())
    }

    pub fn is_disabled(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.disabled)
    }

    pub fn set_disabled(&mut self, id: NodeId, disabled: bool) -> Result<()> {
        self.node_mut(id)?.disabled = disabled;
        Ok(())
    }

    pub fn is_control(&self, id: NodeId) -> Result<bool> {
        Ok(CONTROL_TAGS.contains(&self.tag(id)?))
    }

    pub fn is_editable(&self, id: NodeId) -> Result<bool> {
        Ok(EDITABLE_TAGS.contains(&self.tag(id)?))
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Descendants of `root` (excluding `root`) in document order.
    pub fn descendants(&self, root: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(root)?.children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id)?.children.iter().rev().copied());
        }
        Ok(out)
    }

    /// Nearest inclusive ancestor carrying `class`.
    pub fn closest_with_class(&self, id: NodeId, class: &str) -> Result<Option<NodeId>> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if self.has_class(current, class)? {
                return Ok(Some(current));
            }
            cursor = self.node(current)?.parent;
        }
        Ok(None)
    }

    pub fn find_descendant_by_id(&self, root: NodeId, element_id: &str) -> Result<Option<NodeId>> {
        for id in self.descendants(root)? {
            if self.element_id(id)? == Some(element_id) {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    pub fn find_descendants_by_class(&self, root: NodeId, class: &str) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        for id in self.descendants(root)? {
            if self.has_class(id, class)? {
                out.push(id);
            }
        }
        Ok(out)
    }

    pub fn find_first_by_class(&self, root: NodeId, class: &str) -> Result<Option<NodeId>> {
        Ok(self.find_descendants_by_class(root, class)?.into_iter().next())
    }

    /// Descendants of `root` that are interactive controls (input, select, button, textarea).
    pub fn find_controls(&self, root: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        for id in self.descendants(root)? {
            if self.is_control(id)? {
                out.push(id);
            }
        }
        Ok(out)
    }

    /// First attached element carrying `class`, searching from the document root.
    pub fn query_root_by_class(&self, class: &str) -> Option<NodeId> {
        self.find_first_by_class(self.root, class).ok().flatten()
    }

    // ---------------------------------------------------------------------
    // Serialization
    // ---------------------------------------------------------------------

    /// Deterministic HTML-like rendering of a subtree.
    pub fn to_html(&self, id: NodeId) -> Result<String> {
        let mut out = String::new();
        self.write_html(id, &mut out)?;
        Ok(out)
    }

    fn write_html(&self, id: NodeId, out: &mut String) -> Result<()> {
        let node = self.node(id)?;
        let _ = write!(out, "<{}", node.tag);
        if let Some(element_id) = &node.id {
            let _ = write!(out, " id=\"{}\"", escape(element_id));
        }
        if !node.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&node.classes.join(" ")));
        }
        for (name, value) in &node.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape(value));
        }
        if EDITABLE_TAGS.contains(&node.tag.as_str()) && !node.value.is_empty() {
            let _ = write!(out, " value=\"{}\"", escape(&node.value));
        }
        if node.disabled {
            out.push_str(" disabled");
        }
        out.push('>');
        if VOID_TAGS.contains(&node.tag.as_str()) {
            return Ok(());
        }
        out.push_str(&escape(&node.text));
        for child in &node.children {
            self.write_html(*child, out)?;
        }
        let _ = write!(out, "</{}>", node.tag);
        Ok(())
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
