// ABOUTME: Arena-backed document tree used by the filter engine and writer.
// ABOUTME: Wraps ego_tree so parent/sibling links only change through atomic structural edits.

use ego_tree::{NodeId, Tree};

/// A node in the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Synthetic root container. Never an element, never has siblings.
    Fragment,
    Element(Element),
    Text(String),
    Comment(String),
}

impl Node {
    /// Shorthand for an element node with no attributes.
    pub fn element(name: impl Into<String>) -> Self {
        Node::Element(Element::new(name))
    }

    /// Shorthand for a text node.
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(value.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(value) => Some(value),
            _ => None,
        }
    }
}

/// An element: name, ordered attributes and serialization flags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Tag name. An empty name means "write the children only".
    pub name: String,
    attrs: Vec<(String, String)>,
    /// Written as `<name />` with no children, whatever the tag.
    pub forced_empty: bool,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            forced_empty: false,
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(k, _)| k == name)
    }

    /// Sets an attribute, keeping the position of an existing one.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|(k, _)| k == name)?;
        Some(self.attrs.remove(pos).1)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Removes and returns every attribute, in order.
    pub fn take_attrs(&mut self) -> Vec<(String, String)> {
        std::mem::take(&mut self.attrs)
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

/// The working tree. Nodes are addressed by stable `NodeId` handles; detached
/// nodes stay in the arena until the document is dropped.
#[derive(Debug, Clone)]
pub struct Document {
    tree: Tree<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document whose root is a fragment.
    pub fn new() -> Self {
        Self {
            tree: Tree::new(Node::Fragment),
        }
    }

    pub fn root(&self) -> NodeId {
        self.tree.root().id()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.tree.get(id).map(|n| n.value())
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.node(id).and_then(Node::as_element)
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(Node::as_text)
    }

    /// Element name, or None for non-elements.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.name.as_str())
    }

    pub fn is_fragment(&self, id: NodeId) -> bool {
        matches!(self.node(id), Some(Node::Fragment))
    }

    pub fn is_element_named(&self, id: NodeId, name: &str) -> bool {
        self.name(id) == Some(name)
    }

    /// Runs `f` against a mutable node value.
    pub fn with_node_mut<R>(&mut self, id: NodeId, f: impl FnOnce(&mut Node) -> R) -> Option<R> {
        let mut node = self.tree.get_mut(id)?;
        Some(f(node.value()))
    }

    /// Runs `f` against a mutable element; None when `id` is not an element.
    pub fn with_element_mut<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut Element) -> R,
    ) -> Option<R> {
        self.with_node_mut(id, |node| match node {
            Node::Element(el) => Some(f(el)),
            _ => None,
        })
        .flatten()
    }

    /// Replaces the value of a text node.
    pub fn set_text(&mut self, id: NodeId, value: impl Into<String>) {
        let value = value.into();
        self.with_node_mut(id, |node| {
            if let Node::Text(current) = node {
                *current = value;
            }
        });
    }

    // Navigation

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.get(id)?.parent().map(|n| n.id())
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.tree.get(id)?.prev_sibling().map(|n| n.id())
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.tree.get(id)?.next_sibling().map(|n| n.id())
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.tree.get(id)?.first_child().map(|n| n.id())
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.tree.get(id)?.last_child().map(|n| n.id())
    }

    /// Snapshot of the child handles, safe to hold across edits.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree
            .get(id)
            .map(|n| n.children().map(|c| c.id()).collect())
            .unwrap_or_default()
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        self.tree.get(id).is_some_and(|n| n.has_children())
    }

    // Structural edits. These are the only paths that change topology.

    /// Appends a new node as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, value: Node) -> Option<NodeId> {
        let mut parent = self.tree.get_mut(parent)?;
        Some(parent.append(value).id())
    }

    /// Inserts a new node immediately before `sibling`. None for the root.
    pub fn insert_before(&mut self, sibling: NodeId, value: Node) -> Option<NodeId> {
        self.parent(sibling)?;
        let mut sibling = self.tree.get_mut(sibling)?;
        Some(sibling.insert_before(value).id())
    }

    /// Inserts a new node immediately after `sibling`. None for the root.
    pub fn insert_after(&mut self, sibling: NodeId, value: Node) -> Option<NodeId> {
        self.parent(sibling)?;
        let mut sibling = self.tree.get_mut(sibling)?;
        Some(sibling.insert_after(value).id())
    }

    /// Moves an existing node to the end of `parent`'s children.
    pub fn append_existing(&mut self, parent: NodeId, child: NodeId) {
        if parent == child {
            return;
        }
        if let Some(mut parent) = self.tree.get_mut(parent) {
            parent.append_id(child);
        }
    }

    /// Moves an existing node to sit immediately before `sibling`.
    pub fn move_before(&mut self, sibling: NodeId, node: NodeId) {
        if sibling == node || self.parent(sibling).is_none() {
            return;
        }
        if let Some(mut sibling) = self.tree.get_mut(sibling) {
            sibling.insert_id_before(node);
        }
    }

    /// Unlinks a node (and its subtree) from its parent.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(mut node) = self.tree.get_mut(id) {
            node.detach();
        }
    }

    /// Replaces an element by its children. Returns the first hoisted child.
    pub fn replace_with_children(&mut self, id: NodeId) -> Option<NodeId> {
        self.parent(id)?;
        let children = self.children(id);
        for &child in &children {
            self.move_before(id, child);
        }
        self.detach(id);
        children.first().copied()
    }

    /// Re-appends the children of `parent` in the given order. `order` must be
    /// a permutation of the current children.
    pub fn reorder_children(&mut self, parent: NodeId, order: &[NodeId]) {
        for &child in order {
            self.append_existing(parent, child);
        }
    }
}
