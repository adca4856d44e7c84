use std::borrow::Cow;

use rustc_hash::FxHashMap;

use crate::model::{HostTree, NodeKind};

/// Stable handle of a [`MemoryTree`] node. Handles are never reused.
pub type NodeId = u32;

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    name: String,
    description: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Simple owned host tree for tests, demos, and hosts that mirror their
/// render tree into plain data.
#[derive(Debug, Default)]
pub struct MemoryTree {
    nodes: FxHashMap<NodeId, Node>,
    roots: Vec<NodeId>,
    next_id: NodeId,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node under `parent` (or as a new root) and returns its handle.
    ///
    /// Returns `None` if `parent` is not part of the tree.
    pub fn push(
        &mut self,
        parent: Option<NodeId>,
        kind: NodeKind,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Option<NodeId> {
        if let Some(parent) = parent
            && !self.nodes.contains_key(&parent)
        {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                kind,
                name: name.into(),
                description: description.into(),
                parent,
                children: Vec::new(),
            },
        );
        match parent {
            Some(parent) => {
                if let Some(node) = self.nodes.get_mut(&parent) {
                    node.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        Some(id)
    }

    /// Removes a node together with its whole subtree.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };
        match node.parent {
            Some(parent) => {
                if let Some(parent) = self.nodes.get_mut(&parent) {
                    parent.children.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|root| *root != id),
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children);
            }
        }
        true
    }

    /// Replaces the one-line description of a node.
    pub fn set_description(&mut self, id: NodeId, description: impl Into<String>) -> bool {
        self.nodes.get_mut(&id).is_some_and(|node| {
            node.description = description.into();
            true
        })
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl HostTree for MemoryTree {
    type Id = NodeId;

    fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map_or(&[], |node| node.children.as_slice())
    }

    fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes.get(&id).map_or(NodeKind::Empty, |node| node.kind)
    }

    fn name(&self, id: NodeId) -> Cow<'_, str> {
        self.nodes
            .get(&id)
            .map_or(Cow::Borrowed(""), |node| Cow::Borrowed(node.name.as_str()))
    }

    fn description(&self, id: NodeId) -> Cow<'_, str> {
        self.nodes.get(&id).map_or(Cow::Borrowed(""), |node| {
            Cow::Borrowed(node.description.as_str())
        })
    }

    fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    fn size_hint(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_drops_whole_subtree() {
        let mut tree = MemoryTree::new();
        let root = tree.push(None, NodeKind::Root, "Root", "<div>").unwrap();
        let a = tree.push(Some(root), NodeKind::Component, "A", "").unwrap();
        let b = tree.push(Some(a), NodeKind::DomElement, "span", "<span/>").unwrap();
        let c = tree.push(Some(root), NodeKind::DomText, "", "\"hi\"").unwrap();

        assert!(tree.remove(a));

        assert!(!tree.contains(a));
        assert!(!tree.contains(b));
        assert_eq!(tree.children(root), &[c]);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn push_rejects_unknown_parent() {
        let mut tree = MemoryTree::new();
        assert_eq!(tree.push(Some(7), NodeKind::Empty, "", ""), None);
        assert!(tree.is_empty());
    }

    #[test]
    fn handles_are_not_reused() {
        let mut tree = MemoryTree::new();
        let first = tree.push(None, NodeKind::Root, "Root", "").unwrap();
        tree.remove(first);
        let second = tree.push(None, NodeKind::Root, "Root", "").unwrap();
        assert_ne!(first, second);
    }
}
