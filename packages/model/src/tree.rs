//! # Config Tree
//!
//! Arena of labelled nodes addressed by stable [`NodeId`]s. Parents hold
//! ordered child id lists and children hold a parent back-reference, so the
//! whole tree is a plain value: cloning it is a snapshot.

use crate::errors::{ModelError, ModelResult};
use crate::list_text::{ListShape, ScalarHint};
use crate::path::PathAddress;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Scalar(ScalarHint),
    /// List leaf edited as list text
    List(ListShape),
    Dict,
    /// List of mappings, children labelled `[i]`
    Sequence,
}

/// How a leaf's value is edited in place
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafControl {
    Text,
    Checkbox { off: String, on: String },
    Disabled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    pub label: String,
    /// Display text for leaves, empty for containers
    pub value: String,
    pub kind: NodeKind,
    /// Schema-prescribed node: no rename, no delete
    pub locked: bool,
    pub control: LeafControl,
}

impl NodeData {
    pub fn leaf(label: impl Into<String>, value: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            kind,
            locked: false,
            control: LeafControl::Text,
        }
    }

    pub fn text(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::leaf(label, value, NodeKind::Scalar(ScalarHint::Text))
    }

    pub fn container(label: impl Into<String>) -> Self {
        Self::leaf(label, String::new(), NodeKind::Dict)
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl TreeNode {
    /// Containers have children or were decoded from a mapping/sequence
    pub fn is_container(&self) -> bool {
        !self.children.is_empty() || matches!(self.data.kind, NodeKind::Dict | NodeKind::Sequence)
    }
}

/// Detached copy of a node and its descendants (clipboard payload)
#[derive(Debug, Clone, PartialEq)]
pub struct Subtree {
    pub data: NodeData,
    pub children: Vec<Subtree>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigTree {
    nodes: HashMap<NodeId, TreeNode>,
    roots: Vec<NodeId>,
    next_id: u32,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(&id)
    }

    fn node(&self, id: NodeId) -> ModelResult<&TreeNode> {
        self.nodes
            .get(&id)
            .ok_or_else(|| ModelError::NodeNotFound(id.to_string()))
    }

    fn node_mut(&mut self, id: NodeId) -> ModelResult<&mut TreeNode> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| ModelError::NodeNotFound(id.to_string()))
    }

    pub fn data(&self, id: NodeId) -> ModelResult<&NodeData> {
        Ok(&self.node(id)?.data)
    }

    pub fn data_mut(&mut self, id: NodeId) -> ModelResult<&mut NodeData> {
        Ok(&mut self.node_mut(id)?.data)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Children of `parent`, or the roots when `None`
    pub fn children(&self, parent: Option<NodeId>) -> &[NodeId] {
        match parent {
            None => &self.roots,
            Some(id) => self.nodes.get(&id).map_or(&[], |n| n.children.as_slice()),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    pub fn add_root(&mut self, data: NodeData) -> NodeId {
        let id = self.allocate(data, None);
        self.roots.push(id);
        id
    }

    /// Append a child; `None` appends a root
    pub fn add_child(&mut self, parent: Option<NodeId>, data: NodeData) -> ModelResult<NodeId> {
        let index = self.children(parent).len();
        self.insert_child(parent, index, data)
    }

    /// Insert a child at `index` (clamped to the sibling count)
    pub fn insert_child(
        &mut self,
        parent: Option<NodeId>,
        index: usize,
        data: NodeData,
    ) -> ModelResult<NodeId> {
        if let Some(parent_id) = parent {
            self.node(parent_id)?;
        }
        let id = self.allocate(data, parent);
        let siblings = match parent {
            None => &mut self.roots,
            Some(parent_id) => &mut self.node_mut(parent_id)?.children,
        };
        let index = index.min(siblings.len());
        siblings.insert(index, id);
        Ok(id)
    }

    fn allocate(&mut self, data: NodeData, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            TreeNode {
                data,
                parent,
                children: Vec::new(),
            },
        );
        id
    }

    /// Detach `id` and drop it with all descendants, returning the copy
    pub fn remove(&mut self, id: NodeId) -> ModelResult<Subtree> {
        let subtree = self.clone_subtree(id)?;
        let parent = self.parent(id);
        match parent {
            None => self.roots.retain(|root| *root != id),
            Some(parent_id) => self.node_mut(parent_id)?.children.retain(|c| *c != id),
        }

        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                pending.extend(node.children);
            }
        }
        Ok(subtree)
    }

    pub fn rename(&mut self, id: NodeId, label: impl Into<String>) -> ModelResult<()> {
        self.node_mut(id)?.data.label = label.into();
        Ok(())
    }

    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) -> ModelResult<()> {
        self.node_mut(id)?.data.value = value.into();
        Ok(())
    }

    /// Labels from the root down to `id`
    pub fn labels_of(&self, id: NodeId) -> ModelResult<Vec<String>> {
        let mut labels = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node(current)?;
            labels.push(node.data.label.clone());
            cursor = node.parent;
        }
        labels.reverse();
        Ok(labels)
    }

    /// Schema address of `id` (counter and index labels skipped)
    pub fn address_of(&self, id: NodeId) -> ModelResult<PathAddress> {
        Ok(PathAddress::from_labels(self.labels_of(id)?))
    }

    /// Follow labels from the roots; the first matching sibling wins
    pub fn find_by_labels<S: AsRef<str>>(&self, labels: &[S]) -> Option<NodeId> {
        let mut parent = None;
        let mut found = None;
        for label in labels {
            let next = self
                .children(parent)
                .iter()
                .copied()
                .find(|child| {
                    self.nodes
                        .get(child)
                        .is_some_and(|n| n.data.label == label.as_ref())
                })?;
            parent = Some(next);
            found = Some(next);
        }
        found
    }

    pub fn clone_subtree(&self, id: NodeId) -> ModelResult<Subtree> {
        let node = self.node(id)?;
        let children = node
            .children
            .iter()
            .map(|child| self.clone_subtree(*child))
            .collect::<ModelResult<Vec<_>>>()?;
        Ok(Subtree {
            data: node.data.clone(),
            children,
        })
    }

    /// Insert a detached subtree under `parent` with fresh ids
    pub fn graft(&mut self, parent: Option<NodeId>, subtree: Subtree) -> ModelResult<NodeId> {
        let id = self.add_child(parent, subtree.data)?;
        for child in subtree.children {
            self.graft(Some(id), child)?;
        }
        Ok(id)
    }

    /// Depth-first pre-order walk over every node
    pub fn walk(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        order
    }

    /// Depth of `id` below the roots (roots are depth 0)
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut cursor = self.parent(id);
        while let Some(parent) = cursor {
            depth += 1;
            cursor = self.parent(parent);
        }
        depth
    }
}
