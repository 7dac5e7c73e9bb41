//! Expansion and selection state of a tab's tree view.
//!
//! Node ids do not survive a reload, so state is keyed by label paths of the
//! form `root/<label>/<label>`.

use cfgtree_model::{ConfigTree, NodeId};
use std::collections::BTreeSet;

const ROOT_KEY: &str = "root";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeUiState {
    pub expanded: BTreeSet<String>,
    pub selected: Option<String>,
}

/// Label path key for `id`
pub fn node_key(tree: &ConfigTree, id: NodeId) -> Option<String> {
    let labels = tree.labels_of(id).ok()?;
    let mut key = String::from(ROOT_KEY);
    for label in labels {
        key.push('/');
        key.push_str(&label);
    }
    Some(key)
}

impl TreeUiState {
    pub fn capture<I>(tree: &ConfigTree, expanded: I, selected: Option<NodeId>) -> Self
    where
        I: IntoIterator<Item = NodeId>,
    {
        Self {
            expanded: expanded
                .into_iter()
                .filter_map(|id| node_key(tree, id))
                .collect(),
            selected: selected.and_then(|id| node_key(tree, id)),
        }
    }

    /// Resolve the expanded keys against a (possibly reloaded) tree
    pub fn expanded_ids(&self, tree: &ConfigTree) -> Vec<NodeId> {
        tree.walk()
            .into_iter()
            .filter(|id| {
                node_key(tree, *id).is_some_and(|key| self.expanded.contains(&key))
            })
            .collect()
    }

    pub fn selected_id(&self, tree: &ConfigTree) -> Option<NodeId> {
        let selected = self.selected.as_ref()?;
        tree.walk()
            .into_iter()
            .find(|id| node_key(tree, *id).as_ref() == Some(selected))
    }

    pub fn is_expanded(&self, tree: &ConfigTree, id: NodeId) -> bool {
        node_key(tree, id).is_some_and(|key| self.expanded.contains(&key))
    }

    pub fn set_expanded(&mut self, tree: &ConfigTree, id: NodeId, expanded: bool) {
        if let Some(key) = node_key(tree, id) {
            if expanded {
                self.expanded.insert(key);
            } else {
                self.expanded.remove(&key);
            }
        }
    }

    pub fn select(&mut self, tree: &ConfigTree, id: Option<NodeId>) {
        self.selected = id.and_then(|id| node_key(tree, id));
    }
}
