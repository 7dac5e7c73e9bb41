//! # Tree Edits
//!
//! User-level operations on a tab's [`ConfigTree`].
//!
//! ## Semantics
//!
//! ### Locked nodes
//! - Schema groups, subgroups and subgroup instances are locked
//! - Locked nodes cannot be renamed or removed; their values stay editable
//!
//! ### AddSubgroupInstance
//! - Instantiates the registry template stored for the subgroup's address
//! - New instance is labelled `"<parent> <n>"` (n = child count + 1) and locked
//! - Range fields start empty; point references take the supplied tag
//!
//! ### Adding under a leaf
//! - A leaf that gains children turns into a container and loses its text

use cfgtree_model::{
    list_text::scalar_text, ConfigTree, FieldType, FieldTypeRegistry, LeafControl, ModelError,
    NodeData, NodeId, NodeKind, PathAddress, Subtree, TreeCodec,
};
use serde_json::{Map, Value};
use thiserror::Error;

/// Semantic edits on the configuration tree
#[derive(Debug, Clone, PartialEq)]
pub enum TreeEdit {
    /// Replace a leaf's text
    SetValue { node: NodeId, value: String },

    /// Add a named leaf under `parent` (roots when `None`)
    AddParam {
        parent: Option<NodeId>,
        name: String,
        value: String,
    },

    /// Add one instance of a repeatable group
    AddSubgroupInstance {
        parent: NodeId,
        point_tag: Option<String>,
    },

    Remove { node: NodeId },

    Rename { node: NodeId, label: String },

    /// Insert a clipboard subtree under `target` (roots when `None`)
    Paste {
        target: Option<NodeId>,
        subtree: Subtree,
    },

    /// Flip a checkbox leaf between its two option labels
    ToggleCheckbox { node: NodeId },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Node '{0}' is locked by the schema")]
    Locked(String),

    #[error("No instance template registered for '{0}'")]
    NoTemplate(String),

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
}

impl From<ModelError> for MutationError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::NodeNotFound(id) => MutationError::NodeNotFound(id),
            other => MutationError::InvalidStructure(other.to_string()),
        }
    }
}

impl TreeEdit {
    /// Apply to `tree`, returning the node created by the edit (if any)
    pub fn apply(
        &self,
        tree: &mut ConfigTree,
        registry: &FieldTypeRegistry,
    ) -> Result<Option<NodeId>, MutationError> {
        match self {
            TreeEdit::SetValue { node, value } => {
                let current = tree.get(*node).ok_or_else(|| missing(*node))?;
                if current.is_container() {
                    return Err(MutationError::InvalidStructure(format!(
                        "'{}' is a container",
                        current.data.label
                    )));
                }
                tree.set_value(*node, value.clone())?;
                Ok(None)
            }

            TreeEdit::AddParam { parent, name, value } => {
                if let Some(parent) = parent {
                    make_container(tree, *parent)?;
                }
                let prefix = match parent {
                    Some(parent) => tree.address_of(*parent)?,
                    None => PathAddress::root(),
                };
                let mut entry = Map::new();
                entry.insert(name.clone(), Value::String(value.clone()));
                TreeCodec::decode_into(tree, *parent, &entry, &prefix, registry)?;
                Ok(tree.children(*parent).last().copied())
            }

            TreeEdit::AddSubgroupInstance { parent, point_tag } => {
                add_instance(tree, registry, *parent, point_tag.as_deref()).map(Some)
            }

            TreeEdit::Remove { node } => {
                ensure_unlocked(tree, *node)?;
                tree.remove(*node)?;
                Ok(None)
            }

            TreeEdit::Rename { node, label } => {
                ensure_unlocked(tree, *node)?;
                tree.rename(*node, label.clone())?;
                Ok(None)
            }

            TreeEdit::Paste { target, subtree } => {
                if let Some(target) = target {
                    make_container(tree, *target)?;
                }
                Ok(Some(tree.graft(*target, subtree.clone())?))
            }

            TreeEdit::ToggleCheckbox { node } => {
                let data = tree.data(*node)?;
                let LeafControl::Checkbox { off, on } = &data.control else {
                    return Err(MutationError::InvalidStructure(format!(
                        "'{}' is not a checkbox",
                        data.label
                    )));
                };
                let next = if data.value == *on { off.clone() } else { on.clone() };
                tree.set_value(*node, next)?;
                Ok(None)
            }
        }
    }

    /// Human-readable description used for the undo entry
    pub fn description(&self, tree: &ConfigTree) -> String {
        let label = |id: &NodeId| {
            tree.get(*id)
                .map(|n| n.data.label.clone())
                .unwrap_or_else(|| id.to_string())
        };
        match self {
            TreeEdit::SetValue { node, .. } => format!("Edit {}", label(node)),
            TreeEdit::AddParam { name, .. } => format!("Add {}", name),
            TreeEdit::AddSubgroupInstance { parent, .. } => {
                format!("Add instance of {}", label(parent))
            }
            TreeEdit::Remove { node } => format!("Delete {}", label(node)),
            TreeEdit::Rename { node, label: new } => format!("Rename {} to {}", label(node), new),
            TreeEdit::Paste { subtree, .. } => format!("Paste {}", subtree.data.label),
            TreeEdit::ToggleCheckbox { node } => format!("Toggle {}", label(node)),
        }
    }
}

fn missing(id: NodeId) -> MutationError {
    MutationError::NodeNotFound(id.to_string())
}

fn ensure_unlocked(tree: &ConfigTree, id: NodeId) -> Result<(), MutationError> {
    let data = tree.data(id)?;
    if data.locked {
        return Err(MutationError::Locked(data.label.clone()));
    }
    Ok(())
}

fn make_container(tree: &mut ConfigTree, id: NodeId) -> Result<(), MutationError> {
    let is_container = tree.get(id).ok_or_else(|| missing(id))?.is_container();
    if !is_container {
        let data = tree.data_mut(id)?;
        data.value.clear();
        data.kind = NodeKind::Dict;
        data.control = LeafControl::Text;
    }
    Ok(())
}

fn add_instance(
    tree: &mut ConfigTree,
    registry: &FieldTypeRegistry,
    parent: NodeId,
    point_tag: Option<&str>,
) -> Result<NodeId, MutationError> {
    let address = tree.address_of(parent)?;
    let template = registry
        .template(&address)
        .ok_or_else(|| MutationError::NoTemplate(address.to_string()))?;

    let mut entries = Map::new();
    for (key, value) in template {
        let field_type = registry.field_type(&address.join(key));
        let value = match (field_type, value) {
            (FieldType::NumericRange, Value::Array(_)) => Value::Array(Vec::new()),
            (FieldType::PointReference { .. }, _) => match point_tag {
                Some(tag) => Value::String(tag.to_string()),
                None => Value::String(scalar_text(value)),
            },
            (_, Value::Object(_) | Value::Array(_)) => value.clone(),
            (_, other) => Value::String(scalar_text(other)),
        };
        entries.insert(key.clone(), value);
    }

    make_container(tree, parent)?;
    let parent_label = tree.data(parent)?.label.clone();
    let count = tree.children(Some(parent)).len();
    let instance = tree.add_child(
        Some(parent),
        NodeData::container(format!("{} {}", parent_label, count + 1)).locked(true),
    )?;
    TreeCodec::decode_into(tree, Some(instance), &entries, &address, registry)?;
    Ok(instance)
}
