//! # Tree Codec
//!
//! Converts between a [`Document`] and a [`ConfigTree`].
//!
//! Decoding:
//! - mappings become `Dict` containers
//! - lists containing mappings become `Sequence` containers with `[i]` children
//! - every other list becomes one leaf holding its list text
//! - scalars become leaves; checkbox fields get a checkbox control
//!
//! Encoding is the inverse walk. Containers whose children all carry empty
//! labels become lists; duplicate keys are disambiguated as `key_2`, `key_3`.

use crate::binding::unique_name;
use crate::codecs::{FieldCodec, NumericRange, Partition, TimeRanges};
use crate::errors::{CodecError, ModelResult};
use crate::field_type::FieldType;
use crate::list_text::{list_to_text, scalar_text, text_to_list_shaped, ListShape, ScalarHint};
use crate::path::{is_instance_counter_label, PathAddress};
use crate::registry::FieldTypeRegistry;
use crate::tree::{ConfigTree, LeafControl, NodeData, NodeId, NodeKind};
use serde_json::{Map, Value};
use tracing::warn;

/// A configuration document: an ordered top-level mapping
pub type Document = Map<String, Value>;

pub struct TreeCodec;

impl TreeCodec {
    pub fn decode(document: &Document, registry: &FieldTypeRegistry) -> ModelResult<ConfigTree> {
        let mut tree = ConfigTree::new();
        Self::decode_into(&mut tree, None, document, &PathAddress::root(), registry)?;
        Ok(tree)
    }

    /// Append the entries of `map` under `parent` (roots when `None`)
    pub fn decode_into(
        tree: &mut ConfigTree,
        parent: Option<NodeId>,
        map: &Map<String, Value>,
        prefix: &PathAddress,
        registry: &FieldTypeRegistry,
    ) -> ModelResult<()> {
        for (key, value) in map {
            Self::decode_entry(tree, parent, key, value, prefix, registry)?;
        }
        Ok(())
    }

    fn decode_entry(
        tree: &mut ConfigTree,
        parent: Option<NodeId>,
        label: &str,
        value: &Value,
        prefix: &PathAddress,
        registry: &FieldTypeRegistry,
    ) -> ModelResult<NodeId> {
        let address = prefix.child(label);
        let field_type = registry.field_type(&address);
        let locked = field_type.is_container()
            || (is_instance_counter_label(label)
                && registry.field_type(prefix) == &FieldType::Subgroup);

        match value {
            Value::Object(map) => {
                let id = tree.add_child(parent, NodeData::container(label).locked(locked))?;
                Self::decode_into(tree, Some(id), map, &address, registry)?;
                Ok(id)
            }
            Value::Array(items) if items.iter().any(Value::is_object) => {
                let mut data = NodeData::container(label).locked(locked);
                data.kind = NodeKind::Sequence;
                let id = tree.add_child(parent, data)?;
                for (index, item) in items.iter().enumerate() {
                    Self::decode_entry(tree, Some(id), &format!("[{index}]"), item, &address, registry)?;
                }
                Ok(id)
            }
            leaf => {
                let data = decode_leaf(label, leaf, field_type).locked(locked);
                tree.add_child(parent, data)
            }
        }
    }

    pub fn encode(tree: &ConfigTree, registry: &FieldTypeRegistry) -> Document {
        let mut document = Document::new();
        for id in tree.roots() {
            if let Some(node) = tree.get(*id) {
                let key = unique_name(&node.data.label, |k| document.contains_key(k));
                let value = Self::encode_node(tree, *id, &PathAddress::root(), registry);
                document.insert(key, value);
            }
        }
        document
    }

    /// Encode one node (and its descendants) to a document value
    pub fn encode_node(
        tree: &ConfigTree,
        id: NodeId,
        prefix: &PathAddress,
        registry: &FieldTypeRegistry,
    ) -> Value {
        let Some(node) = tree.get(id) else {
            return Value::Null;
        };
        let address = prefix.child(&node.data.label);

        if !node.is_container() {
            return encode_leaf(&node.data, registry.field_type(&address), &address);
        }

        let positional = !node.children.is_empty()
            && node.children.iter().all(|child| {
                tree.get(*child)
                    .is_some_and(|c| c.data.label.is_empty())
            });
        if positional || node.data.kind == NodeKind::Sequence {
            return Value::Array(
                node.children
                    .iter()
                    .map(|child| Self::encode_node(tree, *child, &address, registry))
                    .collect(),
            );
        }

        let mut map = Map::new();
        for child in &node.children {
            if let Some(child_node) = tree.get(*child) {
                let key = unique_name(&child_node.data.label, |k| map.contains_key(k));
                map.insert(key, Self::encode_node(tree, *child, &address, registry));
            }
        }
        Value::Object(map)
    }
}

fn decode_leaf(label: &str, value: &Value, field_type: &FieldType) -> NodeData {
    let (text, kind) = match value {
        Value::Array(items) => {
            let text = typed_text(value, field_type).unwrap_or_else(|| list_to_text(items));
            (text, NodeKind::List(ListShape::of(items)))
        }
        Value::Object(_) => (String::new(), NodeKind::Dict),
        scalar => (scalar_text(scalar), NodeKind::Scalar(ScalarHint::of(scalar))),
    };

    let mut data = NodeData::leaf(label, text, kind);
    data.control = match field_type {
        FieldType::Checkbox { off, on } => LeafControl::Checkbox {
            off: off.clone(),
            on: on.clone(),
        },
        FieldType::Disabled { .. } => LeafControl::Disabled,
        _ => LeafControl::Text,
    };
    data
}

fn typed_text(value: &Value, field_type: &FieldType) -> Option<String> {
    match field_type {
        FieldType::NumericRange => NumericRange::from_value(value).ok().map(|c| c.to_text()),
        FieldType::Partition => Partition::from_value(value).ok().map(|c| c.to_text()),
        FieldType::TimeRange => TimeRanges::from_value(value).ok().map(|c| c.to_text()),
        _ => None,
    }
}

fn typed_value(text: &str, field_type: &FieldType) -> Option<Result<Value, CodecError>> {
    let value = match field_type {
        FieldType::NumericRange => NumericRange::parse(text).map(|c| c.to_value()),
        FieldType::Partition => Partition::parse(text).map(|c| c.to_value()),
        FieldType::TimeRange => TimeRanges::parse(text).map(|c| c.to_value()),
        _ => return None,
    };
    Some(value)
}

fn encode_leaf(data: &NodeData, field_type: &FieldType, address: &PathAddress) -> Value {
    match typed_value(&data.value, field_type) {
        Some(Ok(value)) => {
            return match &data.kind {
                NodeKind::List(shape) => shape.restore_floats(value),
                _ => value,
            }
        }
        Some(Err(err)) => {
            warn!(path = %address, field_type = %field_type, error = %err, "Keeping raw text for field");
        }
        None => {}
    }

    let text = data.value.as_str();
    match &data.kind {
        NodeKind::List(shape) => Value::Array(text_to_list_shaped(text, shape)),
        NodeKind::Scalar(hint) => hint.restore(text),
        NodeKind::Dict => Value::Object(Map::new()),
        NodeKind::Sequence => Value::Array(Vec::new()),
    }
}
