//! # Version Diff
//!
//! Side-by-side comparison of two documents sharing a schema.
//!
//! Each side is annotated against the other: a node is flagged when exactly
//! one of the two values is a mapping, or when two non-mapping values differ.
//! Mapping-vs-mapping nodes are never flagged themselves; only their
//! descendants are. A path missing on the other side compares as `null`.

use crate::codec::Document;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// One annotated node of a diff side
#[derive(Debug, Clone, PartialEq)]
pub struct DiffNode {
    pub key: String,
    /// Keys from the document root down to this node
    pub path: Vec<String>,
    /// Leaf value, `None` for mappings
    pub value: Option<Value>,
    pub different: bool,
    pub children: Vec<DiffNode>,
}

impl DiffNode {
    fn collect_flagged(&self, out: &mut BTreeSet<Vec<String>>) {
        if self.different {
            out.insert(self.path.clone());
        }
        for child in &self.children {
            child.collect_flagged(out);
        }
    }
}

/// Both annotated sides of a comparison
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffPair {
    pub left: Vec<DiffNode>,
    pub right: Vec<DiffNode>,
}

impl DiffPair {
    /// Every flagged path from either side
    pub fn flagged_paths(&self) -> BTreeSet<Vec<String>> {
        let mut out = BTreeSet::new();
        for node in self.left.iter().chain(&self.right) {
            node.collect_flagged(&mut out);
        }
        out
    }

    pub fn has_differences(&self) -> bool {
        !self.flagged_paths().is_empty()
    }
}

/// Compare `left` (e.g. a historical version) with `right`
pub fn diff(left: &Document, right: &Document) -> DiffPair {
    DiffPair {
        left: annotate(left, right, &[]),
        right: annotate(right, left, &[]),
    }
}

fn annotate(data: &Map<String, Value>, other_root: &Document, prefix: &[String]) -> Vec<DiffNode> {
    data.iter()
        .map(|(key, value)| {
            let mut path = prefix.to_vec();
            path.push(key.clone());

            let other = value_at(other_root, &path).unwrap_or(&Value::Null);
            let different = match (value, other) {
                (Value::Object(_), Value::Object(_)) => false,
                (Value::Object(_), _) | (_, Value::Object(_)) => true,
                (a, b) => a != b,
            };

            let (value, children) = match value {
                Value::Object(map) => (None, annotate(map, other_root, &path)),
                leaf => (Some(leaf.clone()), Vec::new()),
            };

            DiffNode {
                key: key.clone(),
                path,
                value,
                different,
                children,
            }
        })
        .collect()
}

/// Value at a key path, `None` when any segment is missing
pub fn value_at<'a, S: AsRef<str>>(document: &'a Document, path: &[S]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut current = document.get(first.as_ref())?;
    for key in rest {
        current = current.as_object()?.get(key.as_ref())?;
    }
    Some(current)
}

/// Copy the value at `path` from `source` into `dest`.
///
/// A missing source value copies as `null`. Missing or non-mapping
/// intermediate levels in `dest` are replaced by empty mappings; siblings
/// along the way are left alone.
pub fn copy_one_path<S: AsRef<str>>(source: &Document, dest: &mut Document, path: &[S]) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let value = value_at(source, path).cloned().unwrap_or(Value::Null);

    let mut level = dest;
    for key in parents {
        let slot = level
            .entry(key.as_ref().to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(next) = slot else {
            return;
        };
        level = next;
    }
    level.insert(last.as_ref().to_string(), value);
}
