//! Keyword filter over a tab's tree.
//!
//! A node stays visible when its label or value contains any keyword
//! (case-insensitive), or when one of its descendants does.

use cfgtree_model::{ConfigTree, NodeId};
use std::collections::HashSet;

const KEYWORD_SEPARATORS: [char; 5] = [';', ',', '，', '；', ' '];

/// Split user input on ASCII/full-width separators and spaces
pub fn split_keywords(input: &str) -> Vec<String> {
    input
        .split(|c: char| KEYWORD_SEPARATORS.contains(&c))
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Visible node set; every node when `keywords` is empty
pub fn visible_nodes(tree: &ConfigTree, keywords: &[String]) -> HashSet<NodeId> {
    let all = tree.walk();
    if keywords.is_empty() {
        return all.into_iter().collect();
    }

    let mut visible = HashSet::new();
    for id in all {
        let Some(node) = tree.get(id) else {
            continue;
        };
        let label = node.data.label.to_lowercase();
        let value = node.data.value.to_lowercase();
        if !keywords.iter().any(|k| label.contains(k) || value.contains(k)) {
            continue;
        }

        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if !visible.insert(current) {
                break;
            }
            cursor = tree.parent(current);
        }
    }
    visible
}
