//! # Path Addresses
//!
//! A [`PathAddress`] names a *schema slot*, not a tree position. It is built
//! by joining node labels from the root with `/`, skipping instance counter
//! labels such as `"设备 1"` or `"通道 参数12"`. Every repeated instance of a
//! group therefore resolves to the same field types and options.
//!
//! ```text
//! 设备/设备 1/测点名   ->  设备/测点名
//! 设备/设备 2/测点名   ->  设备/测点名
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Separator between address segments
pub const SEPARATOR: char = '/';

fn counter_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // A space, any run of the counter literal, then digits.
    PATTERN.get_or_init(|| Regex::new(r" [参数]*[0-9]+").expect("static pattern compiles"))
}

/// Whether `label` marks one of several repeated sibling instances.
///
/// Matches anywhere in the label, so `"设备 1"`, `"泵 参数3"` and
/// `"Pump 12"` are all counters while `"Pump"` and `"x1"` are not.
pub fn is_instance_counter_label(label: &str) -> bool {
    counter_pattern().is_match(label)
}

/// Whether `label` is a positional `[i]` label given to sequence elements
pub fn is_index_label(label: &str) -> bool {
    label
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Schema-stable slash-joined key identifying a field
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathAddress(String);

impl PathAddress {
    /// The empty (root) address
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Build an address from root-to-node labels, skipping counter labels
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut address = Self::root();
        for label in labels {
            address = address.child(label.as_ref());
        }
        address
    }

    /// Wrap an already-joined address (used for schema keys)
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Append one segment; counter and index labels leave the address unchanged
    pub fn child(&self, label: &str) -> Self {
        if is_instance_counter_label(label) || is_index_label(label) {
            return self.clone();
        }
        self.join(label)
    }

    /// Append one segment unconditionally (schema keys are never counters)
    pub fn join(&self, key: &str) -> Self {
        if self.0.is_empty() {
            Self(key.to_string())
        } else {
            Self(format!("{}{}{}", self.0, SEPARATOR, key))
        }
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR).filter(|s| !s.is_empty())
    }

    /// Whether this address lives under `prefix` (or equals it)
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0 == prefix
            || (self.0.starts_with(prefix) && self.0[prefix.len()..].starts_with(SEPARATOR))
    }
}

impl fmt::Display for PathAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PathAddress {
    fn from(raw: &str) -> Self {
        Self::from_raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_labels() {
        assert!(is_instance_counter_label("设备 1"));
        assert!(is_instance_counter_label("设备 12"));
        assert!(is_instance_counter_label("通道 参数3"));
        assert!(is_instance_counter_label("Pump 2"));

        assert!(!is_instance_counter_label("设备"));
        assert!(!is_instance_counter_label("x1"));
        assert!(!is_instance_counter_label("Pump_2"));
        assert!(!is_instance_counter_label("a b"));
    }

    #[test]
    fn test_from_labels_skips_counters() {
        let first = PathAddress::from_labels(["设备", "设备 1", "测点名"]);
        let second = PathAddress::from_labels(["设备", "设备 2", "测点名"]);
        assert_eq!(first.as_str(), "设备/测点名");
        assert_eq!(first, second);
    }

    #[test]
    fn test_index_labels_are_skipped() {
        assert!(is_index_label("[0]"));
        assert!(is_index_label("[12]"));
        assert!(!is_index_label("[]"));
        assert!(!is_index_label("[a]"));

        let addr = PathAddress::from_labels(["列表", "[3]", "名称"]);
        assert_eq!(addr.as_str(), "列表/名称");
    }

    #[test]
    fn test_join_and_segments() {
        let addr = PathAddress::root().join("A").join("B");
        assert_eq!(addr.as_str(), "A/B");
        assert_eq!(addr.segments().collect::<Vec<_>>(), vec!["A", "B"]);
        assert!(addr.starts_with("A"));
        assert!(!addr.starts_with("AB"));
        assert!(PathAddress::root().is_root());
    }
}
