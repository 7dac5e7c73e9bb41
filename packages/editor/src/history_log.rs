//! # History Log
//!
//! Every save appends the saved document to one JSON file:
//!
//! ```text
//! [
//!   ["pump.json", "2024-05-01 09:30:00", { ...document... }],
//!   ["pump.json", "2024-05-02 14:02:11", { ...document... }]
//! ]
//! ```
//!
//! Appending rewrites the whole file; a single writer is assumed.

use crate::errors::EditorResult;
use cfgtree_model::{Document, TIME_FORMAT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One saved version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, String, Document)", into = "(String, String, Document)")]
pub struct HistoryEntry {
    pub file: String,
    pub timestamp: String,
    pub document: Document,
}

impl From<(String, String, Document)> for HistoryEntry {
    fn from((file, timestamp, document): (String, String, Document)) -> Self {
        Self {
            file,
            timestamp,
            document,
        }
    }
}

impl From<HistoryEntry> for (String, String, Document) {
    fn from(entry: HistoryEntry) -> Self {
        (entry.file, entry.timestamp, entry.document)
    }
}

#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries in file order; a missing or empty file is an empty log
    pub fn load(&self) -> EditorResult<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Append `document` for `file`, stamped with the local time
    pub fn append(&self, file: &str, document: &Document) -> EditorResult<HistoryEntry> {
        let timestamp = chrono::Local::now().format(TIME_FORMAT).to_string();
        self.append_entry(HistoryEntry {
            file: file.to_string(),
            timestamp,
            document: document.clone(),
        })
    }

    pub fn append_entry(&self, entry: HistoryEntry) -> EditorResult<HistoryEntry> {
        let mut entries = self.load()?;
        entries.push(entry.clone());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;

        info!(file = %entry.file, timestamp = %entry.timestamp, total = entries.len(), "Appended history version");
        Ok(entry)
    }

    /// Versions grouped per file, newest first
    pub fn versions_by_file(&self) -> EditorResult<BTreeMap<String, Vec<HistoryEntry>>> {
        let mut grouped: BTreeMap<String, Vec<HistoryEntry>> = BTreeMap::new();
        for entry in self.load()? {
            grouped.entry(entry.file.clone()).or_default().push(entry);
        }
        for versions in grouped.values_mut() {
            versions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        }
        debug!(files = grouped.len(), "Grouped history versions");
        Ok(grouped)
    }

    pub fn find(&self, file: &str, timestamp: &str) -> EditorResult<Option<HistoryEntry>> {
        Ok(self
            .load()?
            .into_iter()
            .find(|e| e.file == file && e.timestamp == timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(x: i64) -> Document {
        json!({ "x": x }).as_object().cloned().unwrap()
    }

    fn entry(file: &str, timestamp: &str, x: i64) -> HistoryEntry {
        HistoryEntry {
            file: file.into(),
            timestamp: timestamp.into(),
            document: doc(x),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.json"));
        assert!(log.load().unwrap().is_empty());
    }

    #[test]
    fn test_wire_format_is_triples() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.json"));
        log.append_entry(entry("a.json", "2024-01-01 00:00:00", 1)).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(log.path()).unwrap()).unwrap();
        assert_eq!(raw, json!([["a.json", "2024-01-01 00:00:00", {"x": 1}]]));
    }

    #[test]
    fn test_versions_grouped_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("nested/history.json"));
        log.append_entry(entry("a.json", "2024-01-01 00:00:00", 1)).unwrap();
        log.append_entry(entry("b.json", "2024-01-02 00:00:00", 2)).unwrap();
        log.append_entry(entry("a.json", "2024-03-01 00:00:00", 3)).unwrap();

        let grouped = log.versions_by_file().unwrap();
        let a: Vec<_> = grouped["a.json"].iter().map(|e| e.timestamp.as_str()).collect();
        assert_eq!(a, vec!["2024-03-01 00:00:00", "2024-01-01 00:00:00"]);
        assert_eq!(grouped["b.json"].len(), 1);

        let found = log.find("a.json", "2024-01-01 00:00:00").unwrap().unwrap();
        assert_eq!(found.document, doc(1));
    }

    #[test]
    fn test_append_stamps_local_time() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.json"));
        let appended = log.append("a.json", &doc(1)).unwrap();
        assert!(cfgtree_model::codecs::parse_timestamp(&appended.timestamp).is_ok());
        assert_eq!(log.load().unwrap(), vec![appended]);
    }
}
