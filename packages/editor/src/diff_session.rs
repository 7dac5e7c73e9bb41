//! Side-by-side comparison of a historical version with the current one.
//!
//! Values can be copied field by field in either direction; the diff is
//! recomputed after every copy. Saving writes the (possibly edited)
//! historical side back to the history log as a new version.

use crate::errors::EditorResult;
use crate::history_log::{HistoryEntry, HistoryLog};
use cfgtree_model::{copy_one_path, diff, Document, DiffPair};
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DiffSession {
    pub file: String,
    pub timestamp: String,
    /// Left side
    pub history: Document,
    /// Right side
    pub current: Document,
    pair: DiffPair,
}

impl DiffSession {
    pub fn new(file: impl Into<String>, timestamp: impl Into<String>, history: Document, current: Document) -> Self {
        let pair = diff(&history, &current);
        Self {
            file: file.into(),
            timestamp: timestamp.into(),
            history,
            current,
            pair,
        }
    }

    pub fn from_entry(entry: HistoryEntry, current: Document) -> Self {
        Self::new(entry.file, entry.timestamp, entry.document, current)
    }

    pub fn pair(&self) -> &DiffPair {
        &self.pair
    }

    pub fn flagged_paths(&self) -> BTreeSet<Vec<String>> {
        self.pair.flagged_paths()
    }

    pub fn refresh(&mut self) {
        self.pair = diff(&self.history, &self.current);
    }

    /// Copy the historical value at `path` into the current side
    pub fn copy_left_to_right<S: AsRef<str>>(&mut self, path: &[S]) {
        copy_one_path(&self.history, &mut self.current, path);
        self.refresh();
        debug!(flagged = self.pair.flagged_paths().len(), "Copied history value to current");
    }

    /// Copy the current value at `path` into the historical side
    pub fn copy_right_to_left<S: AsRef<str>>(&mut self, path: &[S]) {
        copy_one_path(&self.current, &mut self.history, path);
        self.refresh();
        debug!(flagged = self.pair.flagged_paths().len(), "Copied current value to history");
    }

    /// Append the historical side as a new version of the same file
    pub fn save_history_side(&self, log: &HistoryLog) -> EditorResult<HistoryEntry> {
        log.append(&self.file, &self.history)
    }
}
