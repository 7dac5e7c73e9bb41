//! # Edit History
//!
//! Per-tab undo/redo over whole-document snapshots.
//!
//! ## Design
//!
//! - Each command stores the document before *and* after its edit, both
//!   captured when the command is pushed
//! - Undo hands back the old snapshot and moves the command to the redo stack
//! - Redo hands back the new snapshot
//! - New commands clear the redo stack
//! - The expansion set at edit time travels with the command; selection
//!   does not
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = EditHistory::new();
//! history.push(EditCommand::new(before, after, "Edit x"));
//!
//! if let Some(command) = history.undo() {
//!     install(&command.old_state);
//! }
//! ```

use cfgtree_model::Document;
use std::collections::BTreeSet;

/// One undoable step
#[derive(Debug, Clone, PartialEq)]
pub struct EditCommand {
    pub old_state: Document,
    pub new_state: Document,
    pub description: String,
    /// Expanded node keys when the edit was made
    pub expanded: BTreeSet<String>,
}

impl EditCommand {
    pub fn new(old_state: Document, new_state: Document, description: impl Into<String>) -> Self {
        Self {
            old_state,
            new_state,
            description: description.into(),
            expanded: BTreeSet::new(),
        }
    }

    pub fn with_expanded(mut self, expanded: BTreeSet<String>) -> Self {
        self.expanded = expanded;
        self
    }
}

/// Undo/redo stack for one open document
#[derive(Debug, Clone)]
pub struct EditHistory {
    /// Applied commands (most recent last)
    undo_stack: Vec<EditCommand>,

    /// Undone commands (most recent last)
    redo_stack: Vec<EditCommand>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl EditHistory {
    /// Create a history with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    pub fn push(&mut self, command: EditCommand) {
        self.undo_stack.push(command);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // A new edit invalidates the redo branch
        self.redo_stack.clear();
    }

    /// Step back; the returned command's `old_state` is the document to install
    pub fn undo(&mut self) -> Option<&EditCommand> {
        let command = self.undo_stack.pop()?;
        self.redo_stack.push(command);
        self.redo_stack.last()
    }

    /// Step forward; the returned command's `new_state` is the document to install
    pub fn redo(&mut self) -> Option<&EditCommand> {
        let command = self.redo_stack.pop()?;
        self.undo_stack.push(command);
        self.undo_stack.last()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|c| c.description.as_str())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|c| c.description.as_str())
    }
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(x: i64) -> Document {
        json!({ "x": x }).as_object().cloned().unwrap()
    }

    #[test]
    fn test_history_creation() {
        let history = EditHistory::new();
        assert_eq!(history.undo_levels(), 0);
        assert_eq!(history.redo_levels(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_and_redo_snapshots() {
        let mut history = EditHistory::new();
        history.push(EditCommand::new(doc(1), doc(2), "Edit x"));

        assert_eq!(history.undo_description(), Some("Edit x"));
        assert_eq!(history.undo().unwrap().old_state, doc(1));
        assert!(history.can_redo());
        assert_eq!(history.redo_description(), Some("Edit x"));

        assert_eq!(history.redo().unwrap().new_state, doc(2));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_new_snapshot_is_not_overwritten_by_later_edits() {
        let mut history = EditHistory::new();
        history.push(EditCommand::new(doc(1), doc(2), "first"));
        history.push(EditCommand::new(doc(2), doc(3), "second"));

        assert_eq!(history.undo().unwrap().old_state, doc(2));
        assert_eq!(history.undo().unwrap().old_state, doc(1));
        // Redo of the first edit lands on its own result, not the latest state
        assert_eq!(history.redo().unwrap().new_state, doc(2));
        assert_eq!(history.redo().unwrap().new_state, doc(3));
    }

    #[test]
    fn test_empty_stack_is_noop() {
        let mut history = EditHistory::new();
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut history = EditHistory::new();
        history.push(EditCommand::new(doc(1), doc(2), "a"));
        history.undo();
        assert_eq!(history.redo_levels(), 1);

        history.push(EditCommand::new(doc(1), doc(5), "b"));
        assert_eq!(history.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut history = EditHistory::with_max_levels(2);
        for i in 0..3 {
            history.push(EditCommand::new(doc(i), doc(i + 1), format!("edit {}", i)));
        }
        assert_eq!(history.undo_levels(), 2);
        assert_eq!(history.undo().unwrap().old_state, doc(2));
    }

    #[test]
    fn test_unlimited_levels() {
        let mut history = EditHistory::with_max_levels(0);
        for i in 0..250 {
            history.push(EditCommand::new(doc(i), doc(i + 1), "edit"));
        }
        assert_eq!(history.undo_levels(), 250);
    }
}
