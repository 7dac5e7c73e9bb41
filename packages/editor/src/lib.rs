//! # Config Tree Editor
//!
//! Multi-tab editing of configuration documents on top of `cfgtree-model`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: Document ⇄ ConfigTree, field types   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: DocumentWorkspace                   │
//! │  - Open/save tabs, history log              │
//! │  - Tree edits with snapshot undo/redo       │
//! │  - Field editors by field type              │
//! │  - Model binding and version diff           │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Document is source of truth**: the tree is rebuilt from snapshots on undo
//! 2. **One edit, one undo step**: failed edits leave the tab untouched
//! 3. **Explicit active tab**: the registry follows the active tab's binding
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cfgtree_editor::{ConflictPolicy, DocumentWorkspace, EditorConfig, TreeEdit};
//!
//! let mut ws = DocumentWorkspace::from_config(EditorConfig::load(&cwd)?, &cwd)?;
//! ws.open(Path::new("pump.json"), ConflictPolicy::KeepBoth)?;
//!
//! ws.apply(TreeEdit::AddParam { parent: None, name: "speed".into(), value: "10".into() })?;
//! ws.undo()?;
//!
//! let id = ws.current_id().unwrap();
//! ws.save(id)?;
//! ```

mod config;
mod diff_session;
mod document;
mod errors;
mod field_editors;
mod filter;
mod history_log;
mod mutations;
mod notice;
mod ui_state;
mod undo_stack;
mod workspace;

pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use diff_session::DiffSession;
pub use document::{load_document, save_document, DocumentFormat, ModelBinding, OpenDocument, TabId};
pub use errors::{EditorError, EditorResult};
pub use field_editors::{
    point_tag, EditContext, EditOutcome, EditorTable, Prompt, PromptKind, PromptRequest,
    ScriptedPrompt, ValueEditor,
};
pub use filter::{split_keywords, visible_nodes};
pub use history_log::{HistoryEntry, HistoryLog};
pub use mutations::{MutationError, TreeEdit};
pub use notice::{Notice, NoticeLevel};
pub use ui_state::{node_key, TreeUiState};
pub use undo_stack::{EditCommand, EditHistory};
pub use workspace::{ConflictPolicy, DocumentWorkspace, HISTORY_TAB_PREFIX, UNTITLED_PREFIX};
