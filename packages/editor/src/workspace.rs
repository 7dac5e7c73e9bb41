//! # Document Workspace
//!
//! Owns every open tab and the one registry shared between them. The active
//! tab is an explicit [`TabId`]; switching tabs rebinds the registry to the
//! incoming tab's model binding.
//!
//! Every mutating entry point snapshots the document first, so a failed
//! edit is rolled back and a successful one becomes exactly one undo entry.

use crate::config::EditorConfig;
use crate::diff_session::DiffSession;
use crate::document::{load_document, save_document, DocumentFormat, ModelBinding, OpenDocument, TabId};
use crate::errors::{EditorError, EditorResult};
use crate::field_editors::{EditContext, EditOutcome, EditorTable, Prompt};
use crate::filter::{split_keywords, visible_nodes};
use crate::history_log::{HistoryEntry, HistoryLog};
use crate::mutations::TreeEdit;
use crate::notice::Notice;
use crate::ui_state::TreeUiState;
use crate::undo_stack::EditCommand;
use cfgtree_model::binding::{self, bound_model, binding_key};
use cfgtree_model::{
    Document, FetchedModel, FieldTypeRegistry, NodeId, SchemaFile, SchemaNode, SchemaTree, Subtree,
};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Prefix of the display name given to new untitled tabs
pub const UNTITLED_PREFIX: &str = "未命名";

/// Prefix of tabs opened from the history log
pub const HISTORY_TAB_PREFIX: &str = "[历史]";

/// What to do when opening a file whose name is already open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Replace the open tab's content (history is discarded)
    Overwrite,
    /// Open alongside under a suffixed name
    KeepBoth,
    Skip,
}

pub struct DocumentWorkspace {
    config: EditorConfig,
    registry: FieldTypeRegistry,
    tabs: Vec<OpenDocument>,
    current: Option<TabId>,
    next_tab: u64,
    untitled_count: usize,
    editors: EditorTable,
    clipboard: Option<Subtree>,
    history_log: HistoryLog,
    /// Base directory for relative document paths
    documents_dir: PathBuf,
    /// Structures of models bound during this session, by model id
    known_structures: HashMap<String, SchemaTree>,
}

impl DocumentWorkspace {
    pub fn new(config: EditorConfig, registry: FieldTypeRegistry, history_log: HistoryLog) -> Self {
        Self {
            documents_dir: PathBuf::from(&config.documents_dir),
            config,
            registry,
            tabs: Vec::new(),
            current: None,
            next_tab: 1,
            untitled_count: 0,
            editors: EditorTable::standard(),
            clipboard: None,
            history_log,
            known_structures: HashMap::new(),
        }
    }

    /// Load the schema and history log named by `config`, relative to `cwd`.
    ///
    /// A missing schema file leaves every field as plain text.
    pub fn from_config(config: EditorConfig, cwd: &Path) -> EditorResult<Self> {
        let schema_path = config.schema_path(cwd);
        let registry = if schema_path.exists() {
            FieldTypeRegistry::from_schema_file(&SchemaFile::load(&schema_path)?)
        } else {
            warn!(path = %schema_path.display(), "Schema file not found, editing without field types");
            FieldTypeRegistry::default()
        };
        let history_log = HistoryLog::new(config.history_path(cwd));
        let documents_dir = config.documents_dir(cwd);
        Ok(Self {
            documents_dir,
            ..Self::new(config, registry, history_log)
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn registry(&self) -> &FieldTypeRegistry {
        &self.registry
    }

    pub fn history_log(&self) -> &HistoryLog {
        &self.history_log
    }

    pub fn documents_dir(&self) -> &Path {
        &self.documents_dir
    }

    /// Resolve a document path; relative paths are taken from the documents dir
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        self.documents_dir.join(path)
    }

    pub fn editors_mut(&mut self) -> &mut EditorTable {
        &mut self.editors
    }

    pub fn tabs(&self) -> &[OpenDocument] {
        &self.tabs
    }

    pub fn tab(&self, id: TabId) -> Option<&OpenDocument> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn current_id(&self) -> Option<TabId> {
        self.current
    }

    pub fn current(&self) -> Option<&OpenDocument> {
        self.current.and_then(|id| self.tab(id))
    }

    fn index_of(&self, id: TabId) -> EditorResult<usize> {
        self.tabs
            .iter()
            .position(|t| t.id == id)
            .ok_or(EditorError::TabNotFound(id))
    }

    fn current_index(&self) -> EditorResult<usize> {
        let id = self.current.ok_or(EditorError::NoActiveTab)?;
        self.index_of(id)
    }

    fn prefix(&self) -> &str {
        &self.config.binding_prefix
    }

    /// Rebind the registry to the active tab's binding
    fn sync_registry(&mut self) {
        let structure = self
            .current()
            .and_then(|t| t.binding.as_ref())
            .map(|b| b.structure.clone());
        self.registry.rebind(structure.as_ref());
    }

    fn detect_binding(&self, document: &Document) -> Option<ModelBinding> {
        let model_id = bound_model(document, self.prefix())?;
        let structure = self
            .known_structures
            .get(&model_id)
            .cloned()
            .unwrap_or_else(|| inferred_structure(document, &binding_key(self.prefix(), &model_id)));
        debug!(model = %model_id, "Detected bound model");
        Some(ModelBinding { model_id, structure })
    }

    fn add_tab(&mut self, name: String, path: Option<PathBuf>, document: Document) -> EditorResult<TabId> {
        let binding = self.detect_binding(&document);
        self.registry.rebind(binding.as_ref().map(|b| &b.structure));

        let id = TabId(self.next_tab);
        let tab = OpenDocument::new(id, name, path, document, &self.registry, self.config.undo_limit);
        let mut tab = match tab {
            Ok(tab) => tab,
            Err(err) => {
                self.sync_registry();
                return Err(err);
            }
        };
        tab.binding = binding;
        self.next_tab += 1;

        info!(tab = %id, name = %tab.name, "Opened tab");
        self.tabs.push(tab);
        self.current = Some(id);
        Ok(id)
    }

    /// Open a fresh tab filled with the schema defaults
    pub fn new_document(&mut self) -> EditorResult<TabId> {
        self.untitled_count += 1;
        let name = format!("{}{}", UNTITLED_PREFIX, self.untitled_count);
        let document = self.registry.default_document();
        self.add_tab(name, None, document)
    }

    /// Open a file. Returns `None` when skipped because of a name conflict.
    pub fn open(&mut self, path: &Path, policy: ConflictPolicy) -> EditorResult<Option<TabId>> {
        let path = self.resolve_path(path);
        let document = load_document(&path)?;
        let mut name = file_name(&path);

        if let Some(index) = self.tabs.iter().position(|t| t.name == name) {
            match policy {
                ConflictPolicy::Skip => {
                    info!(name = %name, "Already open, skipped");
                    return Ok(None);
                }
                ConflictPolicy::Overwrite => {
                    let id = self.tabs[index].id;
                    let binding = self.detect_binding(&document);
                    self.registry.rebind(binding.as_ref().map(|b| &b.structure));
                    let mut tab = OpenDocument::new(
                        id,
                        name,
                        Some(path),
                        document,
                        &self.registry,
                        self.config.undo_limit,
                    )?;
                    tab.binding = binding;
                    self.tabs[index] = tab;
                    self.current = Some(id);
                    info!(tab = %id, "Reloaded tab");
                    return Ok(Some(id));
                }
                ConflictPolicy::KeepBoth => {
                    let base = name.clone();
                    let mut counter = 1;
                    while self.tabs.iter().any(|t| t.name == name) {
                        name = format!("{}({})", base, counter);
                        counter += 1;
                    }
                }
            }
        }

        self.add_tab(name, Some(path), document).map(Some)
    }

    pub fn switch_to(&mut self, id: TabId) -> EditorResult<()> {
        self.index_of(id)?;
        self.current = Some(id);
        self.sync_registry();
        debug!(tab = %id, "Switched tab");
        Ok(())
    }

    /// Close a tab, dropping its history. The left neighbour becomes active;
    /// closing the last tab opens a new untitled one.
    pub fn close(&mut self, id: TabId) -> EditorResult<()> {
        let index = self.index_of(id)?;
        self.tabs.remove(index);
        info!(tab = %id, "Closed tab");

        if self.current == Some(id) {
            if self.tabs.is_empty() {
                self.current = None;
                self.new_document()?;
            } else {
                self.current = Some(self.tabs[index.saturating_sub(1)].id);
            }
            self.sync_registry();
        }
        Ok(())
    }

    pub fn rename(&mut self, id: TabId, name: impl Into<String>) -> EditorResult<()> {
        let index = self.index_of(id)?;
        self.tabs[index].name = name.into();
        Ok(())
    }

    /// Encoded content of any tab
    pub fn document(&mut self, id: TabId) -> EditorResult<Document> {
        let index = self.index_of(id)?;
        if self.current == Some(id) {
            return Ok(self.tabs[index].document(&self.registry));
        }
        let structure = self.tabs[index].binding.as_ref().map(|b| b.structure.clone());
        self.registry.rebind(structure.as_ref());
        let document = self.tabs[index].document(&self.registry);
        self.sync_registry();
        Ok(document)
    }

    pub fn current_document(&mut self) -> EditorResult<Document> {
        let id = self.current.ok_or(EditorError::NoActiveTab)?;
        self.document(id)
    }

    /// Write a tab to its file and append the saved content to the history log
    pub fn save(&mut self, id: TabId) -> EditorResult<Notice> {
        let document = self.document(id)?;
        let index = self.index_of(id)?;
        let path = self.tabs[index].path.clone().ok_or(EditorError::NotFileBacked)?;

        save_document(&path, &document)?;
        let tab = &mut self.tabs[index];
        tab.mark_saved(document.clone());

        if let Err(err) = self.history_log.append(&tab.name, &document) {
            warn!(error = %err, "Saved, but the history log could not be updated");
            return Ok(Notice::warning(format!("Saved {} (history not recorded: {})", tab.name, err)));
        }
        Ok(Notice::info(format!("Saved {}", tab.name)))
    }

    /// Save under a new path; a path without extension gets the default format's
    pub fn save_as(&mut self, id: TabId, path: &Path) -> EditorResult<Notice> {
        let index = self.index_of(id)?;
        let mut path = self.resolve_path(path);
        if path.extension().is_none() {
            path.set_extension(DocumentFormat::from_name(&self.config.default_format).extension());
        }

        let tab = &mut self.tabs[index];
        tab.name = file_name(&path);
        tab.format = DocumentFormat::from_path(&path);
        tab.path = Some(path);
        self.save(id)
    }

    pub fn ui_state_mut(&mut self) -> EditorResult<&mut TreeUiState> {
        let index = self.current_index()?;
        Ok(&mut self.tabs[index].ui_state)
    }

    /// Apply an edit to the active tab as one undo step.
    ///
    /// On failure the tab is restored to its pre-edit content.
    pub fn apply(&mut self, edit: TreeEdit) -> EditorResult<Option<NodeId>> {
        let index = self.current_index()?;
        let registry = &self.registry;
        let tab = &mut self.tabs[index];

        let old = tab.document(registry);
        let expanded = tab.ui_state.expanded.clone();
        let description = edit.description(&tab.tree);

        match edit.apply(&mut tab.tree, registry) {
            Ok(created) => {
                let new = tab.document(registry);
                debug!(tab = %tab.id, edit = %description, "Applied edit");
                tab.history
                    .push(EditCommand::new(old, new, description).with_expanded(expanded));
                Ok(created)
            }
            Err(err) => {
                if tab.document(registry) != old {
                    tab.install(&old, registry)?;
                }
                warn!(tab = %tab.id, edit = %description, error = %err, "Edit rejected");
                Err(err.into())
            }
        }
    }

    /// Replace the active tab's whole content as one undo step
    pub fn replace_document(&mut self, document: Document, description: &str) -> EditorResult<()> {
        let index = self.current_index()?;
        let registry = &self.registry;
        let tab = &mut self.tabs[index];
        let old = tab.document(registry);
        tab.install(&document, registry)?;
        let new = tab.document(registry);
        let expanded = tab.ui_state.expanded.clone();
        tab.history
            .push(EditCommand::new(old, new, description).with_expanded(expanded));
        self.reconcile_binding()
    }

    /// Edit a leaf through the strategy registered for its field type
    pub fn edit_value(&mut self, node: NodeId, prompt: &mut dyn Prompt) -> EditorResult<EditOutcome> {
        let index = self.current_index()?;
        let tree = &self.tabs[index].tree;
        let target = tree.get(node).ok_or_else(|| {
            EditorError::Mutation(crate::mutations::MutationError::NodeNotFound(node.to_string()))
        })?;
        if target.is_container() {
            return Ok(EditOutcome::Rejected(format!("{} has no value", target.data.label)));
        }

        let address = tree.address_of(node)?;
        let field_type = self.registry.field_type(&address);
        let ctx = EditContext {
            address: &address,
            label: &target.data.label,
            field_type,
        };
        let outcome = self.editors.open(&ctx, &target.data.value, prompt);

        if let EditOutcome::Changed(value) = &outcome {
            self.apply(TreeEdit::SetValue {
                node,
                value: value.clone(),
            })?;
        }
        Ok(outcome)
    }

    pub fn undo(&mut self) -> EditorResult<Notice> {
        let index = self.current_index()?;
        let registry = &self.registry;
        let tab = &mut self.tabs[index];

        let Some(command) = tab.history.undo() else {
            return Ok(Notice::warning("Nothing to undo"));
        };
        let (document, expanded) = (command.old_state.clone(), command.expanded.clone());
        let message = format!("Undo: {}", command.description);

        tab.install(&document, registry)?;
        tab.ui_state.expanded = expanded;
        self.reconcile_binding()?;
        Ok(Notice::info(message))
    }

    pub fn redo(&mut self) -> EditorResult<Notice> {
        let index = self.current_index()?;
        let registry = &self.registry;
        let tab = &mut self.tabs[index];

        let Some(command) = tab.history.redo() else {
            return Ok(Notice::warning("Nothing to redo"));
        };
        let (document, expanded) = (command.new_state.clone(), command.expanded.clone());
        let message = format!("Redo: {}", command.description);

        tab.install(&document, registry)?;
        tab.ui_state.expanded = expanded;
        self.reconcile_binding()?;
        Ok(Notice::info(message))
    }

    /// Keep the tab's binding record in step with its content after a
    /// snapshot was installed
    fn reconcile_binding(&mut self) -> EditorResult<()> {
        let index = self.current_index()?;
        let document = self.tabs[index].document(&self.registry);
        let detected = self.detect_binding(&document);

        let bound_before = self.tabs[index].binding.as_ref().map(|b| b.model_id.clone());
        if detected.as_ref().map(|b| &b.model_id) != bound_before.as_ref() {
            self.tabs[index].binding = detected;
            self.sync_registry();
            self.tabs[index].install(&document, &self.registry)?;
        }
        Ok(())
    }

    /// Merge fetched model parameters into the active tab as one undo step.
    ///
    /// An empty fetch changes nothing and yields an error notice.
    pub fn bind_model(&mut self, model_id: &str, fetched: FetchedModel) -> EditorResult<Notice> {
        if fetched.is_empty() {
            warn!(model = %model_id, "Model returned no parameters, binding skipped");
            return Ok(Notice::error(format!("Model {} returned no parameters", model_id)));
        }

        let index = self.current_index()?;
        let prefix = self.config.binding_prefix.clone();
        let old = self.tabs[index].document(&self.registry);
        let merged = binding::merge(&old, &fetched.params, model_id, &prefix);

        let structure = if fetched.structure.is_empty() {
            fetched.params.to_structure(&prefix, model_id)
        } else {
            fetched.structure
        };
        self.known_structures
            .insert(model_id.to_string(), structure.clone());
        self.registry.rebind(Some(&structure));

        let tab = &mut self.tabs[index];
        let expanded = tab.ui_state.expanded.clone();
        tab.install(&merged, &self.registry)?;
        let new = tab.document(&self.registry);
        tab.binding = Some(ModelBinding {
            model_id: model_id.to_string(),
            structure,
        });
        tab.history.push(
            EditCommand::new(old, new, format!("Bind model {}", model_id)).with_expanded(expanded),
        );

        info!(tab = %tab.id, model = %model_id, "Bound model");
        Ok(Notice::info(format!("Bound model {}", model_id)))
    }

    /// Report a failed parameter fetch; nothing is modified
    pub fn bind_failed(&self, model_id: &str, err: &dyn fmt::Display) -> Notice {
        error!(model = %model_id, error = %err, "Model parameter fetch failed");
        Notice::error(format!("Failed to fetch parameters of {}: {}", model_id, err))
    }

    /// Remove the active tab's bound subtree as one undo step
    pub fn unbind_model(&mut self) -> EditorResult<Notice> {
        let index = self.current_index()?;
        let prefix = self.config.binding_prefix.clone();
        let old = self.tabs[index].document(&self.registry);

        let model_id = match &self.tabs[index].binding {
            Some(binding) => Some(binding.model_id.clone()),
            None => bound_model(&old, &prefix),
        };
        let Some(model_id) = model_id else {
            return Ok(Notice::warning("No model is bound"));
        };

        let unbound = binding::unbind(&old, &model_id, &prefix);
        self.registry.rebind(None);

        let tab = &mut self.tabs[index];
        let expanded = tab.ui_state.expanded.clone();
        tab.install(&unbound, &self.registry)?;
        tab.binding = None;
        tab.history.push(
            EditCommand::new(old, unbound, format!("Unbind model {}", model_id))
                .with_expanded(expanded),
        );

        info!(tab = %tab.id, model = %model_id, "Unbound model");
        Ok(Notice::info(format!("Unbound model {}", model_id)))
    }

    pub fn copy(&mut self, node: NodeId) -> EditorResult<()> {
        let index = self.current_index()?;
        self.clipboard = Some(self.tabs[index].tree.clone_subtree(node)?);
        Ok(())
    }

    pub fn cut(&mut self, node: NodeId) -> EditorResult<()> {
        let index = self.current_index()?;
        let subtree = self.tabs[index].tree.clone_subtree(node)?;
        self.apply(TreeEdit::Remove { node })?;
        self.clipboard = Some(subtree);
        Ok(())
    }

    /// Paste the clipboard under `target`; `None` when the clipboard is empty
    pub fn paste(&mut self, target: Option<NodeId>) -> EditorResult<Option<NodeId>> {
        let Some(subtree) = self.clipboard.clone() else {
            return Ok(None);
        };
        self.apply(TreeEdit::Paste { target, subtree })
    }

    pub fn has_clipboard(&self) -> bool {
        self.clipboard.is_some()
    }

    /// Nodes of the active tab left visible by a keyword search
    pub fn filter(&self, input: &str) -> EditorResult<HashSet<NodeId>> {
        let tab = self.current().ok_or(EditorError::NoActiveTab)?;
        Ok(visible_nodes(&tab.tree, &split_keywords(input)))
    }

    pub fn history_versions(&self) -> EditorResult<BTreeMap<String, Vec<HistoryEntry>>> {
        self.history_log.versions_by_file()
    }

    fn history_entry(&self, file: &str, timestamp: &str) -> EditorResult<HistoryEntry> {
        self.history_log
            .find(file, timestamp)?
            .ok_or_else(|| EditorError::HistoryVersionNotFound {
                file: file.to_string(),
                timestamp: timestamp.to_string(),
            })
    }

    /// Open a saved version as a new, unsaved tab
    pub fn open_history_version(&mut self, file: &str, timestamp: &str) -> EditorResult<TabId> {
        let entry = self.history_entry(file, timestamp)?;
        let name = format!("{}{}-{}", HISTORY_TAB_PREFIX, file, timestamp);
        self.add_tab(name, None, entry.document)
    }

    /// Compare a saved version with the active tab
    pub fn diff_with_history(&mut self, file: &str, timestamp: &str) -> EditorResult<DiffSession> {
        let entry = self.history_entry(file, timestamp)?;
        let current = self.current_document()?;
        Ok(DiffSession::from_entry(entry, current))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Schema for a bound subtree whose model structure is unknown
fn inferred_structure(document: &Document, key: &str) -> SchemaTree {
    fn node_for(value: &Value) -> SchemaNode {
        match value {
            Value::Object(map) => SchemaNode::typed("group").with_children(
                map.iter()
                    .map(|(k, v)| (k.clone(), node_for(v)))
                    .collect(),
            ),
            other => SchemaNode::default().with_default(other.clone()),
        }
    }

    let mut structure = SchemaTree::new();
    if let Some(value) = document.get(key) {
        structure.insert(key.to_string(), node_for(value));
    }
    structure
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn workspace() -> (DocumentWorkspace, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.json"));
        let ws = DocumentWorkspace::new(EditorConfig::default(), FieldTypeRegistry::default(), log);
        (ws, dir)
    }

    #[test]
    fn test_untitled_tabs_are_numbered() {
        let (mut ws, _dir) = workspace();
        let first = ws.new_document().unwrap();
        let second = ws.new_document().unwrap();
        assert_eq!(ws.tab(first).unwrap().name, "未命名1");
        assert_eq!(ws.tab(second).unwrap().name, "未命名2");
        assert_eq!(ws.current_id(), Some(second));
    }

    #[test]
    fn test_close_activates_left_neighbour() {
        let (mut ws, _dir) = workspace();
        let a = ws.new_document().unwrap();
        let b = ws.new_document().unwrap();
        let c = ws.new_document().unwrap();
        ws.switch_to(b).unwrap();
        ws.close(b).unwrap();
        assert_eq!(ws.current_id(), Some(a));
        ws.close(a).unwrap();
        assert_eq!(ws.current_id(), Some(c));
    }

    #[test]
    fn test_closing_last_tab_opens_untitled() {
        let (mut ws, _dir) = workspace();
        let only = ws.new_document().unwrap();
        ws.close(only).unwrap();
        assert_eq!(ws.tabs().len(), 1);
        assert_eq!(ws.current().unwrap().name, "未命名2");
    }

    #[test]
    fn test_open_conflict_policies() {
        let (mut ws, dir) = workspace();
        let path = dir.path().join("a.json");
        std::fs::write(&path, r#"{"x": "1"}"#).unwrap();

        let first = ws.open(&path, ConflictPolicy::KeepBoth).unwrap().unwrap();
        assert_eq!(ws.open(&path, ConflictPolicy::Skip).unwrap(), None);

        let both = ws.open(&path, ConflictPolicy::KeepBoth).unwrap().unwrap();
        assert_eq!(ws.tab(both).unwrap().name, "a.json(1)");

        std::fs::write(&path, r#"{"x": "2"}"#).unwrap();
        let replaced = ws.open(&path, ConflictPolicy::Overwrite).unwrap().unwrap();
        assert_eq!(replaced, first);
        assert_eq!(ws.document(first).unwrap()["x"], json!("2"));
        assert_eq!(ws.tabs().len(), 2);
    }

    #[test]
    fn test_relative_paths_use_documents_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/pump.json"), r#"{"x": "1"}"#).unwrap();
        let config = EditorConfig {
            documents_dir: "docs".into(),
            ..EditorConfig::default()
        };
        let mut ws = DocumentWorkspace::from_config(config, dir.path()).unwrap();
        assert_eq!(ws.documents_dir(), dir.path().join("docs"));

        let tab = ws.open(Path::new("pump.json"), ConflictPolicy::KeepBoth).unwrap().unwrap();
        assert_eq!(ws.tab(tab).unwrap().path, Some(dir.path().join("docs/pump.json")));

        ws.save_as(tab, Path::new("copy")).unwrap();
        assert!(dir.path().join("docs/copy.json").exists());

        let absolute = dir.path().join("elsewhere.json");
        ws.save_as(tab, &absolute).unwrap();
        assert!(absolute.exists());
    }

    #[test]
    fn test_failed_open_changes_nothing() {
        let (mut ws, dir) = workspace();
        ws.new_document().unwrap();
        assert!(ws.open(&dir.path().join("missing.json"), ConflictPolicy::KeepBoth).is_err());
        assert_eq!(ws.tabs().len(), 1);
    }

    #[test]
    fn test_undo_on_empty_history_warns() {
        let (mut ws, _dir) = workspace();
        ws.new_document().unwrap();
        let notice = ws.undo().unwrap();
        assert_eq!(notice.level, crate::notice::NoticeLevel::Warning);
    }

    #[test]
    fn test_empty_fetch_leaves_document_untouched() {
        let (mut ws, _dir) = workspace();
        ws.new_document().unwrap();
        let before = ws.current_document().unwrap();
        let notice = ws.bind_model("M", FetchedModel::default()).unwrap();
        assert!(notice.is_error());
        assert_eq!(ws.current_document().unwrap(), before);
        assert!(!ws.current().unwrap().history.can_undo());
    }

    #[test]
    fn test_cut_and_paste() {
        let (mut ws, _dir) = workspace();
        ws.new_document().unwrap();
        let a = ws
            .apply(TreeEdit::AddParam { parent: None, name: "a".into(), value: "1".into() })
            .unwrap()
            .unwrap();
        ws.cut(a).unwrap();
        assert!(ws.current_document().unwrap().is_empty());

        ws.paste(None).unwrap();
        ws.paste(None).unwrap();
        assert_eq!(
            Value::Object(ws.current_document().unwrap()),
            json!({"a": "1", "a_2": "1"})
        );
    }

    #[test]
    fn test_filter_current_tab() {
        let (mut ws, _dir) = workspace();
        ws.new_document().unwrap();
        let pump = ws
            .apply(TreeEdit::AddParam { parent: None, name: "pump".into(), value: "1".into() })
            .unwrap()
            .unwrap();
        ws.apply(TreeEdit::AddParam { parent: None, name: "valve".into(), value: "2".into() })
            .unwrap();
        let visible = ws.filter("PUMP").unwrap();
        assert_eq!(visible.len(), 1);
        assert!(visible.contains(&pump));
    }
}
