//! # Open Documents
//!
//! One record per open tab: the live tree plus everything that belongs to
//! that tab alone (saved baseline, UI state, undo history, model binding).
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Decode → Edit → Encode → Save
//!   ↓       ↓        ↓       ↓       ↓
//! File    Tree    TreeEdit  Doc    File (+ history log)
//! ```

use crate::errors::{EditorError, EditorResult};
use crate::ui_state::TreeUiState;
use crate::undo_stack::EditHistory;
use cfgtree_model::{ConfigTree, Document, FieldTypeRegistry, SchemaTree, TreeCodec};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// Stable identifier of an open tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// `.yaml`/`.yml` are YAML, everything else JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                DocumentFormat::Yaml
            }
            _ => DocumentFormat::Json,
        }
    }

    /// Parse a format name from configuration ("json", "yaml")
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => DocumentFormat::Yaml,
            _ => DocumentFormat::Json,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Json => "json",
            DocumentFormat::Yaml => "yaml",
        }
    }

    pub fn parse(&self, source: &str) -> EditorResult<Value> {
        Ok(match self {
            DocumentFormat::Json => serde_json::from_str(source)?,
            DocumentFormat::Yaml => serde_yaml::from_str(source)?,
        })
    }

    pub fn render(&self, document: &Document) -> EditorResult<String> {
        Ok(match self {
            DocumentFormat::Json => serde_json::to_string_pretty(document)?,
            DocumentFormat::Yaml => serde_yaml::to_string(document)?,
        })
    }
}

/// Read a document; the root must be a mapping
pub fn load_document(path: &Path) -> EditorResult<Document> {
    let source = std::fs::read_to_string(path)?;
    match DocumentFormat::from_path(path).parse(&source)? {
        Value::Object(map) => Ok(map),
        _ => Err(EditorError::NotAMapping(path.to_path_buf())),
    }
}

pub fn save_document(path: &Path, document: &Document) -> EditorResult<()> {
    let rendered = DocumentFormat::from_path(path).render(document)?;
    std::fs::write(path, rendered)?;
    info!(path = %path.display(), "Saved document");
    Ok(())
}

/// Model bound to a tab, with the structure used to rebind the registry
#[derive(Debug, Clone, PartialEq)]
pub struct ModelBinding {
    pub model_id: String,
    pub structure: SchemaTree,
}

#[derive(Debug, Clone)]
pub struct OpenDocument {
    pub id: TabId,
    pub name: String,
    /// Backing file, `None` for untitled and historical tabs
    pub path: Option<PathBuf>,
    pub format: DocumentFormat,
    pub tree: ConfigTree,
    /// Content at the last load/save
    saved: Document,
    pub ui_state: TreeUiState,
    pub history: EditHistory,
    pub binding: Option<ModelBinding>,
}

impl OpenDocument {
    pub fn new(
        id: TabId,
        name: impl Into<String>,
        path: Option<PathBuf>,
        document: Document,
        registry: &FieldTypeRegistry,
        max_levels: usize,
    ) -> EditorResult<Self> {
        let format = path
            .as_deref()
            .map(DocumentFormat::from_path)
            .unwrap_or(DocumentFormat::Json);
        Ok(Self {
            id,
            name: name.into(),
            path,
            format,
            tree: TreeCodec::decode(&document, registry)?,
            saved: document,
            ui_state: TreeUiState::default(),
            history: EditHistory::with_max_levels(max_levels),
            binding: None,
        })
    }

    /// Current content encoded from the tree
    pub fn document(&self, registry: &FieldTypeRegistry) -> Document {
        TreeCodec::encode(&self.tree, registry)
    }

    /// Replace the tree with `document`
    pub fn install(&mut self, document: &Document, registry: &FieldTypeRegistry) -> EditorResult<()> {
        self.tree = TreeCodec::decode(document, registry)?;
        Ok(())
    }

    pub fn is_dirty(&self, registry: &FieldTypeRegistry) -> bool {
        self.document(registry) != self.saved
    }

    pub fn saved(&self) -> &Document {
        &self.saved
    }

    pub fn mark_saved(&mut self, document: Document) {
        self.saved = document;
    }
}
