use crate::errors::EditorResult;
use cfgtree_model::DEFAULT_BINDING_PREFIX;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_NAME: &str = "cfgtree.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// YAML schema describing every field
    #[serde(default = "default_schema_path")]
    pub schema_path: String,

    /// Append-only JSON log of saved versions
    #[serde(default = "default_history_path")]
    pub history_path: String,

    #[serde(default = "default_documents_dir")]
    pub documents_dir: String,

    /// Reserved prefix of the bound-model top-level key
    #[serde(default = "default_binding_prefix")]
    pub binding_prefix: String,

    /// Format for documents saved without an extension ("json" or "yaml")
    #[serde(default = "default_format")]
    pub default_format: String,

    /// Maximum undo levels per tab (0 = unlimited)
    #[serde(default)]
    pub undo_limit: usize,
}

fn default_schema_path() -> String {
    "default.yaml".to_string()
}

fn default_history_path() -> String {
    "history.json".to_string()
}

fn default_documents_dir() -> String {
    ".".to_string()
}

fn default_binding_prefix() -> String {
    DEFAULT_BINDING_PREFIX.to_string()
}

fn default_format() -> String {
    "json".to_string()
}

impl EditorConfig {
    /// Load config from a directory, falling back to defaults when absent
    pub fn load(cwd: &Path) -> EditorResult<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: EditorConfig = serde_json::from_str(&content)?;
            debug!(path = %config_path.display(), "Loaded editor config");
            Ok(config)
        } else {
            Ok(EditorConfig::default())
        }
    }

    pub fn schema_path(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.schema_path)
    }

    pub fn history_path(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.history_path)
    }

    pub fn documents_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.documents_dir)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            schema_path: default_schema_path(),
            history_path: default_history_path(),
            documents_dir: default_documents_dir(),
            binding_prefix: default_binding_prefix(),
            default_format: default_format(),
            undo_limit: 0,
        }
    }
}
