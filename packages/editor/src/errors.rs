//! Error types for the editor

use crate::document::TabId;
use crate::mutations::MutationError;
use cfgtree_model::{ModelError, SchemaError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("Document root must be a mapping: {}", .0.display())]
    NotAMapping(PathBuf),

    #[error("Tab not found: {0}")]
    TabNotFound(TabId),

    #[error("No document is open")]
    NoActiveTab,

    #[error("Document is not file-backed")]
    NotFileBacked,

    #[error("No history version of '{file}' at {timestamp}")]
    HistoryVersionNotFound { file: String, timestamp: String },
}

pub type EditorResult<T> = Result<T, EditorError>;
