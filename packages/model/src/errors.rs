//! Error types for the configuration model

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Document root must be a mapping")]
    NotAMapping,

    #[error("Invalid model parameters: {0}")]
    InvalidParams(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while reading the field-type schema
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid schema node at '{path}': {reason}")]
    InvalidNode { path: String, reason: String },
}

/// Failures converting between display text and structured field values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error("Expected 'lo ~ hi' but found '{0}'")]
    MalformedInterval(String),

    #[error("Not a number: '{0}'")]
    NotANumber(String),

    #[error("Interval {lo} ~ {hi} is empty or reversed")]
    ReversedInterval { lo: f64, hi: f64 },

    #[error("Intervals are not contiguous at line {line}")]
    NotContiguous { line: usize },

    #[error("Invalid timestamp '{0}', expected YYYY-MM-DD HH:MM:SS")]
    InvalidTimestamp(String),

    #[error("Time range ends before it starts at line {line}")]
    ReversedTimeRange { line: usize },

    #[error("Unexpected value shape: {0}")]
    UnexpectedShape(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
