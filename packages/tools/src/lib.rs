//! # Config Tree Tools
//!
//! External collaborators of the editor and the plumbing around them:
//!
//! - **contracts**: model catalog, model parameter fetch, trend fetch, point search
//! - **retry**: fixed-wait retry for transport-level failures
//! - **worker**: background tasks with completion events
//! - **download**: chunked copy with a cooperative cancel flag
//! - **json_source**: file-backed implementations for offline use

pub mod contracts;
pub mod download;
mod error;
pub mod json_source;
pub mod retry;
pub mod worker;

pub use cfgtree_model::FetchedModel;
pub use contracts::{
    merge_trends, ModelCatalog, ModelParamFetcher, PointCatalog, PointRecord, PointSearch,
    Retrying, TrendData, TrendFetcher, TrendQuery, TrendSeries,
};
pub use download::{download, CancelFlag, DownloadOutcome, DEFAULT_CHUNK_SIZE};
pub use error::{ToolError, ToolResult};
pub use json_source::{JsonModelSource, JsonPointCatalog};
pub use retry::{retry, with_timeout, RetryPolicy};
pub use worker::{fetch_all, WorkerEvent, WorkerPool};
