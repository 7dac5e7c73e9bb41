//! File-backed collaborators for offline use.
//!
//! A model directory holds one `<model>.json` per model, either the bare
//! parameter mapping or `{"params": .., "options": ..}`.

use crate::contracts::{ModelCatalog, ModelParamFetcher, PointCatalog, PointSearch};
use crate::error::{ToolError, ToolResult};
use async_trait::async_trait;
use cfgtree_model::{FetchedModel, ModelParams};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const MODEL_EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct JsonModelSource {
    dir: PathBuf,
}

impl JsonModelSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn model_path(&self, model: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", model, MODEL_EXTENSION))
    }
}

async fn read_json(path: &Path) -> ToolResult<Value> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(ToolError::NotFound(path.display().to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

#[async_trait]
impl ModelCatalog for JsonModelSource {
    async fn list_models(&self) -> ToolResult<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut models = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(MODEL_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                models.push(stem.to_string());
            }
        }
        models.sort();
        debug!(dir = %self.dir.display(), count = models.len(), "Listed models");
        Ok(models)
    }
}

#[async_trait]
impl ModelParamFetcher for JsonModelSource {
    async fn fetch(&self, prefix: &str, model: &str) -> ToolResult<FetchedModel> {
        let raw = read_json(&self.model_path(model)).await?;

        let (params, options) = match raw {
            Value::Object(mut map) if map.contains_key("params") => {
                let params = map.remove("params").unwrap_or_default();
                let options = map.remove("options").unwrap_or_default();
                (params, options)
            }
            other => (other, Value::Null),
        };

        let mut fetched = FetchedModel::from_params(ModelParams::from_value(&params)?, prefix, model);
        if let Value::Object(options) = options {
            fetched.option_values = options.into_iter().collect();
        }

        info!(
            model,
            components = fetched.params.components.len(),
            "Fetched model parameters from file"
        );
        Ok(fetched)
    }
}

/// Point catalog read from one JSON file of `{category: [record, ..]}`
#[derive(Debug, Clone)]
pub struct JsonPointCatalog {
    path: PathBuf,
}

impl JsonPointCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PointSearch for JsonPointCatalog {
    async fn call(&self) -> ToolResult<PointCatalog> {
        let raw = read_json(&self.path).await?;
        let catalog: PointCatalog = serde_json::from_value(raw)
            .map_err(|e| ToolError::InvalidResponse(e.to_string()))?;
        Ok(catalog)
    }
}
