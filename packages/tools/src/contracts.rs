//! # Collaborator Contracts
//!
//! Shapes of the external services the editor consumes. Concrete REST or
//! database clients live outside this workspace; anything implementing
//! these traits can be plugged in.
//!
//! [`Retrying`] wraps any implementation with a [`RetryPolicy`].

use crate::error::ToolResult;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use cfgtree_model::FetchedModel;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Time window and resolution of a trend request
#[derive(Debug, Clone, PartialEq)]
pub struct TrendQuery {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub sample_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendSeries {
    pub timestamps: Vec<NaiveDateTime>,
    pub values: Vec<f64>,
}

impl TrendSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn extend(&mut self, other: TrendSeries) {
        self.timestamps.extend(other.timestamps);
        self.values.extend(other.values);
    }
}

/// Series keyed by point name
pub type TrendData = BTreeMap<String, TrendSeries>;

/// Append every series of `other` to the same-named series in `into`
pub fn merge_trends(into: &mut TrendData, other: TrendData) {
    for (point, series) in other {
        into.entry(point).or_default().extend(series);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub tag: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PointRecord {
    /// Value stored in point-reference fields
    pub fn field_value(&self) -> String {
        format!("{}\n{}", self.tag, self.description)
    }
}

/// Point records grouped by category
pub type PointCatalog = BTreeMap<String, Vec<PointRecord>>;

#[async_trait]
pub trait ModelCatalog: Send + Sync {
    async fn list_models(&self) -> ToolResult<Vec<String>>;
}

#[async_trait]
pub trait ModelParamFetcher: Send + Sync {
    /// Parameters of `model`, with their schema structure under `prefix`
    async fn fetch(&self, prefix: &str, model: &str) -> ToolResult<FetchedModel>;
}

#[async_trait]
pub trait TrendFetcher: Send + Sync {
    async fn call(&self, point: &str, query: &TrendQuery) -> ToolResult<TrendData>;

    /// Several points at once; defaults to one call per point
    async fn call_batch(&self, points: &[String], query: &TrendQuery) -> ToolResult<TrendData> {
        let mut data = TrendData::new();
        for point in points {
            merge_trends(&mut data, self.call(point, query).await?);
        }
        Ok(data)
    }
}

#[async_trait]
pub trait PointSearch: Send + Sync {
    async fn call(&self) -> ToolResult<PointCatalog>;
}

/// Any collaborator, retried per `policy`
#[derive(Debug, Clone)]
pub struct Retrying<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> Retrying<T> {
    pub fn new(inner: T) -> Self {
        Self::with_policy(inner, RetryPolicy::default())
    }

    pub fn with_policy(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: ModelCatalog> ModelCatalog for Retrying<T> {
    async fn list_models(&self) -> ToolResult<Vec<String>> {
        self.policy
            .run("list_models", || self.inner.list_models())
            .await
    }
}

#[async_trait]
impl<T: ModelParamFetcher> ModelParamFetcher for Retrying<T> {
    async fn fetch(&self, prefix: &str, model: &str) -> ToolResult<FetchedModel> {
        self.policy
            .run("fetch_model_params", || self.inner.fetch(prefix, model))
            .await
    }
}

#[async_trait]
impl<T: TrendFetcher> TrendFetcher for Retrying<T> {
    async fn call(&self, point: &str, query: &TrendQuery) -> ToolResult<TrendData> {
        self.policy
            .run("fetch_trend", || self.inner.call(point, query))
            .await
    }

    async fn call_batch(&self, points: &[String], query: &TrendQuery) -> ToolResult<TrendData> {
        self.policy
            .run("fetch_trend_batch", || self.inner.call_batch(points, query))
            .await
    }
}

#[async_trait]
impl<T: PointSearch> PointSearch for Retrying<T> {
    async fn call(&self) -> ToolResult<PointCatalog> {
        self.policy.run("search_points", || self.inner.call()).await
    }
}
