//! Collaborator contracts driven end to end: file-backed sources, retry
//! wrappers and background workers.

use async_trait::async_trait;
use cfgtree_model::DEFAULT_BINDING_PREFIX;
use cfgtree_tools::{
    fetch_all, JsonModelSource, JsonPointCatalog, ModelCatalog, ModelParamFetcher, PointSearch,
    Retrying, RetryPolicy, ToolError, ToolResult, TrendData, TrendFetcher, TrendQuery,
    TrendSeries, WorkerEvent, WorkerPool,
};
use chrono::NaiveDateTime;
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn query() -> TrendQuery {
    let t = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
    TrendQuery {
        start: t("2024-01-01 00:00:00"),
        end: t("2024-01-02 00:00:00"),
        sample_count: 2,
    }
}

/// Fails with a transport error `failures` times, then answers
struct FlakyTrend {
    failures: u32,
    calls: AtomicU32,
    value: f64,
}

impl FlakyTrend {
    fn new(failures: u32, value: f64) -> Self {
        Self { failures, calls: AtomicU32::new(0), value }
    }
}

#[async_trait]
impl TrendFetcher for FlakyTrend {
    async fn call(&self, point: &str, query: &TrendQuery) -> ToolResult<TrendData> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
            return Err(ToolError::Transport("connection reset".into()));
        }
        let mut data = TrendData::new();
        data.insert(
            point.to_string(),
            TrendSeries {
                timestamps: vec![query.start, query.end],
                values: vec![self.value, self.value],
            },
        );
        Ok(data)
    }
}

#[tokio::test]
async fn test_json_model_source_lists_and_fetches() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("泵站模型.json"),
        json!({
            "params": {"c1": {"name": "Pump", "p1": {"param_name": "阈值", "default": 5}}},
            "options": {"p1": ["5", "10"]}
        })
        .to_string(),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("bare.json"),
        json!({"c1": {"name": "Valve", "p1": {"param_name": "开度", "default": 50}}}).to_string(),
    )
    .unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let source = JsonModelSource::new(dir.path());
    assert_eq!(source.list_models().await.unwrap(), vec!["bare", "泵站模型"]);

    let fetched = source.fetch(DEFAULT_BINDING_PREFIX, "泵站模型").await.unwrap();
    assert_eq!(fetched.params.components.len(), 1);
    assert_eq!(fetched.option_values["p1"], json!(["5", "10"]));
    assert!(!fetched.structure.is_empty());

    let bare = source.fetch(DEFAULT_BINDING_PREFIX, "bare").await.unwrap();
    assert!(bare.option_values.is_empty());

    let missing = source.fetch(DEFAULT_BINDING_PREFIX, "nope").await;
    assert!(matches!(missing, Err(ToolError::NotFound(_))));
}

#[tokio::test]
async fn test_point_catalog_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("points.json");
    std::fs::write(
        &path,
        json!({"压力": [{"tag": "P-01", "description": "出口压力"}], "流量": []}).to_string(),
    )
    .unwrap();

    let catalog = JsonPointCatalog::new(&path).call().await.unwrap();
    assert_eq!(catalog["压力"][0].tag, "P-01");
    assert!(catalog["流量"].is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_retrying_wrapper_recovers_from_transport_errors() {
    let fetcher = Retrying::new(FlakyTrend::new(2, 1.5));
    let data = fetcher.call("P-01", &query()).await.unwrap();
    assert_eq!(data["P-01"].values, vec![1.5, 1.5]);
    assert_eq!(fetcher.inner().calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_retrying_wrapper_surfaces_final_failure() {
    let fetcher = Retrying::with_policy(
        FlakyTrend::new(10, 0.0),
        RetryPolicy::fixed(3, Duration::from_secs(1)),
    );
    let result = fetcher.call("P-01", &query()).await;
    assert!(matches!(result, Err(ToolError::Transport(_))));
    assert_eq!(fetcher.inner().calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_batch_call_merges_points() {
    let fetcher = FlakyTrend::new(0, 2.0);
    let points = vec!["A".to_string(), "B".to_string()];
    let data = fetcher.call_batch(&points, &query()).await.unwrap();
    assert_eq!(data.keys().collect::<Vec<_>>(), vec!["A", "B"]);
}

#[tokio::test]
async fn test_worker_reports_merged_trends() {
    let (pool, mut rx) = WorkerPool::<TrendData>::new();
    let fetchers: Vec<Option<Arc<dyn TrendFetcher>>> = vec![
        Some(Arc::new(FlakyTrend::new(0, 1.0))),
        None,
        Some(Arc::new(FlakyTrend::new(0, 2.0))),
    ];

    pool.spawn("trend", fetch_all(fetchers, vec!["P-01".into()], query()));

    match rx.recv().await.unwrap() {
        WorkerEvent::Finished { task, result } => {
            assert_eq!(task, "trend");
            assert_eq!(result["P-01"].values, vec![1.0, 1.0, 2.0, 2.0]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn test_worker_reports_failure_without_panicking() {
    let (pool, mut rx) = WorkerPool::<TrendData>::new();
    let fetchers: Vec<Option<Arc<dyn TrendFetcher>>> =
        vec![Some(Arc::new(FlakyTrend::new(1, 1.0)))];

    pool.spawn("trend", fetch_all(fetchers, vec!["P-01".into()], query()));

    let event = rx.recv().await.unwrap();
    assert_eq!(event.task(), "trend");
    assert!(matches!(event, WorkerEvent::Failed { .. }));
}
