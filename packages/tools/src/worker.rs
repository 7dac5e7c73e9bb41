//! Background tasks reporting back over a channel.
//!
//! The caller keeps the receiving end on its own loop and reacts to
//! [`WorkerEvent`]s; the document itself is never touched from a worker.

use crate::contracts::{merge_trends, TrendData, TrendFetcher, TrendQuery};
use crate::error::ToolResult;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

#[derive(Debug)]
pub enum WorkerEvent<T> {
    Finished { task: String, result: T },
    Failed { task: String, error: String },
}

impl<T> WorkerEvent<T> {
    pub fn task(&self) -> &str {
        match self {
            WorkerEvent::Finished { task, .. } | WorkerEvent::Failed { task, .. } => task,
        }
    }
}

/// Spawns tasks whose outcomes arrive on one receiver
#[derive(Debug)]
pub struct WorkerPool<T> {
    events: mpsc::UnboundedSender<WorkerEvent<T>>,
}

impl<T> Clone for WorkerPool<T> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
        }
    }
}

impl<T: Send + 'static> WorkerPool<T> {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<WorkerEvent<T>>) {
        let (events, rx) = mpsc::unbounded_channel();
        (Self { events }, rx)
    }

    pub fn spawn<F>(&self, task: impl Into<String>, fut: F) -> JoinHandle<()>
    where
        F: Future<Output = ToolResult<T>> + Send + 'static,
    {
        let task = task.into();
        let events = self.events.clone();
        tokio::spawn(async move {
            let event = match fut.await {
                Ok(result) => {
                    debug!(task = %task, "Worker finished");
                    WorkerEvent::Finished { task, result }
                }
                Err(err) => {
                    error!(task = %task, error = %err, "Worker failed");
                    WorkerEvent::Failed { task, error: err.to_string() }
                }
            };
            // The receiver may already be gone when the host shut down
            let _ = events.send(event);
        })
    }
}

/// Query several trend sources and merge their series; `None` entries are skipped
pub async fn fetch_all(
    fetchers: Vec<Option<Arc<dyn TrendFetcher>>>,
    points: Vec<String>,
    query: TrendQuery,
) -> ToolResult<TrendData> {
    let mut data = TrendData::new();
    for fetcher in fetchers.into_iter().flatten() {
        merge_trends(&mut data, fetcher.call_batch(&points, &query).await?);
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;

    #[tokio::test]
    async fn test_events_arrive_per_task() {
        let (pool, mut rx) = WorkerPool::<u32>::new();
        pool.spawn("ok", async { Ok(1) }).await.unwrap();
        pool.spawn("bad", async { Err(ToolError::Transport("down".into())) })
            .await
            .unwrap();

        match rx.recv().await.unwrap() {
            WorkerEvent::Finished { task, result } => {
                assert_eq!(task, "ok");
                assert_eq!(result, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
        match rx.recv().await.unwrap() {
            WorkerEvent::Failed { task, error } => {
                assert_eq!(task, "bad");
                assert!(error.contains("down"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
