//! Chunked copy with cooperative cancellation.

use crate::error::ToolResult;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Shared flag checked between chunks
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    Completed { bytes: u64 },
    /// Stopped early; `bytes` were written before the flag was seen
    Cancelled { bytes: u64 },
}

impl DownloadOutcome {
    pub fn bytes(&self) -> u64 {
        match self {
            DownloadOutcome::Completed { bytes } | DownloadOutcome::Cancelled { bytes } => *bytes,
        }
    }
}

/// Copy `reader` into `writer` in `chunk_size` pieces, reporting the running
/// total after each chunk.
pub async fn download<R, W>(
    reader: &mut R,
    writer: &mut W,
    chunk_size: usize,
    cancel: &CancelFlag,
    mut progress: impl FnMut(u64),
) -> ToolResult<DownloadOutcome>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;

    loop {
        if cancel.is_cancelled() {
            writer.flush().await?;
            info!(bytes = total, "Download cancelled");
            return Ok(DownloadOutcome::Cancelled { bytes: total });
        }

        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n]).await?;
        total += n as u64;
        progress(total);
    }

    writer.flush().await?;
    debug!(bytes = total, "Download finished");
    Ok(DownloadOutcome::Completed { bytes: total })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_copies_everything() {
        let data = vec![7u8; 10_000];
        let mut reader = data.as_slice();
        let mut out = Vec::new();
        let mut seen = Vec::new();

        let outcome = download(&mut reader, &mut out, 4096, &CancelFlag::new(), |n| seen.push(n))
            .await
            .unwrap();

        assert_eq!(outcome, DownloadOutcome::Completed { bytes: 10_000 });
        assert_eq!(out, data);
        assert_eq!(seen, vec![4096, 8192, 10_000]);
    }

    #[tokio::test]
    async fn test_cancel_between_chunks() {
        let data = vec![1u8; 10_000];
        let mut reader = data.as_slice();
        let mut out = Vec::new();
        let flag = CancelFlag::new();
        let cancel = flag.clone();

        let outcome = download(&mut reader, &mut out, 1000, &flag, |n| {
            if n >= 3000 {
                cancel.cancel();
            }
        })
        .await
        .unwrap();

        assert_eq!(outcome, DownloadOutcome::Cancelled { bytes: 3000 });
        assert_eq!(out.len(), 3000);
    }
}
