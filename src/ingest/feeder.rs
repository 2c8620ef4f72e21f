// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{FetchConfig, IngestError};
use crate::blob::{BlobRangeFetcher, ByteRange, FetchError, chunk_ranges};
use crate::utils::io::ProgressLog;
use crate::utils::{RetryArgs, retry};
use bytes::Bytes;
use std::num::NonZeroU64;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt as _};
use tracing::debug;

/// Streams an object, chunk by chunk and strictly in offset order, into a
/// writer. Each chunk is retried on its own; a chunk that keeps failing aborts
/// the whole object since the bytes after it cannot be decompressed anyway.
pub struct ChunkFeeder {
    fetcher: Arc<dyn BlobRangeFetcher>,
    chunk_size: NonZeroU64,
    retry_args: RetryArgs,
    label: String,
}

impl ChunkFeeder {
    pub fn new(
        fetcher: Arc<dyn BlobRangeFetcher>,
        config: &FetchConfig,
        label: impl Into<String>,
    ) -> Result<Self, IngestError> {
        let chunk_size = NonZeroU64::new(config.chunk_size)
            .ok_or_else(|| IngestError::Config("chunk size must be positive".into()))?;
        if config.max_attempts == 0 {
            return Err(IngestError::Config(
                "at least one fetch attempt is required".into(),
            ));
        }
        Ok(Self {
            fetcher,
            chunk_size,
            retry_args: RetryArgs {
                timeout: None,
                max_attempts: config.max_attempts,
                delay: Some(config.retry_delay),
            },
            label: label.into(),
        })
    }

    /// Writes the whole object into `sink`, then shuts `sink` down.
    /// Returns the number of bytes written.
    pub async fn feed<W: AsyncWrite + Unpin>(&self, mut sink: W) -> Result<u64, IngestError> {
        let size = retry(self.retry_args, || self.fetcher.size())
            .await
            .map_err(IngestError::Size)?;
        debug!(label = %self.label, size, "starting download");
        let mut progress = ProgressLog::new(format!("fetched {}", self.label), size);
        for range in chunk_ranges(size, self.chunk_size) {
            let chunk = retry(self.retry_args, || self.fetch_exact(range))
                .await
                .map_err(|source| IngestError::FetchExhausted { range, source })?;
            sink.write_all(&chunk).await.map_err(IngestError::Pipe)?;
            progress.inc(range.len());
        }
        sink.shutdown().await.map_err(IngestError::Pipe)?;
        progress.finish();
        Ok(size)
    }

    async fn fetch_exact(&self, range: ByteRange) -> Result<Bytes, FetchError> {
        let chunk = self.fetcher.fetch(range).await?;
        if chunk.len() as u64 != range.len() {
            return Err(FetchError::ShortRead {
                expected: range.len(),
                actual: chunk.len() as u64,
            });
        }
        debug!(%range, "fetched chunk");
        Ok(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::MemoryRangeFetcher;
    use crate::utils::RetryError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Fails the first `failures` fetches of every range.
    struct FlakyFetcher {
        inner: MemoryRangeFetcher,
        failures: usize,
        attempts: Mutex<HashMap<ByteRange, usize>>,
    }

    impl FlakyFetcher {
        fn new(data: &'static [u8], failures: usize) -> Self {
            Self {
                inner: MemoryRangeFetcher::new(data),
                failures,
                attempts: Default::default(),
            }
        }
    }

    #[async_trait]
    impl BlobRangeFetcher for FlakyFetcher {
        async fn size(&self) -> Result<u64, FetchError> {
            self.inner.size().await
        }

        async fn fetch(&self, range: ByteRange) -> Result<Bytes, FetchError> {
            let attempt = {
                let mut attempts = self.attempts.lock();
                let attempt = attempts.entry(range).or_default();
                *attempt += 1;
                *attempt
            };
            if attempt <= self.failures {
                return Err(FetchError::Io(std::io::Error::other("connection reset")));
            }
            self.inner.fetch(range).await
        }
    }

    fn config(chunk_size: u64) -> FetchConfig {
        FetchConfig {
            chunk_size,
            retry_delay: Duration::from_millis(1),
            ..Default::default()
        }
    }

    const DATA: &[u8] = b"the quick brown fox jumps over the lazy dog";

    #[tokio::test]
    async fn feeds_in_offset_order() {
        let feeder =
            ChunkFeeder::new(Arc::new(MemoryRangeFetcher::new(DATA)), &config(5), "test").unwrap();
        let mut out = Vec::new();
        assert_eq!(feeder.feed(&mut out).await.unwrap(), DATA.len() as u64);
        assert_eq!(out, DATA);
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let fetcher = Arc::new(FlakyFetcher::new(DATA, 4));
        let feeder = ChunkFeeder::new(fetcher.clone(), &config(16), "test").unwrap();
        let mut out = Vec::new();
        feeder.feed(&mut out).await.unwrap();
        assert_eq!(out, DATA);
        assert!(fetcher.attempts.lock().values().all(|n| *n == 5));
    }

    #[tokio::test]
    async fn persistent_failure_is_fatal() {
        let fetcher = Arc::new(FlakyFetcher::new(DATA, 5));
        let feeder = ChunkFeeder::new(fetcher.clone(), &config(16), "test").unwrap();
        let mut out = Vec::new();
        let err = feeder.feed(&mut out).await.unwrap_err();
        assert!(matches!(
            err,
            IngestError::FetchExhausted {
                range: ByteRange { start: 0, end: 15 },
                source: RetryError::RetriesExceeded { attempts: 5, .. }
            }
        ));
        assert!(out.is_empty());
        assert_eq!(fetcher.attempts.lock().len(), 1);
    }

    #[tokio::test]
    async fn short_chunk_counts_as_failure() {
        struct Truncating(MemoryRangeFetcher);

        #[async_trait]
        impl BlobRangeFetcher for Truncating {
            async fn size(&self) -> Result<u64, FetchError> {
                self.0.size().await
            }

            async fn fetch(&self, range: ByteRange) -> Result<Bytes, FetchError> {
                let mut bytes = self.0.fetch(range).await?;
                bytes.truncate(1);
                Ok(bytes)
            }
        }

        let feeder = ChunkFeeder::new(
            Arc::new(Truncating(MemoryRangeFetcher::new(DATA))),
            &config(8),
            "test",
        )
        .unwrap();
        let err = feeder.feed(&mut Vec::new()).await.unwrap_err();
        assert!(matches!(
            err,
            IngestError::FetchExhausted {
                source: RetryError::RetriesExceeded {
                    last: FetchError::ShortRead { expected: 8, actual: 1 },
                    ..
                },
                ..
            }
        ));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        assert!(matches!(
            ChunkFeeder::new(Arc::new(MemoryRangeFetcher::default()), &config(0), "test"),
            Err(IngestError::Config(_))
        ));
    }
}
