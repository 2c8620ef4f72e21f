// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Turns a compressed archive in an object store into a stream of records.
//!
//! Two tasks run per archive. The producer ([`ChunkFeeder`]) downloads the
//! object chunk by chunk and writes it into a bounded in-memory pipe; the
//! consumer decompresses whatever is in the pipe and decodes records from it.
//! A full pipe pauses the download, an empty one pauses decoding, so memory
//! stays bounded whatever the size of the archive.

mod decompress;
mod feeder;

pub use decompress::{Compression, Decompressed, decompress};
pub use feeder::ChunkFeeder;

use crate::arc::{ArcError, ArcReader, ArcRecord, VersionBlock};
use crate::blob::{BlobRangeFetcher, ByteRange, FetchError};
use crate::utils::RetryError;
use futures::{FutureExt as _, Stream, StreamExt as _};
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};
use smart_default::SmartDefault;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{BufReader, DuplexStream};
use tokio::sync::oneshot;
use tokio_util::task::AbortOnDropHandle;
use tracing::debug;

pub const DEFAULT_CHUNK_SIZE: u64 = 1024 * 1024;
pub const DEFAULT_PIPE_CAPACITY: usize = 4 * 1024 * 1024;
pub const DEFAULT_S3_ENDPOINT: &str = "https://{bucket}.s3.amazonaws.com/{key}";

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SmartDefault)]
#[serde(default)]
pub struct FetchConfig {
    /// Bytes requested per ranged fetch.
    #[default(DEFAULT_CHUNK_SIZE)]
    pub chunk_size: u64,
    /// Tries per chunk, the first one included.
    #[default(5)]
    pub max_attempts: usize,
    /// Pause between two tries of the same chunk, in milliseconds.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[default(Duration::from_secs(1))]
    pub retry_delay: Duration,
    /// Bytes buffered between the download and the decoder.
    #[default(DEFAULT_PIPE_CAPACITY)]
    pub pipe_capacity: usize,
    /// URL template for `s3://` locations.
    #[default(DEFAULT_S3_ENDPOINT.into())]
    pub s3_endpoint: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("invalid fetch configuration: {0}")]
    Config(String),
    #[error("could not determine the object size")]
    Size(#[source] RetryError<FetchError>),
    #[error("could not fetch bytes {range}")]
    FetchExhausted {
        range: ByteRange,
        #[source]
        source: RetryError<FetchError>,
    },
    #[error("could not write into the decompression pipe")]
    Pipe(#[source] std::io::Error),
    #[error("download task failed: {0}")]
    Producer(String),
    #[error(transparent)]
    Decode(#[from] ArcError),
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panicked".into())
}

type RecordReader = ArcReader<Decompressed<BufReader<DuplexStream>>>;

/// Records of one archive being downloaded in the background.
///
/// Dropping this aborts the download.
pub struct ArchiveStream {
    reader: RecordReader,
    compression: Compression,
    producer: AbortOnDropHandle<()>,
    producer_failure: oneshot::Receiver<IngestError>,
    finished: bool,
}

impl ArchiveStream {
    /// Starts downloading the object behind `fetcher` and reads its version
    /// block. `label` identifies the archive in logs.
    pub async fn open(
        fetcher: Arc<dyn BlobRangeFetcher>,
        config: &FetchConfig,
        label: &str,
    ) -> Result<Self, IngestError> {
        let feeder = ChunkFeeder::new(fetcher, config, label)?;
        let (mut writer, pipe) = tokio::io::duplex(config.pipe_capacity.max(1));
        let (failure_tx, mut producer_failure) = oneshot::channel();
        let producer = AbortOnDropHandle::new(tokio::spawn(async move {
            // A failure, panics included, is reported before the pipe closes,
            // so the consumer never mistakes it for the end of the archive.
            let fed = AssertUnwindSafe(feeder.feed(&mut writer))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(IngestError::Producer(panic_message(&*panic))));
            if let Err(e) = fed {
                let _ = failure_tx.send(e);
            }
            drop(writer);
        }));

        let opened = async {
            let (compression, decoded) = decompress(BufReader::new(pipe))
                .await
                .map_err(ArcError::from)?;
            debug!(label, %compression, "detected compression");
            Ok::<_, IngestError>((compression, ArcReader::new(decoded).await?))
        }
        .await;
        match opened {
            Ok((compression, reader)) => Ok(Self {
                reader,
                compression,
                producer,
                producer_failure,
                finished: false,
            }),
            Err(e) => Err(producer_failure.try_recv().unwrap_or(e)),
        }
    }

    pub fn version_block(&self) -> &VersionBlock {
        self.reader.version_block()
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// The next record in archive order. After an error, or once the archive
    /// is exhausted, this returns `None`.
    ///
    /// A failed download takes precedence over the decode error it causes.
    pub async fn next_record(&mut self) -> Option<Result<ArcRecord, IngestError>> {
        if self.finished {
            return None;
        }
        match self.reader.next().await {
            Some(Ok(record)) => Some(Ok(record)),
            Some(Err(e)) => {
                self.finished = true;
                let failure = self.producer_failure.try_recv().ok();
                self.producer.abort();
                Some(Err(failure.unwrap_or(e.into())))
            }
            None => {
                self.finished = true;
                // The pipe only closes once the producer is done with it.
                if let Err(e) = (&mut self.producer).await {
                    return Some(Err(IngestError::Producer(e.to_string())));
                }
                self.producer_failure.try_recv().ok().map(Err)
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<ArcRecord, IngestError>> {
        futures::stream::unfold(self, |mut archive| async move {
            let item = archive.next_record().await?;
            Some((item, archive))
        })
    }
}
