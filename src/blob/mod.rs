// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Ranged access to remote (or local) objects.
//!
//! Ingestion only needs two things from an object store: the size of an
//! object, and the bytes of an inclusive range of it. Anything else about the
//! store stays behind [`BlobRangeFetcher`].

mod file;
mod http;
mod location;

pub use file::FileRangeFetcher;
pub use http::HttpRangeFetcher;
pub use location::BlobLocation;

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::num::NonZeroU64;

/// An inclusive byte range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Inclusive ranges always hold at least one byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Value of an HTTP `Range` header selecting this range.
    pub fn to_header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Splits `[0, size)` into consecutive ranges of at most `chunk_size` bytes,
/// in increasing offset order. An empty object has no ranges.
pub fn chunk_ranges(size: u64, chunk_size: NonZeroU64) -> impl Iterator<Item = ByteRange> {
    let chunk_size = chunk_size.get();
    (0..size.div_ceil(chunk_size)).map(move |i| {
        let start = i * chunk_size;
        ByteRange::new(start, start.saturating_add(chunk_size).min(size) - 1)
    })
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("unexpected HTTP status {status} for {url}")]
    Status { status: reqwest::StatusCode, url: url::Url },
    #[error("missing or invalid Content-Length for {0}")]
    MissingContentLength(url::Url),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("range {range} is outside of an object of {size} bytes")]
    OutOfBounds { range: ByteRange, size: u64 },
    #[error("expected {expected} bytes, got {actual}")]
    ShortRead { expected: u64, actual: u64 },
}

/// Capability to read a single named object by byte range. Calls may fail
/// transiently; retrying is left to the caller.
#[async_trait]
pub trait BlobRangeFetcher: Send + Sync {
    /// Total size of the object in bytes.
    async fn size(&self) -> Result<u64, FetchError>;

    /// The bytes of `range`, which must lie within the object.
    async fn fetch(&self, range: ByteRange) -> Result<Bytes, FetchError>;
}

/// An object held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRangeFetcher {
    data: Bytes,
}

impl MemoryRangeFetcher {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

#[async_trait]
impl BlobRangeFetcher for MemoryRangeFetcher {
    async fn size(&self) -> Result<u64, FetchError> {
        Ok(self.data.len() as u64)
    }

    async fn fetch(&self, range: ByteRange) -> Result<Bytes, FetchError> {
        let size = self.data.len() as u64;
        if range.end >= size {
            return Err(FetchError::OutOfBounds { range, size });
        }
        Ok(self
            .data
            .slice(range.start as usize..=range.end as usize))
    }
}
