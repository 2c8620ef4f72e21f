// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{BlobRangeFetcher, ByteRange, FetchError};
use async_trait::async_trait;
use bytes::Bytes;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt as _, AsyncSeekExt as _};

/// Reads ranges of a file on the local file system.
#[derive(Debug, Clone)]
pub struct FileRangeFetcher {
    path: PathBuf,
}

impl FileRangeFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl BlobRangeFetcher for FileRangeFetcher {
    async fn size(&self) -> Result<u64, FetchError> {
        Ok(tokio::fs::metadata(&self.path).await?.len())
    }

    async fn fetch(&self, range: ByteRange) -> Result<Bytes, FetchError> {
        let mut file = tokio::fs::File::open(&self.path).await?;
        let size = file.metadata().await?.len();
        if range.end >= size {
            return Err(FetchError::OutOfBounds { range, size });
        }
        file.seek(SeekFrom::Start(range.start)).await?;
        let mut buf = vec![0; range.len() as usize];
        file.read_exact(&mut buf).await?;
        Ok(buf.into())
    }
}
