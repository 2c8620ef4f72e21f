// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::io;

/// Errors raised while decoding or encoding an ARC container.
///
/// None of these are recoverable within a single archive: once the byte
/// position of the framing is lost there is no way to find the next record.
#[derive(Debug, thiserror::Error)]
pub enum ArcError {
    /// The version block is malformed, or a writer was given fields that
    /// would not read back.
    #[error("invalid archive layout: {0}")]
    Config(String),
    /// A record does not follow the framing declared by the version block.
    #[error("corrupt record #{index}: {reason}")]
    CorruptRecord { index: u64, reason: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ArcError {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    pub(crate) fn corrupt(index: u64, reason: impl Into<String>) -> Self {
        Self::CorruptRecord {
            index,
            reason: reason.into(),
        }
    }

    pub fn is_corrupt_record(&self) -> bool {
        matches!(self, Self::CorruptRecord { .. })
    }
}
