// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use async_compression::tokio::bufread::{GzipDecoder, ZstdDecoder};
use std::io::{self, Cursor};
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _, AsyncReadExt as _, BufReader, Chain};
use tokio_util::either::Either::{self, Left, Right};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
/// Largest zstd frame header, and so the most any format needs to be told apart.
const DETECTION_PREFIX_LEN: usize = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Compression {
    Gzip,
    Zstd,
    None,
}

impl Compression {
    pub fn detect(buf: &[u8]) -> Self {
        if buf.starts_with(&GZIP_MAGIC) {
            Self::Gzip
        } else if is_zstd(buf) {
            Self::Zstd
        } else {
            Self::None
        }
    }
}

// This method checks the header in order to see whether or not we are operating on a zstd
// archive. The zstd header has a maximum size of 18 bytes:
// https://github.com/facebook/zstd/blob/dev/doc/zstd_compression_format.md#zstandard-frames.
fn is_zstd(buf: &[u8]) -> bool {
    zstd::zstd_safe::get_frame_content_size(buf).is_ok()
}

/// The bytes read for detection, followed by the rest of the input.
pub type Prefixed<R> = Chain<Cursor<Vec<u8>>, R>;

pub type Decompressed<R> =
    BufReader<Either<GzipDecoder<Prefixed<R>>, Either<ZstdDecoder<Prefixed<R>>, Prefixed<R>>>>;

/// Wraps `reader` in the decoder matching its first bytes. Archives are
/// usually a concatenation of gzip members, one per record, so every member is
/// decoded, not only the first.
///
/// Reads until the detection prefix is complete or the input ends, however
/// little each read of `reader` returns.
pub async fn decompress<R: AsyncBufRead + Unpin>(
    mut reader: R,
) -> io::Result<(Compression, Decompressed<R>)> {
    let mut prefix = Vec::with_capacity(DETECTION_PREFIX_LEN);
    while prefix.len() < DETECTION_PREFIX_LEN {
        let buf = reader.fill_buf().await?;
        if buf.is_empty() {
            break;
        }
        let n = buf.len().min(DETECTION_PREFIX_LEN - prefix.len());
        prefix.extend_from_slice(&buf[..n]);
        reader.consume(n);
    }
    let compression = Compression::detect(&prefix);
    let reader = Cursor::new(prefix).chain(reader);
    let decoded = match compression {
        Compression::Gzip => {
            let mut gzip = GzipDecoder::new(reader);
            gzip.multiple_members(true);
            Left(gzip)
        }
        Compression::Zstd => {
            let mut zstd = ZstdDecoder::new(reader);
            zstd.multiple_members(true);
            Right(Left(zstd))
        }
        Compression::None => Right(Right(reader)),
    };
    Ok((compression, BufReader::new(decoded)))
}
