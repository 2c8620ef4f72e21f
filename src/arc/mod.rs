// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! ARC containers bundle many captured network responses behind a single
//! version block. See
//! <http://www.archive.org/web/researcher/ArcFileFormat.php>.
//!
//! The byte layout, once decompressed, is:
//!
//! ```text
//! filedesc://1258794327404_0.arc.gz 0.0.0.0 20091121010527 text/plain 73
//! 1 0 CommonCrawl
//! URL IP-address Archive-date Content-type Archive-length
//!
//! http://example.com/ 1.2.3.4 20091103192002 text/html 5
//! hello
//! ```
//!
//! The first line declares the byte length of the version block body that
//! follows it. The body names the columns of every record header line. The
//! last column of each record line is the byte length of the payload, which is
//! followed by exactly one `\n`.
//!
//! Decoding is strictly forward-only. [`ArcReader`] never holds more than one
//! record in memory. [`ArcWriter`] buffers appended records and hands them to
//! its sink once a few kilobytes have accumulated, and on
//! [`ArcWriter::finish`].

mod codec;
mod error;
mod reader;
mod writer;

pub use codec::ArcRecordCodec;
pub use error::ArcError;
pub use reader::ArcReader;
pub use writer::{ArcWriter, WriterConfig};

use bytes::Bytes;
use indexmap::IndexMap;
use itertools::Itertools as _;
use serde::{Deserialize, Serialize};

pub const URL_COLUMN: &str = "URL";
pub const ADDRESS_COLUMN: &str = "IP-address";
pub const DATE_COLUMN: &str = "Archive-date";
pub const CONTENT_TYPE_COLUMN: &str = "Content-type";
pub const LENGTH_COLUMN: &str = "Archive-length";

pub const DEFAULT_COLUMNS: [&str; 5] = [
    URL_COLUMN,
    ADDRESS_COLUMN,
    DATE_COLUMN,
    CONTENT_TYPE_COLUMN,
    LENGTH_COLUMN,
];

/// Upper bound on the version block body. Real archives declare well under a
/// kilobyte.
const MAX_VERSION_BLOCK_LEN: usize = 1024 * 1024;

/// The preamble of an ARC container. It is written or read exactly once, before
/// any record, and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionBlock {
    pub name: String,
    pub address: String,
    /// Creation time, `YYYYMMDDHHMMSS`.
    pub date: String,
    pub content_type: String,
    pub version: String,
    pub reserved: String,
    pub origin_code: String,
    /// Ordered names of the fields in each record header line. The last one
    /// carries the payload length.
    pub columns: Vec<String>,
}

/// The fields of the first line, before the body has been read.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct VersionBlockHeader {
    name: String,
    address: String,
    date: String,
    content_type: String,
    pub(crate) body_len: usize,
}

impl VersionBlockHeader {
    pub(crate) fn parse(line: &[u8]) -> Result<Self, ArcError> {
        let line = std::str::from_utf8(line)
            .map_err(|_| ArcError::config("header line is not valid UTF-8"))?;
        let Some((name, address, date, content_type, body_len)) =
            line.split_whitespace().collect_tuple()
        else {
            return Err(ArcError::config(format!(
                "expected 5 fields in header line, got {:?}",
                line.trim_end()
            )));
        };
        let body_len = body_len
            .parse::<usize>()
            .map_err(|_| ArcError::config(format!("non-numeric version block length {body_len:?}")))?;
        if body_len > MAX_VERSION_BLOCK_LEN {
            return Err(ArcError::config(format!(
                "version block length {body_len} exceeds {MAX_VERSION_BLOCK_LEN}"
            )));
        }
        Ok(Self {
            name: name.into(),
            address: address.into(),
            date: date.into(),
            content_type: content_type.into(),
            body_len,
        })
    }

    pub(crate) fn with_body(self, body: &[u8]) -> Result<VersionBlock, ArcError> {
        let body = std::str::from_utf8(body)
            .map_err(|_| ArcError::config("version block body is not valid UTF-8"))?;
        let mut lines = body.lines();
        let (version, reserved, origin_code) = lines
            .next()
            .and_then(|line| line.split_whitespace().collect_tuple())
            .ok_or_else(|| ArcError::config("expected `<version> <reserved> <origin>` line"))?;
        let columns = lines
            .next()
            .map(|line| line.split_whitespace().map(String::from).collect_vec())
            .unwrap_or_default();
        if columns.is_empty() {
            return Err(ArcError::config("version block declares no columns"));
        }
        Ok(VersionBlock {
            name: self.name,
            address: self.address,
            date: self.date,
            content_type: self.content_type,
            version: version.into(),
            reserved: reserved.into(),
            origin_code: origin_code.into(),
            columns,
        })
    }
}

impl VersionBlock {
    /// The body: the provenance line, the column line, then a blank line.
    pub fn body(&self) -> String {
        format!(
            "{} {} {}\n{}\n\n",
            self.version,
            self.reserved,
            self.origin_code,
            self.columns.join(" ")
        )
    }

    /// The complete preamble, header line included.
    pub fn to_bytes(&self) -> Vec<u8> {
        let body = self.body();
        format!(
            "{} {} {} {} {}\n{body}",
            self.name,
            self.address,
            self.date,
            self.content_type,
            body.len()
        )
        .into_bytes()
    }

    /// Name of the column holding the payload length.
    pub fn length_column(&self) -> &str {
        self.columns.last().map(String::as_str).unwrap_or(LENGTH_COLUMN)
    }
}

/// Field values of one record header line, keyed by column name.
///
/// Iteration follows insertion order, which for decoded records is the column
/// order of the version block. Equality ignores order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordHeader(IndexMap<String, String>);

impl RecordHeader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(column.into(), value.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn url(&self) -> Option<&str> {
        self.get(URL_COLUMN)
    }

    pub fn archive_date(&self) -> Option<&str> {
        self.get(DATE_COLUMN)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.get(CONTENT_TYPE_COLUMN)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RecordHeader {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// One captured network response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcRecord {
    pub header: RecordHeader,
    pub payload: Bytes,
}

impl ArcRecord {
    pub fn new(header: RecordHeader, payload: impl Into<Bytes>) -> Self {
        Self {
            header,
            payload: payload.into(),
        }
    }
}
