// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{ArcError, ArcRecord, RecordHeader};
use bytes::{Buf as _, BufMut as _, BytesMut};
use std::sync::Arc;
use tokio_util::codec::{Decoder, Encoder};

/// Record header lines longer than this are treated as corruption rather than
/// buffered indefinitely.
const MAX_LINE_LEN: usize = 64 * 1024;

/// Large payloads grow the read buffer gradually instead of up front.
const MAX_RESERVE: usize = 8 * 1024 * 1024;

/// Frames ARC records following the version block.
///
/// Each record is a header line with one space-separated value per column, the
/// payload whose length is the value of the last column, and a single `\n`.
#[derive(Debug, Clone)]
pub struct ArcRecordCodec {
    columns: Arc<[String]>,
    state: DecodeState,
    /// Number of records decoded so far, for error reporting.
    index: u64,
}

#[derive(Debug, Clone)]
enum DecodeState {
    Line,
    Payload { header: RecordHeader, len: usize },
}

impl ArcRecordCodec {
    pub fn new(columns: impl Into<Arc<[String]>>) -> Self {
        Self {
            columns: columns.into(),
            state: DecodeState::Line,
            index: 0,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    fn parse_line(&self, line: &[u8]) -> Result<(RecordHeader, usize), ArcError> {
        let line = std::str::from_utf8(line)
            .map_err(|_| ArcError::corrupt(self.index, "header line is not valid UTF-8"))?;
        let line = line.strip_suffix('\r').unwrap_or(line);
        // Single spaces keep the empty values of missing columns. Lines from
        // writers that pad with tabs or extra spaces only match when split on
        // runs of whitespace.
        let mut values = line.split(' ').collect::<Vec<_>>();
        if values.len() != self.columns.len() {
            values = line.split_whitespace().collect();
        }
        if values.len() != self.columns.len() {
            return Err(ArcError::corrupt(
                self.index,
                format!(
                    "expected {} fields, got {} in {line:?}",
                    self.columns.len(),
                    values.len()
                ),
            ));
        }
        let length = values.last().copied().unwrap_or_default();
        let len = length
            .parse::<usize>()
            .ok()
            .filter(|len| *len < usize::MAX)
            .ok_or_else(|| {
                ArcError::corrupt(self.index, format!("invalid payload length {length:?}"))
            })?;
        let header = self.columns.iter().cloned().zip(values).collect();
        Ok((header, len))
    }
}

impl Decoder for ArcRecordCodec {
    type Item = ArcRecord;
    type Error = ArcError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let DecodeState::Line = self.state {
            let Some(newline) = src.iter().position(|b| *b == b'\n') else {
                if src.len() > MAX_LINE_LEN {
                    return Err(ArcError::corrupt(
                        self.index,
                        format!("no header line terminator within {MAX_LINE_LEN} bytes"),
                    ));
                }
                return Ok(None);
            };
            let (header, len) = self.parse_line(&src[..newline])?;
            src.advance(newline + 1);
            self.state = DecodeState::Payload { header, len };
        }

        let DecodeState::Payload { len, .. } = self.state else {
            unreachable!("header line has been consumed")
        };
        if src.len() <= len {
            src.reserve((len + 1 - src.len()).min(MAX_RESERVE));
            return Ok(None);
        }
        let payload = src.split_to(len).freeze();
        let terminator = src.get_u8();
        if terminator != b'\n' {
            return Err(ArcError::corrupt(
                self.index,
                format!("expected \\n as record terminator, got {terminator:#04x}"),
            ));
        }
        let DecodeState::Payload { header, .. } =
            std::mem::replace(&mut self.state, DecodeState::Line)
        else {
            unreachable!("state checked above")
        };
        self.index += 1;
        Ok(Some(ArcRecord { header, payload }))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(record) => Ok(Some(record)),
            None if buf.is_empty() && matches!(self.state, DecodeState::Line) => Ok(None),
            None => Err(ArcError::corrupt(
                self.index,
                "stream ended in the middle of a record",
            )),
        }
    }
}

impl Encoder<ArcRecord> for ArcRecordCodec {
    type Error = ArcError;

    /// Header values must not contain spaces or newlines, otherwise the line
    /// will not decode.
    fn encode(&mut self, mut item: ArcRecord, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let Some(length_column) = self.columns.last() else {
            return Err(ArcError::config("no columns declared"));
        };
        // The declared length is always recomputed from the payload.
        item.header
            .insert(length_column.as_str(), item.payload.len().to_string());

        dst.reserve(item.payload.len() + 128);
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                dst.put_u8(b' ');
            }
            dst.put_slice(item.header.get(column).unwrap_or_default().as_bytes());
        }
        dst.put_u8(b'\n');
        dst.put_slice(&item.payload);
        dst.put_u8(b'\n');
        Ok(())
    }
}
