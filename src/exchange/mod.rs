// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! The line format records travel in between the map and reduce sides:
//! `<URL> <Archive-date>\t<json>`, one record per line.

use crate::arc::RecordHeader;
use indexmap::IndexMap;
use lazy_regex::regex;
use serde::{Deserialize, Serialize};

/// Response header holding the HTTP status line of a captured document.
pub const STATUS_HEADER: &str = "x_commoncrawl_Status";
/// Response header recording the content type a document was converted from.
pub const CONVERTED_FROM_HEADER: &str = "x_commoncrawl_Converted-From";
/// Status line used when a document carries none.
pub const DEFAULT_STATUS: &str = "HTTP/1.1 200 OK";

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("missing tab between key and value")]
    MissingTab,
    #[error("invalid record value: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub url_record_headers: RecordHeader,
    pub network_doc: NetworkDoc,
}

/// A captured HTTP response, split into headers and (converted) content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDoc {
    pub headers: IndexMap<String, String>,
    pub content: String,
}

impl ExchangeRecord {
    /// `<URL> <Archive-date>`, unique enough to key a document.
    pub fn key(&self) -> String {
        format!(
            "{} {}",
            self.url_record_headers.url().unwrap_or_default(),
            self.url_record_headers.archive_date().unwrap_or_default()
        )
    }

    /// The record as one line, without the trailing newline.
    pub fn to_line(&self) -> Result<String, ExchangeError> {
        Ok(format!("{}\t{}", self.key(), serde_json::to_string(self)?))
    }

    /// Parses a line produced by [`ExchangeRecord::to_line`]. The key is
    /// ignored; everything needed is in the value.
    pub fn from_line(line: &str) -> Result<Self, ExchangeError> {
        let (_key, value) = line.split_once('\t').ok_or(ExchangeError::MissingTab)?;
        Ok(serde_json::from_str(value)?)
    }
}

impl NetworkDoc {
    /// Splits a raw HTTP response at its first blank line. The status line
    /// goes under [`STATUS_HEADER`]; a response without a blank line is all
    /// headers.
    pub fn parse(raw: &str) -> (IndexMap<String, String>, &str) {
        let (head, body) = match regex!(r"\r?\n\r?\n").find(raw) {
            Some(m) => (&raw[..m.start()], &raw[m.end()..]),
            None => (raw, ""),
        };
        let mut lines = head.split('\n');
        let mut headers = IndexMap::new();
        if let Some(status) = lines.next() {
            headers.insert(STATUS_HEADER.to_owned(), status.trim().to_owned());
        }
        for line in lines.map(str::trim).filter(|line| !line.is_empty()) {
            let (name, value) = line.split_once(':').unwrap_or((line, ""));
            headers.insert(name.to_owned(), value.to_owned());
        }
        (headers, body)
    }

    /// Reassembles the document as an HTTP response: status line, `name:value`
    /// header lines, a blank line, then the content.
    pub fn to_raw(&self) -> String {
        let status = self
            .headers
            .get(STATUS_HEADER)
            .map(String::as_str)
            .unwrap_or(DEFAULT_STATUS);
        let mut raw = String::from(status);
        for (name, value) in self.headers.iter().filter(|(name, _)| *name != STATUS_HEADER) {
            raw.push('\n');
            raw.push_str(name);
            raw.push(':');
            raw.push_str(value);
        }
        raw.push_str("\n\n");
        raw.push_str(&self.content);
        raw
    }
}
