// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{ArcError, ArcRecord, ArcRecordCodec, DEFAULT_COLUMNS, RecordHeader, VersionBlock};
use bytes::Bytes;
use futures::SinkExt as _;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use tokio::io::{AsyncWrite, AsyncWriteExt as _};
use tokio_util::codec::FramedWrite;

/// Settings for the version block of a new archive. Every field has a fixed
/// default; `date` defaults to the time the writer is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SmartDefault)]
#[serde(default)]
pub struct WriterConfig {
    #[default("filedesc://unknown.arc.gz".into())]
    pub name: String,
    #[default("0.0.0.0".into())]
    pub address: String,
    /// `YYYYMMDDHHMMSS`, UTC.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[default("text/plain".into())]
    pub content_type: String,
    #[default("1".into())]
    pub version: String,
    #[default("0".into())]
    pub reserved: String,
    #[default("CommonCrawl".into())]
    pub origin_code: String,
    #[default(DEFAULT_COLUMNS.map(String::from).to_vec())]
    pub columns: Vec<String>,
}

impl WriterConfig {
    pub fn version_block(&self) -> Result<VersionBlock, ArcError> {
        let date = self
            .date
            .clone()
            .unwrap_or_else(|| chrono::Utc::now().format("%Y%m%d%H%M%S").to_string());
        let block = VersionBlock {
            name: self.name.clone(),
            address: self.address.clone(),
            date,
            content_type: self.content_type.clone(),
            version: self.version.clone(),
            reserved: self.reserved.clone(),
            origin_code: self.origin_code.clone(),
            columns: self.columns.clone(),
        };
        // Whitespace inside a field would shift every field after it when read back.
        let fields = [
            ("name", &block.name),
            ("address", &block.address),
            ("date", &block.date),
            ("content type", &block.content_type),
            ("version", &block.version),
            ("reserved", &block.reserved),
            ("origin code", &block.origin_code),
        ];
        for (field, value) in fields.into_iter().chain(block.columns.iter().map(|c| ("column", c))) {
            if value.is_empty() || value.contains(char::is_whitespace) {
                return Err(ArcError::config(format!("invalid {field} {value:?}")));
            }
        }
        if block.columns.is_empty() {
            return Err(ArcError::config("at least one column is required"));
        }
        Ok(block)
    }
}

/// Writes an ARC container: the version block on creation, then one record
/// per [`ArcWriter::append`].
pub struct ArcWriter<W> {
    frames: FramedWrite<W, ArcRecordCodec>,
    version_block: VersionBlock,
    records: u64,
}

impl<W: AsyncWrite + Unpin> ArcWriter<W> {
    pub async fn new(mut writer: W, config: WriterConfig) -> Result<Self, ArcError> {
        let version_block = config.version_block()?;
        writer.write_all(&version_block.to_bytes()).await?;
        let codec = ArcRecordCodec::new(version_block.columns.clone());
        Ok(Self {
            frames: FramedWrite::new(writer, codec),
            version_block,
            records: 0,
        })
    }

    /// Appends one record. The length column is set from `payload`, whatever
    /// `header` says. Columns missing from `header` are written empty.
    ///
    /// The record may stay buffered until a later append or
    /// [`ArcWriter::finish`].
    ///
    /// Values must not contain spaces or newlines.
    pub async fn append(
        &mut self,
        header: RecordHeader,
        payload: impl Into<Bytes>,
    ) -> Result<(), ArcError> {
        self.frames.feed(ArcRecord::new(header, payload)).await?;
        self.records += 1;
        Ok(())
    }

    /// Flushes and shuts down the sink, returning the number of records written.
    pub async fn finish(mut self) -> Result<u64, ArcError> {
        self.frames.close().await?;
        Ok(self.records)
    }

    pub fn version_block(&self) -> &VersionBlock {
        &self.version_block
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::io::AsyncReadExt as _;

    fn fixed_config() -> WriterConfig {
        WriterConfig {
            name: "filedesc://test.arc".into(),
            date: Some("20200101000000".into()),
            origin_code: "TestOrigin".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn writes_version_block_on_creation() {
        let mut buffer = Vec::new();
        ArcWriter::new(&mut buffer, fixed_config())
            .await
            .unwrap()
            .finish()
            .await
            .unwrap();
        let body = "1 0 TestOrigin\nURL IP-address Archive-date Content-type Archive-length\n\n";
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            format!(
                "filedesc://test.arc 0.0.0.0 20200101000000 text/plain {}\n{body}",
                body.len()
            )
        );
    }

    #[tokio::test]
    async fn length_field_is_recomputed() {
        let mut buffer = Vec::new();
        let mut writer = ArcWriter::new(&mut buffer, fixed_config()).await.unwrap();
        let header: RecordHeader = [
            ("URL", "http://example.com/"),
            ("IP-address", "1.2.3.4"),
            ("Archive-date", "20200101000100"),
            ("Content-type", "text/html"),
            ("Archive-length", "12345"),
        ]
        .into_iter()
        .collect();
        writer.append(header, &b"hello"[..]).await.unwrap();
        assert_eq!(writer.finish().await.unwrap(), 1);
        assert!(
            String::from_utf8(buffer)
                .unwrap()
                .ends_with("\nhttp://example.com/ 1.2.3.4 20200101000100 text/html 5\nhello\n")
        );
    }

    #[tokio::test]
    async fn buffered_records_reach_the_sink_before_finish() {
        let (sink, mut written) = tokio::io::duplex(64 * 1024);
        let mut writer = ArcWriter::new(sink, fixed_config()).await.unwrap();
        let block_len = writer.version_block().to_bytes().len();
        let header: RecordHeader = [("URL", "http://example.com/big")].into_iter().collect();
        let big = vec![b'x'; 16 * 1024];
        writer.append(header.clone(), big.clone()).await.unwrap();
        writer.append(header, &b"small"[..]).await.unwrap();

        // The big record filled the buffer, so the second append pushed it out.
        let line = "http://example.com/big    16384\n";
        let mut flushed = vec![0; block_len + line.len() + big.len() + 1];
        written.read_exact(&mut flushed).await.unwrap();
        assert!(flushed.ends_with(b"xxx\n"));
        assert_eq!(&flushed[block_len..block_len + line.len()], line.as_bytes());

        assert_eq!(writer.finish().await.unwrap(), 2);
        let mut rest = String::new();
        written.read_to_string(&mut rest).await.unwrap();
        assert_eq!(rest, "http://example.com/big    5\nsmall\n");
    }

    #[test]
    fn default_date_is_current_utc() {
        let block = WriterConfig::default().version_block().unwrap();
        assert_eq!(block.date.len(), 14);
        assert!(block.date.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(block.address, "0.0.0.0");
        assert_eq!(block.content_type, "text/plain");
    }

    #[test]
    fn reject_whitespace_in_fields() {
        let config = WriterConfig {
            origin_code: "Common Crawl".into(),
            ..Default::default()
        };
        assert!(matches!(config.version_block(), Err(ArcError::Config(_))));
        let config = WriterConfig {
            columns: vec![],
            ..Default::default()
        };
        assert!(matches!(config.version_block(), Err(ArcError::Config(_))));
    }
}
