// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::arc::{ArcWriter, WriterConfig};
use crate::exchange::ExchangeRecord;
use anyhow::Context as _;
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _, AsyncWrite};
use tracing::debug;

/// Writes every exchange line of `input` as a record of a new archive.
/// Returns the number of records written. Blank lines are ignored; a
/// malformed line aborts with its line number.
pub async fn reduce<R, W>(input: R, output: W, config: WriterConfig) -> anyhow::Result<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut writer = ArcWriter::new(output, config).await?;
    debug!(name = %writer.version_block().name, "writing archive");
    let mut lines = input.lines();
    let mut line_number = 0;
    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }
        let record = ExchangeRecord::from_line(&line)
            .with_context(|| format!("invalid exchange line {line_number}"))?;
        let payload = record.network_doc.to_raw();
        writer
            .append(record.url_record_headers, payload)
            .await
            .with_context(|| format!("failed to write the record of line {line_number}"))?;
    }
    Ok(writer.finish().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arc::{ArcReader, ArcRecord};
    use crate::exchange::NetworkDoc;
    use futures::TryStreamExt as _;
    use pretty_assertions::assert_eq;

    fn line(url: &str, content: &str) -> String {
        ExchangeRecord {
            url_record_headers: [
                ("URL", url),
                ("IP-address", "1.2.3.4"),
                ("Archive-date", "20200101000100"),
                ("Content-type", "text/plain"),
                ("Archive-length", "1"),
            ]
            .into_iter()
            .collect(),
            network_doc: NetworkDoc {
                headers: [("Content-Type".to_owned(), "text/plain".to_owned())]
                    .into_iter()
                    .collect(),
                content: content.into(),
            },
        }
        .to_line()
        .unwrap()
    }

    #[tokio::test]
    async fn exchange_lines_to_archive() {
        let input = format!(
            "{}\n\n{}\r\n",
            line("http://example.com/a", "first"),
            line("http://example.com/b", "second\nline")
        );
        let mut output = Vec::new();
        let written = reduce(input.as_bytes(), &mut output, WriterConfig::default())
            .await
            .unwrap();
        assert_eq!(written, 2);

        let reader = ArcReader::new(output.as_slice()).await.unwrap();
        assert_eq!(reader.version_block().origin_code, "CommonCrawl");
        let records: Vec<ArcRecord> = reader.try_collect().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].header.url(), Some("http://example.com/b"));
        assert_eq!(
            records[1].payload,
            "HTTP/1.1 200 OK\nContent-Type:text/plain\n\nsecond\nline"
        );
        assert_eq!(
            records[1].header.get("Archive-length"),
            Some(records[1].payload.len().to_string().as_str())
        );
    }

    #[tokio::test]
    async fn malformed_line_reports_its_number() {
        let input = format!("{}\nnot an exchange line\n", line("http://example.com/", "x"));
        let err = reduce(input.as_bytes(), Vec::new(), WriterConfig::default())
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("line 2"), "{err:#}");
    }
}
