// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::arc::{ArcReader, ArcRecord, VersionBlock};
use crate::blob::BlobLocation;
use crate::cli_shared::cli::Config;
use crate::ingest::{ArchiveStream, Compression, decompress};
use anyhow::Context as _;
use clap::Args;
use futures::{Stream, StreamExt as _};
use itertools::Itertools as _;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt as _, BufReader, BufWriter};

const STDIN_LOCATION: &str = "-";

#[derive(Debug, Args)]
pub struct CatCommand {
    /// Archive location, as accepted by `map`, or `-` to read the archive
    /// from stdin.
    pub location: String,
}

impl CatCommand {
    pub async fn run(self, config: Config) -> anyhow::Result<()> {
        let location = self.location.as_str();
        let mut stdout = BufWriter::new(tokio::io::stdout());
        if location == STDIN_LOCATION {
            return cat_reader(BufReader::new(tokio::io::stdin()), &mut stdout)
                .await
                .context("failed to read the archive on stdin");
        }

        let fetcher = location
            .parse::<BlobLocation>()?
            .fetcher(&config.fetch.s3_endpoint)?;
        let archive = ArchiveStream::open(fetcher, &config.fetch, location)
            .await
            .with_context(|| format!("failed to open {location}"))?;
        let block = archive.version_block().clone();
        let compression = archive.compression();
        print_archive(&block, compression, archive.into_stream(), &mut stdout)
            .await
            .with_context(|| format!("failed to read {location}"))
    }
}

/// Decodes an archive as it arrives on `input`, without buffering it whole.
async fn cat_reader<R, W>(input: R, out: &mut W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (compression, decoded) = decompress(input).await?;
    let reader = ArcReader::new(decoded).await?;
    let block = reader.version_block().clone();
    print_archive(&block, compression, reader, out).await
}

/// Prints the version block as `#` comment lines, then the header values of
/// every record. Output is flushed per record so a slow input shows progress.
async fn print_archive<E, W>(
    block: &VersionBlock,
    compression: Compression,
    records: impl Stream<Item = Result<ArcRecord, E>>,
    out: &mut W,
) -> anyhow::Result<()>
where
    E: std::error::Error + Send + Sync + 'static,
    W: AsyncWrite + Unpin,
{
    let summary = format!(
        "# {} {} {} {} ({compression})\n# {} {} {}\n# {}\n",
        block.name,
        block.address,
        block.date,
        block.content_type,
        block.version,
        block.reserved,
        block.origin_code,
        block.columns.join(" "),
    );
    out.write_all(summary.as_bytes()).await?;
    out.flush().await?;
    let mut records = std::pin::pin!(records);
    while let Some(record) = records.next().await {
        let record = record?;
        let line = record.header.iter().map(|(_, value)| value).join(" ");
        out.write_all(line.as_bytes()).await?;
        out.write_all(b"\n").await?;
        out.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arc::{ArcWriter, RecordHeader, WriterConfig};
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tokio::io::AsyncBufReadExt as _;

    fn header(url: &str) -> RecordHeader {
        [
            ("URL", url),
            ("IP-address", "1.2.3.4"),
            ("Archive-date", "20200101000100"),
            ("Content-type", "text/html"),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn records_are_printed_while_input_is_still_open() {
        let mut archive = Vec::new();
        let mut writer = ArcWriter::new(&mut archive, WriterConfig::default())
            .await
            .unwrap();
        writer.append(header("http://example.com/"), "<p>hi</p>").await.unwrap();
        writer.finish().await.unwrap();

        let (mut input, input_rx) = tokio::io::duplex(1024);
        let (mut output, output_rx) = tokio::io::duplex(1024);
        let cat = tokio::spawn(async move {
            cat_reader(BufReader::new(input_rx), &mut output).await
        });
        input.write_all(&archive).await.unwrap();

        // The input stays open: the record must show up without reaching EOF.
        let mut lines = BufReader::new(output_rx).lines();
        let printed = tokio::time::timeout(Duration::from_secs(5), async {
            let mut printed = Vec::new();
            for _ in 0..4 {
                printed.push(lines.next_line().await.unwrap().unwrap());
            }
            printed
        })
        .await
        .unwrap();
        assert!(printed[0].ends_with("text/plain (none)"), "{}", printed[0]);
        assert_eq!(printed[2], "# URL IP-address Archive-date Content-type Archive-length");
        assert_eq!(printed[3], "http://example.com/ 1.2.3.4 20200101000100 text/html 9");

        drop(input);
        cat.await.unwrap().unwrap();
    }
}
