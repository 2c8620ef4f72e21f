// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::arc::{ArcRecord, CONTENT_TYPE_COLUMN};
use crate::blob::{BlobLocation, BlobRangeFetcher};
use crate::exchange::{CONVERTED_FROM_HEADER, ExchangeRecord, NetworkDoc};
use crate::extract::TextExtractor;
use crate::ingest::{ArchiveStream, FetchConfig};
use anyhow::Context as _;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncWrite, AsyncWriteExt as _};
use tracing::{error, info};

const CONVERTIBLE_CONTENT_TYPE: &str = "text/html";
const CONVERTED_CONTENT_TYPE: &str = "text/plain";

/// Counters for one archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapStats {
    pub records: u64,
    pub converted: u64,
}

/// Counters for a whole map run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapSummary {
    pub archives: u64,
    pub failed: u64,
    pub records: u64,
    pub converted: u64,
}

/// Converts one HTML record into its plain text exchange form. Records of any
/// other content type are skipped.
pub fn process_record(record: &ArcRecord, extractor: &dyn TextExtractor) -> Option<ExchangeRecord> {
    let content_type = record.header.content_type()?;
    if content_type != CONVERTIBLE_CONTENT_TYPE {
        return None;
    }
    let raw = String::from_utf8_lossy(&record.payload);
    let (mut headers, body) = NetworkDoc::parse(&raw);
    let content = extractor.extract(body.as_bytes(), content_type);
    headers.insert("Content-Type".into(), CONVERTED_CONTENT_TYPE.into());
    headers.insert(CONVERTED_FROM_HEADER.into(), content_type.into());

    let mut url_record_headers = record.header.clone();
    url_record_headers.insert(CONTENT_TYPE_COLUMN, CONVERTED_CONTENT_TYPE);
    Some(ExchangeRecord {
        url_record_headers,
        network_doc: NetworkDoc { headers, content },
    })
}

/// Streams one archive and writes an exchange line to `out` for every record
/// that converts.
pub async fn map_archive<W: AsyncWrite + Unpin>(
    fetcher: Arc<dyn BlobRangeFetcher>,
    config: &FetchConfig,
    label: &str,
    extractor: &dyn TextExtractor,
    out: &mut W,
) -> anyhow::Result<MapStats> {
    let mut archive = ArchiveStream::open(fetcher, config, label).await?;
    let mut stats = MapStats::default();
    while let Some(record) = archive.next_record().await {
        let record = record.with_context(|| format!("after {} records", stats.records))?;
        stats.records += 1;
        let Some(converted) = process_record(&record, extractor) else {
            continue;
        };
        let mut line = converted.to_line()?;
        line.push('\n');
        out.write_all(line.as_bytes())
            .await
            .context("failed to write exchange line")?;
        stats.converted += 1;
    }
    out.flush().await?;
    Ok(stats)
}

/// Maps each location in turn. A failing archive is logged and counted, and
/// the remaining ones still run.
pub async fn map_locations<W: AsyncWrite + Unpin>(
    locations: impl IntoIterator<Item = String>,
    config: &FetchConfig,
    extractor: &dyn TextExtractor,
    out: &mut W,
) -> MapSummary {
    let mut summary = MapSummary::default();
    for location in locations {
        let location = location.trim();
        if location.is_empty() {
            continue;
        }
        summary.archives += 1;
        info!("starting work on {location}");
        let start = Instant::now();
        let result = async {
            let fetcher = location
                .parse::<BlobLocation>()?
                .fetcher(&config.s3_endpoint)?;
            map_archive(fetcher, config, location, extractor, out).await
        }
        .await;
        match result {
            Ok(stats) => {
                info!(
                    records = stats.records,
                    converted = stats.converted,
                    "finished {location} in {}",
                    humantime::format_duration(start.elapsed())
                );
                summary.records += stats.records;
                summary.converted += stats.converted;
            }
            Err(e) => {
                error!("failed to process {location}: {e:#}");
                summary.failed += 1;
            }
        }
    }
    summary
}
