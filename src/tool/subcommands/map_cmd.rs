// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::cli_shared::cli::Config;
use crate::extract::HtmlTextExtractor;
use crate::pipeline::map_locations;
use anyhow::bail;
use clap::Args;
use tokio::io::{AsyncBufReadExt as _, AsyncWriteExt as _, BufReader, BufWriter};
use tracing::info;

#[derive(Debug, Args)]
pub struct MapCommand {
    /// Archive locations: `s3://bucket/key`, `http(s)://` URLs, `file://` URLs
    /// or paths. Read one per line from stdin when none are given.
    pub locations: Vec<String>,
    /// Bytes requested per ranged fetch.
    #[arg(long)]
    pub chunk_size: Option<u64>,
    /// Tries per chunk before an archive is given up.
    #[arg(long)]
    pub max_attempts: Option<usize>,
    /// URL template for `s3://` locations, with `{bucket}` and `{key}` placeholders.
    #[arg(long)]
    pub s3_endpoint: Option<String>,
}

impl MapCommand {
    pub async fn run(self, config: Config) -> anyhow::Result<()> {
        let Self {
            mut locations,
            chunk_size,
            max_attempts,
            s3_endpoint,
        } = self;
        let mut fetch = config.fetch;
        if let Some(chunk_size) = chunk_size {
            fetch.chunk_size = chunk_size;
        }
        if let Some(max_attempts) = max_attempts {
            fetch.max_attempts = max_attempts;
        }
        if let Some(s3_endpoint) = s3_endpoint {
            fetch.s3_endpoint = s3_endpoint;
        }

        if locations.is_empty() {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                locations.push(line);
            }
        }

        let mut stdout = BufWriter::new(tokio::io::stdout());
        let summary = map_locations(locations, &fetch, &HtmlTextExtractor, &mut stdout).await;
        stdout.flush().await?;
        info!(
            archives = summary.archives,
            failed = summary.failed,
            records = summary.records,
            converted = summary.converted,
            "map finished"
        );
        if summary.failed > 0 {
            bail!("{} of {} archives failed", summary.failed, summary.archives);
        }
        Ok(())
    }
}
