// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::cli_shared::cli::Config;
use crate::pipeline::reduce;
use anyhow::Context as _;
use async_compression::tokio::write::GzipEncoder;
use clap::Args;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader, BufWriter};
use tracing::info;

#[derive(Debug, Args)]
pub struct ReduceCommand {
    /// File of exchange lines. Defaults to stdin.
    pub input: Option<PathBuf>,
    /// Write the archive to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Gzip the archive.
    #[arg(long)]
    pub compress: bool,
    /// Archive name recorded in the version block.
    #[arg(long)]
    pub name: Option<String>,
    /// Origin code recorded in the version block.
    #[arg(long)]
    pub origin_code: Option<String>,
}

impl ReduceCommand {
    pub async fn run(self, config: Config) -> anyhow::Result<()> {
        let mut writer_config = config.writer;
        if let Some(name) = self.name {
            writer_config.name = name;
        }
        if let Some(origin_code) = self.origin_code {
            writer_config.origin_code = origin_code;
        }

        let input: Box<dyn AsyncBufRead + Unpin + Send> = match &self.input {
            Some(path) => Box::new(BufReader::new(
                tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("failed to open {}", path.display()))?,
            )),
            None => Box::new(BufReader::new(tokio::io::stdin())),
        };
        let output: Box<dyn AsyncWrite + Unpin + Send> = match &self.output {
            Some(path) => Box::new(
                tokio::fs::File::create(path)
                    .await
                    .with_context(|| format!("failed to create {}", path.display()))?,
            ),
            None => Box::new(tokio::io::stdout()),
        };
        let output = BufWriter::new(output);
        let written = if self.compress {
            reduce(input, GzipEncoder::new(output), writer_config).await?
        } else {
            reduce(input, output, writer_config).await?
        };
        info!(records = written, "archive written");
        Ok(())
    }
}
