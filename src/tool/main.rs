// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::ffi::OsString;

use super::subcommands::{Cli, Subcommand};
use crate::cli_shared::{logger::setup_minimal_logger, read_config};
use clap::Parser as _;
use tracing::info;

pub fn main<ArgT>(args: impl IntoIterator<Item = ArgT>) -> anyhow::Result<()>
where
    ArgT: Into<OsString> + Clone,
{
    // Capture Cli inputs
    let Cli { config, color, cmd } = Cli::parse_from(args);
    setup_minimal_logger(color);
    let (config_path, config) = read_config(config.as_deref())?;
    if let Some(path) = config_path {
        info!("configuration loaded from {}", path.path().display());
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            match cmd {
                Subcommand::Map(cmd) => cmd.run(config).await,
                Subcommand::Reduce(cmd) => cmd.run(config).await,
                Subcommand::Cat(cmd) => cmd.run(config).await,
                Subcommand::Config(cmd) => cmd.run(config),
            }
        })
}
