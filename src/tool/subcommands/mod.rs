// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub mod cat_cmd;
pub mod config_cmd;
pub mod map_cmd;
pub mod reduce_cmd;

use crate::utils::misc::LoggingColor;
use clap::Parser;
use std::path::PathBuf;

/// Command-line options for the `arc-tool` binary
#[derive(Parser)]
#[command(name = "arc-tool", version, about = env!("CARGO_PKG_DESCRIPTION"))]
pub struct Cli {
    /// TOML configuration file. Defaults to the file named by `ARC_STREAM_CONFIG`.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Colorize logs: `always`, `auto` or `never`.
    #[arg(long, global = true, default_value = "auto")]
    pub color: LoggingColor,
    #[command(subcommand)]
    pub cmd: Subcommand,
}

/// arc-tool sub-commands
#[derive(clap::Subcommand)]
pub enum Subcommand {
    /// Convert the HTML documents of archives into plain text exchange lines
    Map(map_cmd::MapCommand),

    /// Write exchange lines back out as a single archive
    Reduce(reduce_cmd::ReduceCommand),

    /// Print the version block and record headers of an archive
    Cat(cat_cmd::CatCommand),

    /// Inspect the configuration
    #[command(subcommand)]
    Config(config_cmd::ConfigCommands),
}
