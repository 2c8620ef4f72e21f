// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::cli_shared::cli::Config;
use clap::Subcommand;
use std::io::Write as _;

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Dump the effective configuration, defaults included, as TOML
    Dump,
}

impl ConfigCommands {
    pub fn run(self, config: Config) -> anyhow::Result<()> {
        match self {
            Self::Dump => {
                let mut stdout = std::io::stdout().lock();
                write!(stdout, "{}", toml::to_string_pretty(&config)?)?;
                Ok(())
            }
        }
    }
}
