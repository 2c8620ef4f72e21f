// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub mod cli;
pub mod logger;

use crate::cli_shared::cli::{Config, ConfigPath, find_config_path};
use crate::utils::io::read_toml;
use anyhow::Context as _;
use std::path::Path;

/// Reads the configuration from `config_path_opt`, or from the file named by
/// [`cli::CONFIG_ENV`], falling back to defaults when neither is set.
pub fn read_config(config_path_opt: Option<&Path>) -> anyhow::Result<(Option<ConfigPath>, Config)> {
    match find_config_path(config_path_opt) {
        Some(path) => {
            let toml = std::fs::read_to_string(path.path())
                .with_context(|| format!("failed to read {}", path.path().display()))?;
            let config = read_toml(&toml)
                .with_context(|| format!("invalid configuration in {}", path.path().display()))?;
            Ok((Some(path), config))
        }
        None => Ok((None, Config::default())),
    }
}
