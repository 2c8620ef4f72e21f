// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod config;

pub use config::Config;

use std::path::{Path, PathBuf};

/// Environment variable naming a configuration file, used when no path is
/// given on the command line.
pub const CONFIG_ENV: &str = "ARC_STREAM_CONFIG";

/// Where the configuration file was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigPath {
    Cli(PathBuf),
    Env(PathBuf),
}

impl ConfigPath {
    pub fn path(&self) -> &Path {
        match self {
            ConfigPath::Cli(path) | ConfigPath::Env(path) => path,
        }
    }
}

pub fn find_config_path(config: Option<&Path>) -> Option<ConfigPath> {
    if let Some(path) = config {
        return Some(ConfigPath::Cli(path.to_owned()));
    }
    std::env::var_os(CONFIG_ENV)
        .filter(|path| !path.is_empty())
        .map(|path| ConfigPath::Env(PathBuf::from(path)))
}
