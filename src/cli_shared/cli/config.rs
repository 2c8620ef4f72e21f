// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::arc::WriterConfig;
use crate::ingest::FetchConfig;
use serde::{Deserialize, Serialize};

/// Settings read from the TOML configuration file. Every section and field is
/// optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub writer: WriterConfig,
}
