// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Streaming ingestion and emission of ARC web-archive containers.
//!
//! Archives are downloaded in ranged chunks ([`blob`]), decompressed and
//! decoded as they arrive ([`ingest`], [`arc`]), converted to plain text
//! ([`extract`], [`pipeline`]) and written back out as new archives.

pub mod arc;
pub mod blob;
mod cli_shared;
pub mod exchange;
pub mod extract;
pub mod ingest;
pub mod pipeline;
mod tool;
mod utils;

pub use cli_shared::cli::Config;
pub use tool::main::main as tool_main;
pub use utils::{RetryArgs, RetryError, retry};
