// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use tracing_subscriber::{EnvFilter, prelude::*};

use crate::utils::misc::LoggingColor;

/// Logs to stderr, leaving stdout to the data the tool emits.
pub fn setup_minimal_logger(color: LoggingColor) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::Layer::new()
                .with_ansi(color.coloring_enabled())
                .with_writer(std::io::stderr)
                .with_filter(get_env_filter(default_tool_filter())),
        )
        .init();
}

/// Returns an [`EnvFilter`] according to the `RUST_LOG` environment variable, or a default
/// - see [`default_tool_filter`]
///
/// Note that [`tracing_subscriber::filter::Builder`] only allows a single default directive,
/// whereas we want to provide multiple.
fn get_env_filter(def: EnvFilter) -> EnvFilter {
    use std::env::{
        self,
        VarError::{NotPresent, NotUnicode},
    };
    match env::var(EnvFilter::DEFAULT_ENV) {
        Ok(s) => EnvFilter::new(s),
        Err(NotPresent) => def,
        Err(NotUnicode(_)) => EnvFilter::default(),
    }
}

fn default_tool_filter() -> EnvFilter {
    let default_directives = ["info", "hyper_util=warn", "reqwest=warn", "rustls=warn"];
    EnvFilter::new(default_directives.join(","))
}

#[test]
fn test_default_tool_filter() {
    assert_eq!(
        default_tool_filter().max_level_hint(),
        Some(tracing::level_filters::LevelFilter::INFO)
    );
}
