// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub mod io;
pub mod misc;
pub mod net;

use std::{pin::Pin, time::Duration};

use futures::{
    Future, FutureExt,
    future::{FusedFuture, pending},
    select,
};
use tokio::time::sleep;
use tracing::warn;

/// Keep running the future created by `make_fut` until it succeeds, or the
/// timeout or attempt limit in `args` is reached. The last error is returned
/// when attempts run out.
/// `F` _must_ be cancel safe.
#[tracing::instrument(skip_all)]
pub async fn retry<F, T, E>(
    args: RetryArgs,
    mut make_fut: impl FnMut() -> F,
) -> Result<T, RetryError<E>>
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut timeout: Pin<Box<dyn FusedFuture<Output = ()> + Send>> = match args.timeout {
        Some(duration) => Box::pin(sleep(duration).fuse()),
        None => Box::pin(pending()),
    };
    let max_attempts = args.max_attempts.max(1);
    let mut task = Box::pin(
        async {
            let mut attempt = 0;
            loop {
                attempt += 1;
                match make_fut().await {
                    Ok(ok) => return Ok(ok),
                    Err(last) if attempt >= max_attempts => {
                        return Err(RetryError::RetriesExceeded {
                            attempts: attempt,
                            last,
                        });
                    }
                    Err(err) => warn!("attempt {attempt}/{max_attempts} failed ({err}), retrying"),
                }
                if let Some(delay) = args.delay {
                    sleep(delay).await;
                }
            }
        }
        .fuse(),
    );
    select! {
        _ = timeout => Err(RetryError::TimeoutExceeded),
        res = task => res,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, smart_default::SmartDefault)]
pub struct RetryArgs {
    pub timeout: Option<Duration>,
    /// Total number of tries, the first one included.
    #[default(5)]
    pub max_attempts: usize,
    #[default(Some(Duration::from_secs(1)))]
    pub delay: Option<Duration>,
}

#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    #[error("operation timed out")]
    TimeoutExceeded,
    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExceeded {
        attempts: usize,
        #[source]
        last: E,
    },
}
