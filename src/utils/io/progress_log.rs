// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Periodic progress messages for long transfers, for use where no progress
//! bar can be drawn (batch jobs log to stderr only).

use human_repr::HumanCount as _;
use humantime::format_duration;
use std::time::{Duration, Instant};
use tracing::info;

const UPDATE_FREQUENCY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ProgressLog {
    completed_bytes: u64,
    total_bytes: u64,
    frequency: Duration,
    start: Instant,
    last_logged: Instant,
    message: String,
}

impl ProgressLog {
    pub fn new(message: impl Into<String>, total_bytes: u64) -> Self {
        let now = Instant::now();
        Self {
            completed_bytes: 0,
            total_bytes,
            frequency: UPDATE_FREQUENCY,
            start: now,
            last_logged: now,
            message: message.into(),
        }
    }

    pub fn inc(&mut self, value: u64) {
        self.completed_bytes += value;
        self.emit_log_if_required();
    }

    fn emit_log_if_required(&mut self) {
        let now = Instant::now();
        if (now - self.last_logged) > self.frequency {
            let elapsed_secs = (now - self.start).as_secs_f64();
            let elapsed_duration = format_duration(Duration::from_secs(elapsed_secs as u64));

            let throughput = self.completed_bytes as f64 / elapsed_secs;
            let eta_secs =
                (self.total_bytes.saturating_sub(self.completed_bytes)) as f64 / throughput;
            let eta_duration = format_duration(Duration::from_secs(eta_secs as u64));

            info!(
                "{} {} / {} (elapsed: {}, eta: {})",
                self.message,
                self.completed_bytes.human_count_bytes(),
                self.total_bytes.human_count_bytes(),
                elapsed_duration,
                eta_duration
            );
            self.last_logged = now;
        }
    }

    pub fn finish(&self) {
        info!(
            "{} {} in {}",
            self.message,
            self.completed_bytes.human_count_bytes(),
            format_duration(Duration::from_secs(self.start.elapsed().as_secs()))
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_bytes() {
        let mut progress = ProgressLog::new("fetched", 10);
        progress.inc(4);
        progress.inc(6);
        assert_eq!(progress.completed_bytes, 10);
    }
}
