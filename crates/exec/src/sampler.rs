// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic resource sampling of a running child.
//!
//! The sampler is the only writer of its sample vectors. It stops as soon as
//! the completion signal fires and never samples after that; a tick and the
//! signal arriving together resolve in favour of the signal.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::metrics;
use crate::probe::ProcessProbe;

#[cfg(test)]
#[path = "sampler_tests.rs"]
mod tests;

/// Shortest sampling period; intervals reject zero.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Readings collected while the child ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Samples {
    pub memory_bytes: Vec<u64>,
    pub cpu_permille: Vec<u64>,
}

impl Samples {
    pub fn memory_max(&self) -> u64 {
        metrics::max(&self.memory_bytes)
    }

    pub fn memory_average(&self) -> u64 {
        metrics::average(&self.memory_bytes)
    }

    pub fn cpu_max(&self) -> u64 {
        metrics::max(&self.cpu_permille)
    }

    pub fn cpu_average(&self) -> u64 {
        metrics::average(&self.cpu_permille)
    }
}

/// Sample `probe` every `period` until `done` fires (or its sender is dropped).
///
/// The first sample is taken one full period after the call. Failed reads are
/// skipped.
pub async fn sample_until<P: ProcessProbe>(
    probe: &mut P,
    period: Duration,
    mut done: oneshot::Receiver<()>,
) -> Samples {
    let period = period.max(MIN_PERIOD);
    let mut samples = Samples::default();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut done => break,
            _ = ticker.tick() => {
                match probe.memory_rss() {
                    Ok(bytes) => samples.memory_bytes.push(bytes),
                    Err(e) => tracing::trace!(error = %e, "memory sample skipped"),
                }
                match probe.cpu_percent() {
                    Ok(percent) => samples.cpu_permille.push(to_permille(percent)),
                    Err(e) => tracing::trace!(error = %e, "cpu sample skipped"),
                }
            }
        }
    }

    tracing::debug!(
        memory_samples = samples.memory_bytes.len(),
        cpu_samples = samples.cpu_permille.len(),
        "sampling stopped"
    );
    samples
}

/// Percent to tenths of a percent, truncating.
pub(crate) fn to_permille(percent: f64) -> u64 {
    if percent.is_finite() && percent > 0.0 {
        (percent * 10.0) as u64
    } else {
        0
    }
}
