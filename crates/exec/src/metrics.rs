// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reductions over sample sequences.
//!
//! All three return 0 for an empty sequence so a child that exits before the
//! first sampling tick still produces a fully populated record.

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;

/// Largest sample, or 0.
pub fn max(samples: &[u64]) -> u64 {
    samples.iter().copied().max().unwrap_or(0)
}

/// Sum of all samples, saturating at `u64::MAX`.
pub fn sum(samples: &[u64]) -> u64 {
    samples.iter().fold(0u64, |acc, s| acc.saturating_add(*s))
}

/// Floor of the arithmetic mean, or 0.
pub fn average(samples: &[u64]) -> u64 {
    if samples.is_empty() {
        return 0;
    }
    let total: u128 = samples.iter().map(|s| u128::from(*s)).sum();
    // The mean of u64 values always fits in u64.
    u64::try_from(total / samples.len() as u128).unwrap_or(u64::MAX)
}
