// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolved invocation and execution outcome records.

use std::time::Duration;

use serde::{Serialize, Serializer};

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;

/// How a tool's entrypoint is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    /// Shell-interpretable command line, run via `sh -c`.
    pub invocation: String,
    /// Program that `invocation` launches.
    pub executable: String,
    /// Lowercase extension (with leading dot) of the entrypoint file, or
    /// empty when the executable itself is the entrypoint.
    pub extension: String,
}

/// Outcome of running a [`ResolvedCommand`].
///
/// Serializes to the `_metadata.json` record. The captured streams are not
/// part of the record and are persisted separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    #[serde(skip)]
    pub stdout: Vec<u8>,
    #[serde(skip)]
    pub stderr: Vec<u8>,
    /// Exit code, or `-1` if the child was killed by a signal.
    pub exit_code: i32,
    #[serde(serialize_with = "as_nanos")]
    pub user_time: Duration,
    #[serde(serialize_with = "as_nanos")]
    pub system_time: Duration,
    pub memory_max_bytes: u64,
    pub memory_average_bytes: u64,
    pub cpu_max_permille: u64,
    pub cpu_average_permille: u64,
    pub read_bytes_sum: u64,
    pub write_bytes_sum: u64,
}

/// Durations are recorded as integer nanoseconds.
fn as_nanos<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX))
}
