// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type carrying the exit status of the `tap` process.
//!
//! Commands return `ExitError` rather than exiting themselves; `main` is the
//! only place the process terminates. Any other error exits with status 1.

use std::fmt;

/// The tool ran, but its resource usage could not be measured.
pub const EXIT_DEGRADED: i32 = 2;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// The run finished and its results were written with zeroed metrics.
    pub fn degraded(message: impl Into<String>) -> Self {
        Self::new(EXIT_DEGRADED, message)
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ExitError {}
