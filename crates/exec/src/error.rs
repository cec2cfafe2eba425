// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for resolution, execution and process instrumentation.

use std::path::PathBuf;

use crate::result::ExecutionResult;

/// No usable command could be determined.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The declared command or override contains no tokens.
    #[error("the command is empty")]
    EmptyCommand,

    /// The first token is not found on the execution path.
    #[error("the command `{command}` is not a valid executable: `{program}` not found")]
    NotExecutable { command: String, program: String },

    /// Nothing declared and no `run*` entrypoint in any searched directory.
    #[error(
        "the command could not be found (searched {}). Consider adding it to your tool.yml",
        format_dirs(searched)
    )]
    NotFound { searched: Vec<PathBuf> },
}

fn format_dirs(dirs: &[PathBuf]) -> String {
    dirs.iter().map(|d| d.display().to_string()).collect::<Vec<_>>().join(", ")
}

/// Errors from the `/proc` instrumentation handle.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// A `/proc` file could not be read (process gone or access denied).
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `/proc` file did not have the expected layout.
    #[error("unexpected contents in {path}: {detail}")]
    Malformed { path: PathBuf, detail: String },

    /// The process has exited and is no longer sampleable.
    #[error("process {pid} has exited")]
    Exited { pid: u32 },

    /// A system constant (page size, clock ticks) is unavailable.
    #[error("system constant {name} unavailable")]
    Sysconf { name: &'static str },
}

/// Errors from running a resolved command.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The shell could not be launched.
    #[error("failed to execute command `{command}`: {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The child ran, but could not be instrumented. `result` still holds its
    /// exit code and output; every resource metric is zero.
    #[error("failed to attach to process {pid}: {source}")]
    Instrumentation {
        pid: u32,
        #[source]
        source: ProbeError,
        result: Box<ExecutionResult>,
    },

    /// Waiting for the child or collecting its output failed.
    #[error("failed to collect result of `{command}`: {source}")]
    Collect {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl ExecError {
    /// The (possibly degraded) result carried by this error, if any.
    pub fn result(&self) -> Option<&ExecutionResult> {
        match self {
            ExecError::Instrumentation { result, .. } => Some(result),
            ExecError::SpawnFailed { .. } | ExecError::Collect { .. } => None,
        }
    }
}
