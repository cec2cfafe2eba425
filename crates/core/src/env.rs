// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! Every variable the shim reads is looked up here. Empty values are treated
//! the same as unset ones.

use std::path::PathBuf;
use std::time::Duration;

/// Prefix shared by all shim-specific variables.
pub const ENV_PREFIX: &str = "TAP_";

/// Command override used when the tool spec declares no command.
pub const COMMAND_VAR: &str = "TAP_COMMAND";

/// Tool name used when none is passed on the command line.
pub const RUN_TOOL_VAR: &str = "RUN_TOOL";

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn path_var(key: &str) -> Option<PathBuf> {
    non_empty(&format!("{ENV_PREFIX}{key}")).map(PathBuf::from)
}

/// Path to the `tool.yml` spec file (`TAP_SPEC_FILE`).
pub fn spec_file() -> Option<PathBuf> {
    path_var("SPEC_FILE")
}

/// Path to the `inputs.json` parameterization (`TAP_INPUT_FILE`).
pub fn input_file() -> Option<PathBuf> {
    path_var("INPUT_FILE")
}

/// Folder receiving `STDOUT`, `STDERR` and `_metadata.json` (`TAP_OUTPUT_FOLDER`).
pub fn output_folder() -> Option<PathBuf> {
    path_var("OUTPUT_FOLDER")
}

/// Literal command override (`TAP_COMMAND`).
pub fn command_override() -> Option<String> {
    non_empty(COMMAND_VAR)
}

/// Tool name fallback (`RUN_TOOL`).
pub fn run_tool() -> Option<String> {
    non_empty(RUN_TOOL_VAR)
}

/// Resource sampling period override (`TAP_SAMPLE_INTERVAL_MS`).
///
/// Zero and unparsable values are ignored.
pub fn sample_interval() -> Option<Duration> {
    non_empty("TAP_SAMPLE_INTERVAL_MS")
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}

/// Log filter directive for the binary (`TAP_LOG`).
pub fn log_filter() -> Option<String> {
    non_empty("TAP_LOG")
}
