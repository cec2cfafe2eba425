// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI help output specs

use crate::prelude::*;

#[test]
fn tap_no_args_shows_usage_and_fails() {
    cli().fails().code(2).stderr_has("Usage:");
}

#[test]
fn tap_help_lists_run_and_global_flags() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("Usage:")
        .stdout_has("run")
        .stdout_has("--spec-file")
        .stdout_has("--input-file")
        .stdout_has("--output-folder");
}

#[test]
fn tap_run_help_shows_dry_flag() {
    cli().args(&["run", "--help"]).passes().stdout_has("Usage:").stdout_has("--dry");
}

#[test]
fn tap_version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.1");
}
