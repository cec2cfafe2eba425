// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for `tap run` command behavior.

use crate::prelude::*;
use similar_asserts::assert_eq;

const SCAN_TOOL: &str = r#"
tools:
  foobar:
    title: Foobar
    description: A tool found by scanning for run scripts
"#;

/// Parameterizes only `foobar`, so no tool name is needed.
const SCAN_INPUTS: &str = r#"{"foobar": {"parameters": {}, "data": {}}}"#;

/// A project for the scanned `foobar` tool.
fn scan_project() -> Project {
    let project = Project::with_spec(SCAN_TOOL);
    project.file("inputs.json", SCAN_INPUTS);
    project
}

const TWO_TOOLS: &str = r#"
tools:
  hello:
    title: Hello
    description: Says hello
    command: printf hello-from-tool
  bye:
    title: Bye
    description: Says bye
    command: printf bye
"#;

/// `--dry` prints the resolved invocation and runs nothing.
#[test]
fn dry_run_prints_scanned_invocation() {
    let temp = scan_project();
    temp.file("run.sh", "touch ran.txt\n");

    temp.tap().args(&["run", "--dry"]).passes().stdout_eq("sh run.sh\n");
    assert!(!temp.path().join("ran.txt").exists());
    assert!(!temp.path().join("_metadata.json").exists());
}

#[test]
fn dry_run_prefers_declared_command() {
    let temp = Project::with_spec(TWO_TOOLS);
    temp.file("run.sh", "");

    temp.tap().args(&["run", "bye", "--dry"]).passes().stdout_eq("printf bye\n");
}

#[test]
fn run_tool_env_selects_tool() {
    let temp = Project::with_spec(TWO_TOOLS);

    temp.tap()
        .env("RUN_TOOL", "hello")
        .args(&["run", "--dry"])
        .passes()
        .stdout_has("printf hello-from-tool");
}

#[test]
fn command_override_applies_without_declared_command() {
    let temp = scan_project();
    temp.file("run.py", "");

    temp.tap()
        .env("TAP_COMMAND", "sh custom.sh")
        .args(&["run", "--dry"])
        .passes()
        .stdout_eq("sh custom.sh\n");
}

#[test]
fn extensionless_entrypoint_is_run_directly() {
    let temp = scan_project();
    temp.executable("run", "#!/bin/sh\necho direct\n");
    temp.file("run.sh", "");

    temp.tap().args(&["run", "--dry"]).passes().stdout_eq("./run\n");
}

/// A real run writes STDOUT, STDERR and the metadata record.
#[test]
fn run_persists_output_and_metadata() {
    let temp = scan_project();
    temp.file("run.sh", "printf 'result line'\nprintf 'progress' >&2\nexit 3\n");

    // The tool's own failure is recorded, not propagated.
    temp.tap().args(&["run"]).passes();

    assert_eq!(temp.read("STDOUT"), b"result line".to_vec());
    assert_eq!(temp.read("STDERR"), b"progress".to_vec());
    let metadata = temp.metadata("_metadata.json");
    assert_eq!(metadata["exit_code"], 3);
    for field in [
        "user_time",
        "system_time",
        "memory_max_bytes",
        "memory_average_bytes",
        "cpu_max_permille",
        "cpu_average_permille",
        "read_bytes_sum",
        "write_bytes_sum",
    ] {
        assert!(metadata[field].is_u64(), "{field} missing or not an integer: {metadata}");
    }
}

#[test]
fn output_folder_flag_redirects_results() {
    let temp = Project::with_spec(TWO_TOOLS);

    temp.tap().args(&["--output-folder", "results", "run", "hello"]).passes();

    assert_eq!(temp.read("results/STDOUT"), b"hello-from-tool".to_vec());
    assert!(temp.path().join("results/_metadata.json").is_file());
}

#[test]
fn spec_dir_is_searched_when_working_dir_has_no_entrypoint() {
    let temp = Project::empty();
    temp.file("tool/tool.yml", SCAN_TOOL);
    temp.file("tool/run.py", "print('hi')\n");
    temp.file("in/inputs.json", SCAN_INPUTS);

    let spec_dir = temp.path().join("tool");
    let expected = format!("python3 {}\n", spec_dir.join("run.py").display());
    cli()
        .current_dir(temp.path())
        .args(&["--spec-file", "tool/tool.yml", "--input-file", "in/inputs.json"])
        .args(&["run", "--dry"])
        .passes()
        .stdout_eq(&expected);
}

#[test]
fn missing_entrypoint_fails_with_hint() {
    let temp = scan_project();

    temp.tap()
        .args(&["run"])
        .fails()
        .code(1)
        .stderr_has("could not be found")
        .stderr_has("tool.yml");
}

#[test]
fn single_tool_spec_without_inputs_needs_a_name() {
    let temp = Project::with_spec(SCAN_TOOL);
    temp.file("run.sh", "");

    temp.tap().args(&["run", "--dry"]).fails().code(1).stderr_has("RUN_TOOL");
    temp.tap().args(&["run", "foobar", "--dry"]).passes().stdout_eq("sh run.sh\n");
}

#[test]
fn input_file_flag_selects_tool() {
    let temp = Project::with_spec(TWO_TOOLS);
    temp.file("params/hello.json", r#"{"hello": {"parameters": {}}}"#);

    temp.tap()
        .args(&["--input-file", "params/hello.json", "run", "--dry"])
        .passes()
        .stdout_eq("printf hello-from-tool\n");
}

#[test]
fn malformed_input_file_fails() {
    let temp = Project::with_spec(TWO_TOOLS);
    temp.file("inputs.json", "{ not json");

    temp.tap().args(&["run", "--dry"]).fails().code(1).stderr_has("input file");
}

#[test]
fn ambiguous_tool_fails() {
    let temp = Project::with_spec(TWO_TOOLS);

    temp.tap().args(&["run"]).fails().stderr_has("RUN_TOOL");
}

#[test]
fn unknown_tool_fails() {
    let temp = Project::with_spec(TWO_TOOLS);

    temp.tap().args(&["run", "nope"]).fails().stderr_has("'nope' is not specified");
}

#[test]
fn missing_spec_file_fails() {
    let temp = Project::empty();

    let run = temp.tap().args(&["run"]).fails();
    assert!(run.stderr().contains("tool.yml"), "stderr: {}", run.stderr());
}

#[test]
fn logs_go_to_stderr() {
    let temp = Project::with_spec(TWO_TOOLS);

    temp.tap()
        .env("TAP_LOG", "info")
        .args(&["run", "hello", "--dry"])
        .passes()
        .stdout_eq("printf hello-from-tool\n")
        .stderr_has("resolved command");
}
