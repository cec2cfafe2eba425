// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for CLI specs.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::OnceLock;

use assert_cmd::Command;
use tempfile::TempDir;

use similar_asserts::assert_eq;

/// Variables that would leak the host configuration into a spec.
const SCRUBBED_ENV: &[&str] = &[
    "TAP_SPEC_FILE",
    "TAP_INPUT_FILE",
    "TAP_OUTPUT_FOLDER",
    "TAP_COMMAND",
    "TAP_SAMPLE_INTERVAL_MS",
    "TAP_LOG",
    "RUN_TOOL",
];

/// Path to the `tap` binary, building it first if this test run did not.
///
/// `tap` belongs to another workspace member, so cargo does not export its
/// path to this package. It sits next to the `deps/` directory holding this
/// test executable.
fn tap_bin() -> &'static Path {
    static BIN: OnceLock<PathBuf> = OnceLock::new();
    BIN.get_or_init(|| {
        let exe = std::env::current_exe().expect("cannot locate test executable");
        let profile_dir = exe
            .parent()
            .and_then(Path::parent)
            .expect("test executable outside a cargo target directory");
        let bin = profile_dir.join(format!("tap{}", std::env::consts::EXE_SUFFIX));
        if !bin.is_file() {
            let cargo = std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
            let mut build = std::process::Command::new(cargo);
            build.args(["build", "--quiet", "-p", "tap"]);
            if profile_dir.file_name().is_some_and(|name| name == "release") {
                build.arg("--release");
            }
            let status = build.status().expect("failed to invoke cargo");
            assert!(status.success(), "building tap failed");
        }
        assert!(bin.is_file(), "tap binary not found at {}", bin.display());
        bin
    })
}

/// A `tap` invocation with a clean environment.
pub fn cli() -> CliBuilder {
    let mut cmd = Command::new(tap_bin());
    for var in SCRUBBED_ENV {
        cmd.env_remove(var);
    }
    CliBuilder { cmd }
}

pub struct CliBuilder {
    cmd: Command,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cmd.current_dir(dir);
        self
    }

    fn output(mut self) -> Output {
        self.cmd.output().expect("failed to run tap")
    }

    /// Run and require exit status 0.
    pub fn passes(self) -> RunAssert {
        let output = self.output();
        assert!(output.status.success(), "expected success\n{}", describe(&output));
        RunAssert { output }
    }

    /// Run and require a non-zero exit status.
    pub fn fails(self) -> RunAssert {
        let output = self.output();
        assert!(!output.status.success(), "expected failure\n{}", describe(&output));
        RunAssert { output }
    }
}

fn describe(output: &Output) -> String {
    format!(
        "status: {}\nstdout:\n{}\nstderr:\n{}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(needle), "stdout missing {needle:?}\n{}", describe(&self.output));
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(needle), "stderr missing {needle:?}\n{}", describe(&self.output));
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        assert_eq!(self.stdout().as_str(), expected);
        self
    }

    pub fn code(self, expected: i32) -> Self {
        assert_eq!(self.output.status.code(), Some(expected), "{}", describe(&self.output));
        self
    }
}

/// A temporary tool directory: `tool.yml` plus entrypoint scripts.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self { dir: TempDir::new().expect("failed to create temp dir") }
    }

    /// A project whose `tool.yml` holds `spec`.
    pub fn with_spec(spec: &str) -> Self {
        let project = Self::empty();
        project.file("tool.yml", spec);
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, rel: &str, content: &str) {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn executable(&self, rel: &str, content: &str) {
        self.file(rel, content);
        let path = self.dir.path().join(rel);
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    pub fn read(&self, rel: &str) -> Vec<u8> {
        fs::read(self.dir.path().join(rel)).unwrap()
    }

    pub fn metadata(&self, rel: &str) -> serde_json::Value {
        serde_json::from_slice(&self.read(rel)).unwrap()
    }

    /// `tap` running inside this project, reading its `tool.yml` and
    /// `inputs.json`.
    pub fn tap(&self) -> CliBuilder {
        cli()
            .current_dir(self.path())
            .env("TAP_SPEC_FILE", "tool.yml")
            .env("TAP_INPUT_FILE", "inputs.json")
    }
}
