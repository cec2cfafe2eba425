// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shim configuration.
//!
//! A [`Config`] is built once at startup and handed by reference to every
//! component that needs it. Values come from command-line flags, then `TAP_*`
//! environment variables, then built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::env;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Default location of the tool spec inside a tool container.
pub const DEFAULT_SPEC_FILE: &str = "/src/tool.yml";
pub const DEFAULT_INPUT_FILE: &str = "/in/inputs.json";

/// Default resource sampling period.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Errors building the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot determine working directory: {0}")]
    WorkingDir(#[source] std::io::Error),
}

/// Values supplied on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub spec_file: Option<PathBuf>,
    pub input_file: Option<PathBuf>,
    pub output_folder: Option<PathBuf>,
}

/// Resolved shim configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub spec_file: PathBuf,
    /// Parameterization file; its single tool is the last tool-name fallback.
    pub input_file: PathBuf,
    pub output_folder: PathBuf,
    /// Command used when the tool spec declares none.
    pub command_override: Option<String>,
    /// Tool name used when none is given on the command line.
    pub run_tool: Option<String>,
    /// Directory the tool runs in and the first directory scanned for `run*`.
    pub working_dir: PathBuf,
    pub sample_interval: Duration,
}

impl Config {
    /// Build a configuration from the environment and the current directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        let working_dir = std::env::current_dir().map_err(ConfigError::WorkingDir)?;
        Ok(Self {
            spec_file: env::spec_file().unwrap_or_else(|| PathBuf::from(DEFAULT_SPEC_FILE)),
            input_file: env::input_file().unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_FILE)),
            output_folder: env::output_folder().unwrap_or_else(|| PathBuf::from(".")),
            command_override: env::command_override(),
            run_tool: env::run_tool(),
            working_dir,
            sample_interval: env::sample_interval().unwrap_or(DEFAULT_SAMPLE_INTERVAL),
        })
    }

    /// Apply command-line values on top of this configuration.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        let ConfigOverrides { spec_file, input_file, output_folder } = overrides;
        if let Some(path) = spec_file {
            self.spec_file = path;
        }
        if let Some(path) = input_file {
            self.input_file = path;
        }
        if let Some(path) = output_folder {
            self.output_folder = path;
        }
        self
    }

    /// Directory containing the spec file, the second place searched for `run*`.
    ///
    /// A bare file name yields the working directory. Relative spec paths are
    /// anchored at the working directory.
    pub fn spec_dir(&self) -> PathBuf {
        let parent = self.spec_file.parent().unwrap_or(Path::new(""));
        if parent.as_os_str().is_empty() {
            self.working_dir.clone()
        } else {
            self.working_dir.join(parent)
        }
    }
}
