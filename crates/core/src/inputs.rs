// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tool parameterization file (`inputs.json`).
//!
//! The shim only needs the tool names it parameterizes. Parameter and data
//! values are kept as raw JSON.

use std::path::Path;

use indexmap::IndexMap;
use thiserror::Error;

#[cfg(test)]
#[path = "inputs_tests.rs"]
mod tests;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read input file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to load input file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Parsed `inputs.json`: tool name to its parameterization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputFile {
    pub tools: IndexMap<String, serde_json::Value>,
}

impl InputFile {
    pub fn parse(content: &str, origin: &Path) -> Result<Self, InputError> {
        let tools = serde_json::from_str(content).map_err(|source| InputError::Parse {
            path: origin.display().to_string(),
            source,
        })?;
        Ok(Self { tools })
    }

    /// Read the inputs file, or `None` if there is no file at `path`.
    pub fn load_optional(path: &Path) -> Result<Option<Self>, InputError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no input file");
                return Ok(None);
            }
            Err(source) => {
                return Err(InputError::Read { path: path.display().to_string(), source })
            }
        };
        let inputs = Self::parse(&content, path)?;
        tracing::debug!(path = %path.display(), tools = inputs.tools.len(), "loaded input file");
        Ok(Some(inputs))
    }

    /// Name of the single tool this file parameterizes.
    pub fn only_tool(&self) -> Option<&str> {
        match self.tools.len() {
            1 => self.tools.keys().next().map(String::as_str),
            _ => None,
        }
    }
}
