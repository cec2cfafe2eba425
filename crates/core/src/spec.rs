// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tool spec file (`tool.yml`) loading.
//!
//! Only the fields the shim acts on are typed; everything else under a tool
//! entry is left to downstream validators.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::inputs::InputFile;

#[cfg(test)]
#[path = "spec_tests.rs"]
mod tests;

/// Errors from reading a spec file or picking a tool from it.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to read tool spec file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse tool spec file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("a tool named '{name}' is not specified in {path}")]
    UnknownTool { name: String, path: String },
    #[error(
        "the toolname could not be resolved. \
         Pass it as an argument or set the RUN_TOOL environment variable"
    )]
    Unresolved,
}

/// A single tool entry under `tools:`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ToolSpec {
    /// Key of the entry in the `tools:` map.
    #[serde(skip)]
    pub name: String,
    /// Literal command string; resolution falls back to overrides and `run*`
    /// files when absent or blank.
    #[serde(default)]
    pub command: Option<String>,
}

impl ToolSpec {
    /// The declared command, if it is not blank.
    pub fn declared_command(&self) -> Option<&str> {
        self.command.as_deref().filter(|c| !c.trim().is_empty())
    }
}

/// Parsed `tool.yml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SpecFile {
    #[serde(default)]
    pub tools: IndexMap<String, ToolSpec>,
}

impl SpecFile {
    /// Parse spec file content.
    pub fn parse(content: &str) -> Result<Self, SpecError> {
        let mut spec: SpecFile = serde_yaml::from_str(content)?;
        for (name, tool) in spec.tools.iter_mut() {
            tool.name = name.clone();
        }
        Ok(spec)
    }

    /// Read and parse a spec file from disk.
    pub fn load(path: &Path) -> Result<Self, SpecError> {
        let content = std::fs::read_to_string(path).map_err(|source| SpecError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let spec = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), tools = spec.tools.len(), "loaded tool spec");
        Ok(spec)
    }

    /// Look up a tool by name. `origin` names the file in the error message.
    pub fn tool(&self, name: &str, origin: &Path) -> Result<&ToolSpec, SpecError> {
        self.tools.get(name).ok_or_else(|| SpecError::UnknownTool {
            name: name.to_string(),
            path: origin.display().to_string(),
        })
    }
}

/// Decide which tool to run.
///
/// Order: explicit argument, then the `RUN_TOOL` fallback, then the only tool
/// parameterized in the inputs file if it names exactly one.
pub fn resolve_tool_name(
    arg: Option<&str>,
    run_tool: Option<&str>,
    inputs: Option<&InputFile>,
) -> Result<String, SpecError> {
    if let Some(name) = arg.filter(|s| !s.is_empty()) {
        return Ok(name.to_string());
    }
    if let Some(name) = run_tool.filter(|s| !s.is_empty()) {
        return Ok(name.to_string());
    }
    inputs.and_then(InputFile::only_tool).map(str::to_string).ok_or(SpecError::Unresolved)
}
