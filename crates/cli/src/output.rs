// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisting a run into the output folder.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tap_exec::ExecutionResult;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

pub const STDOUT_FILE: &str = "STDOUT";
pub const STDERR_FILE: &str = "STDERR";
pub const METADATA_FILE: &str = "_metadata.json";

/// Write the captured streams and the metadata record of `result` into
/// `folder`, creating it if needed. Returns the written paths.
pub fn write_results(folder: &Path, result: &ExecutionResult) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(folder)
        .with_context(|| format!("failed to create output folder {}", folder.display()))?;

    let metadata = serde_json::to_vec_pretty(result).context("failed to encode run metadata")?;
    let files: [(&str, &[u8]); 3] = [
        (STDOUT_FILE, &result.stdout),
        (STDERR_FILE, &result.stderr),
        (METADATA_FILE, &metadata),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (name, content) in files {
        let path = folder.join(name);
        fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    tracing::debug!(folder = %folder.display(), "results written");
    Ok(written)
}
