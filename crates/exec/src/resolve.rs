// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entrypoint resolution.
//!
//! A tool is invoked by, in order of preference:
//!
//! 1. the `command` declared in its spec,
//! 2. the `TAP_COMMAND` override,
//! 3. a `run*` file found in the working directory, then in the directory
//!    holding the spec file.
//!
//! Declared commands and overrides are parsed the same way: the first token
//! must be launchable and the first later token naming an existing file
//! determines the entrypoint extension. Directory matches are visited in
//! lexicographic order so the outcome never depends on readdir order.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use tap_core::{Config, ToolSpec};

use crate::error::ResolveError;
use crate::result::ResolvedCommand;

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;

/// Resolves commands against a [`Config`].
pub struct CommandResolver<'a> {
    config: &'a Config,
}

impl<'a> CommandResolver<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Resolve the entrypoint for `tool` using the configured override and
    /// search directories.
    pub fn resolve(&self, tool: &ToolSpec) -> Result<ResolvedCommand, ResolveError> {
        resolve(
            tool,
            self.config.command_override.as_deref(),
            &self.config.working_dir,
            &self.config.spec_dir(),
        )
    }
}

/// Decide how to invoke `tool`.
///
/// The first applicable source wins; a declared command or override that
/// fails to parse is an error, not a reason to scan directories.
pub fn resolve(
    tool: &ToolSpec,
    env_override: Option<&str>,
    working_dir: &Path,
    spec_dir: &Path,
) -> Result<ResolvedCommand, ResolveError> {
    if let Some(command) = tool.declared_command() {
        tracing::debug!(tool = %tool.name, %command, "using declared command");
        return parse_command(command, working_dir);
    }
    if let Some(command) = env_override.filter(|c| !c.is_empty()) {
        tracing::debug!(tool = %tool.name, %command, "using command override");
        return parse_command(command, working_dir);
    }

    let mut searched: Vec<PathBuf> = Vec::with_capacity(2);
    for dir in [working_dir, spec_dir] {
        if searched.iter().any(|d| d == dir) {
            continue;
        }
        searched.push(dir.to_path_buf());
        if let Some(resolved) = scan_directory(dir, dir == working_dir) {
            tracing::debug!(
                tool = %tool.name,
                dir = %dir.display(),
                invocation = %resolved.invocation,
                "resolved entrypoint from directory"
            );
            return Ok(resolved);
        }
    }
    Err(ResolveError::NotFound { searched })
}

/// Parse a literal command string.
fn parse_command(command: &str, working_dir: &Path) -> Result<ResolvedCommand, ResolveError> {
    let tokens: Vec<&str> = command.split_whitespace().collect();
    let Some((program, rest)) = tokens.split_first() else {
        return Err(ResolveError::EmptyCommand);
    };

    if !is_launchable(program, working_dir) {
        return Err(ResolveError::NotExecutable {
            command: command.to_string(),
            program: program.to_string(),
        });
    }

    let extension = rest
        .iter()
        .map(Path::new)
        .find(|token| working_dir.join(token).is_file())
        .map(lowercase_extension)
        .unwrap_or_default();

    Ok(ResolvedCommand {
        invocation: command.to_string(),
        executable: program.to_string(),
        extension,
    })
}

/// Pick the entrypoint among the `run*` entries of `dir`.
///
/// An extensionless match wins outright. Otherwise the last `.sh` match wins,
/// and failing that the first match of any other kind.
fn scan_directory(dir: &Path, is_working_dir: bool) -> Option<ResolvedCommand> {
    let pattern = format!("{}/run*", glob::Pattern::escape(&dir.to_string_lossy()));
    let paths = match glob::glob(&pattern) {
        Ok(paths) => paths,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "skipping unsearchable directory");
            return None;
        }
    };

    let mut matches: Vec<PathBuf> =
        paths.filter_map(Result::ok).filter(|path| !path.is_dir()).collect();
    matches.sort();

    let mut chosen: Option<ResolvedCommand> = None;
    for path in matches {
        let candidate = classify(&path, is_working_dir);
        if candidate.extension.is_empty() {
            return Some(candidate);
        }
        if candidate.extension == ".sh" || chosen.is_none() {
            chosen = Some(candidate);
        }
    }
    chosen
}

/// Map a matched file to its interpreter by extension.
fn classify(path: &Path, is_working_dir: bool) -> ResolvedCommand {
    // The child runs in the working directory, so matches there are named
    // relative to it.
    let display = match (is_working_dir, path.file_name()) {
        (true, Some(name)) => name.to_string_lossy().into_owned(),
        _ => path.to_string_lossy().into_owned(),
    };
    let extension = lowercase_extension(path);

    let interpreter = match extension.as_str() {
        ".sh" => Some("sh"),
        ".py" => Some("python3"),
        ".r" => Some("Rscript"),
        ".jl" => Some("julia"),
        ".pl" => Some("perl"),
        ".m" | ".matlab" => Some(if which::which("matlab").is_ok() { "matlab" } else { "octave" }),
        ".js" => Some("node"),
        _ => None,
    };

    match interpreter {
        Some(interpreter) => ResolvedCommand {
            invocation: format!("{interpreter} {}", quote(&display)),
            executable: interpreter.to_string(),
            extension,
        },
        None => {
            // A bare name would be looked up on PATH by the shell.
            let token =
                if display.contains('/') { display.clone() } else { format!("./{display}") };
            ResolvedCommand {
                invocation: quote(&token).into_owned(),
                executable: display,
                extension,
            }
        }
    }
}

/// Whether `program` can be launched from `working_dir`.
fn is_launchable(program: &str, working_dir: &Path) -> bool {
    which::which_in(program, std::env::var_os("PATH"), working_dir).is_ok()
}

/// Lowercase extension with its leading dot, or empty.
fn lowercase_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Quote a path for the shell when it contains special characters.
fn quote(s: &str) -> Cow<'_, str> {
    shlex::try_quote(s).unwrap_or(Cow::Borrowed(s))
}
