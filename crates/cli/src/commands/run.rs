// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tap run`: resolve a tool's entrypoint, execute it and persist the outcome.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use tap_core::{resolve_tool_name, Config, InputFile, SpecFile};
use tap_exec::{CommandResolver, ProcessExecutor, ResolvedCommand};

use crate::exit_error::ExitError;
use crate::output::write_results;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

#[derive(Args)]
pub struct RunArgs {
    /// Tool to run (defaults to RUN_TOOL, or the only tool in the input file)
    pub tool: Option<String>,

    /// Print the resolved command instead of executing the tool
    #[arg(long)]
    pub dry: bool,
}

pub async fn handle(args: RunArgs, config: &Config) -> Result<()> {
    let command = plan(config, args.tool.as_deref())?;
    if args.dry {
        println!("{}", command.invocation);
        return Ok(());
    }

    let executor = ProcessExecutor::from_config(config);
    execute(&executor, &command, &config.output_folder).await
}

/// Load the spec and input files and resolve how the selected tool is invoked.
pub(crate) fn plan(config: &Config, tool: Option<&str>) -> Result<ResolvedCommand> {
    let spec = SpecFile::load(&config.spec_file)?;
    let inputs = InputFile::load_optional(&config.input_file)?;
    let name = resolve_tool_name(tool, config.run_tool.as_deref(), inputs.as_ref())?;
    let tool = spec.tool(&name, &config.spec_file)?;
    let command = CommandResolver::new(config).resolve(tool)?;
    tracing::info!(tool = %name, invocation = %command.invocation, "resolved command");
    Ok(command)
}

/// Run `command` and write its results into `output_folder`.
///
/// The tool's own exit status is recorded, not propagated. A run that could
/// not be instrumented is still persisted, then reported as degraded.
pub(crate) async fn execute(
    executor: &ProcessExecutor,
    command: &ResolvedCommand,
    output_folder: &Path,
) -> Result<()> {
    match executor.execute(command).await {
        Ok(result) => {
            tracing::info!(exit_code = result.exit_code, "tool finished");
            write_results(output_folder, &result)?;
            Ok(())
        }
        Err(e) => {
            if let Some(result) = e.result() {
                tracing::warn!(error = %e, "resource usage unavailable");
                write_results(output_folder, result)?;
                let message = format!("{e} (results written without resource metrics)");
                return Err(ExitError::degraded(message).into());
            }
            Err(e.into())
        }
    }
}
