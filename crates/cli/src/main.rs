// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tap: run a tool-spec compliant tool and record its resource usage.

mod commands;
mod exit_error;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tap_core::{Config, ConfigOverrides};
use tracing_subscriber::EnvFilter;

use crate::exit_error::ExitError;

/// Default log filter when `TAP_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Parser)]
#[command(
    name = "tap",
    version,
    about = "Shim to run tool-spec compliant tools",
    long_about = "Shim to run tool-spec compliant tools.\n\n\
        Resolves how a tool's entrypoint is invoked, runs it, and records \
        its exit status and resource usage next to its captured output."
)]
struct Cli {
    /// Path to the tool.yml metadata file
    #[arg(long, global = true, value_name = "PATH")]
    spec_file: Option<PathBuf>,

    /// Path to the inputs.json file
    #[arg(long, global = true, value_name = "PATH")]
    input_file: Option<PathBuf>,

    /// Output folder for the tool execution metadata
    #[arg(long, global = true, value_name = "DIR")]
    output_folder: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            spec_file: self.spec_file.clone(),
            input_file: self.input_file.clone(),
            output_folder: self.output_folder.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Execute this tool
    Run(commands::run::RunArgs),
}

fn init_logging() {
    let directive =
        tap_core::env::log_filter().unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    let filter = EnvFilter::try_new(&directive)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?.with_overrides(cli.overrides());
    tracing::debug!(spec_file = %config.spec_file.display(), "configuration loaded");

    match cli.command {
        Commands::Run(args) => commands::run::handle(args, &config).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging();

    if let Err(e) = run(cli).await {
        if let Some(exit) = e.downcast_ref::<ExitError>() {
            if !exit.message.is_empty() {
                eprintln!("{}", exit.message);
            }
            std::process::exit(exit.code);
        }
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
