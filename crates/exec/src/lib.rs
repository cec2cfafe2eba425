// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tap-exec: entrypoint resolution and monitored execution of tool commands.
//!
//! [`resolve`] decides how a tool is invoked; [`ProcessExecutor`] runs the
//! resolved command under `sh -c` while a sampler polls the child for memory
//! and CPU usage, then folds the samples and the final OS accounting into an
//! [`ExecutionResult`].

pub mod error;
pub mod executor;
pub mod metrics;
pub mod probe;
pub mod resolve;
pub mod result;
pub mod sampler;

pub use error::{ExecError, ProbeError, ResolveError};
pub use executor::ProcessExecutor;
pub use probe::{Accounting, ProcProbe, ProcessProbe};
pub use resolve::{resolve, CommandResolver};
pub use result::{ExecutionResult, ResolvedCommand};
pub use sampler::{sample_until, Samples};
