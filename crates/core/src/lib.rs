// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tap-core: configuration and tool spec loading for the `tap` shim

pub mod config;
pub mod env;
pub mod inputs;
pub mod spec;

pub use config::{Config, ConfigError, ConfigOverrides};
pub use inputs::{InputError, InputFile};
pub use spec::{resolve_tool_name, SpecError, SpecFile, ToolSpec};
