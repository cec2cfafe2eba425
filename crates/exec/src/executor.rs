// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Monitored execution of a resolved command.
//!
//! The child runs under `sh -c` with its output drained into memory. A
//! blocking watcher waits for the child to exit *without reaping it* and then
//! fires a one-shot completion signal that stops the sampler. Because the
//! child is still unreaped at that point, its `/proc` entry remains readable
//! for the final CPU time and I/O accounting; only then is it reaped for its
//! exit status.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::sys::wait::{waitid, Id, WaitPidFlag};
use nix::unistd::Pid;
use tap_core::Config;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::error::{ExecError, ProbeError};
use crate::probe::{Accounting, ProcProbe, ProcessProbe, PROC_ROOT};
use crate::result::{ExecutionResult, ResolvedCommand};
use crate::sampler::{sample_until, Samples};

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;

/// Runs resolved commands and measures their resource usage.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    cwd: Option<PathBuf>,
    env: Vec<(String, String)>,
    sample_interval: Duration,
    proc_root: PathBuf,
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self {
            cwd: None,
            env: Vec::new(),
            sample_interval: tap_core::config::DEFAULT_SAMPLE_INTERVAL,
            proc_root: PathBuf::from(PROC_ROOT),
        }
    }

    /// Executor running tools in the configured working directory.
    pub fn from_config(config: &Config) -> Self {
        Self::new().cwd(&config.working_dir).sample_interval(config.sample_interval)
    }

    /// Directory the child runs in. Defaults to the current directory.
    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Extra environment variable for the child, on top of the inherited ones.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }

    /// Procfs mount used for instrumentation.
    pub fn proc_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.proc_root = root.into();
        self
    }

    /// Run `command` to completion.
    ///
    /// Returns [`ExecError::SpawnFailed`] if the shell cannot be launched. If
    /// the child launches but cannot be instrumented, it is still awaited and
    /// [`ExecError::Instrumentation`] carries its result with zeroed metrics.
    pub async fn execute(&self, command: &ResolvedCommand) -> Result<ExecutionResult, ExecError> {
        let span = tracing::info_span!(
            "tap.exec",
            cmd = %command.invocation,
            pid = tracing::field::Empty,
            exit_code = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        );
        self.run(command, &span).instrument(span.clone()).await
    }

    async fn run(
        &self,
        command: &ResolvedCommand,
        span: &tracing::Span,
    ) -> Result<ExecutionResult, ExecError> {
        let start = Instant::now();
        let collect_err = |source: std::io::Error| ExecError::Collect {
            command: command.invocation.clone(),
            source,
        };

        let mut process = tokio::process::Command::new("sh");
        process.arg("-c").arg(&command.invocation);
        if let Some(cwd) = &self.cwd {
            process.current_dir(cwd);
        }
        process.envs(self.env.iter().map(|(k, v)| (k, v)));
        process.stdin(Stdio::null());
        process.stdout(Stdio::piped());
        process.stderr(Stdio::piped());

        let mut child = process.spawn().map_err(|source| ExecError::SpawnFailed {
            command: command.invocation.clone(),
            source,
        })?;
        let pid = child
            .id()
            .ok_or_else(|| collect_err(std::io::Error::other("child has no pid")))?;
        span.record("pid", pid);

        let stdout = tokio::spawn(drain(child.stdout.take()));
        let stderr = tokio::spawn(drain(child.stderr.take()));

        let probe = ProcProbe::attach_at(&self.proc_root, pid);
        let (done_tx, done_rx) = oneshot::channel();
        let watcher = watch_exit(pid, done_tx);

        let (samples, accounting, probe_error) = match probe {
            Ok(mut probe) => {
                let samples = sample_until(&mut probe, self.sample_interval, done_rx).await;
                let accounting = read_accounting(&mut probe);
                (samples, accounting, None)
            }
            Err(e) => {
                let _ = done_rx.await;
                (Samples::default(), Accounting::default(), Some(e))
            }
        };
        if let Err(e) = watcher.await {
            tracing::debug!(pid, error = %e, "exit watcher did not finish cleanly");
        }

        let status = child.wait().await.map_err(collect_err)?;
        let exit_code = status.code().unwrap_or(-1);
        let stdout = join_drain(stdout).await.map_err(collect_err)?;
        let stderr = join_drain(stderr).await.map_err(collect_err)?;

        span.record("exit_code", exit_code);
        span.record("duration_ms", start.elapsed().as_millis() as u64);

        let result = ExecutionResult {
            stdout,
            stderr,
            exit_code,
            user_time: accounting.user_time,
            system_time: accounting.system_time,
            memory_max_bytes: samples.memory_max(),
            memory_average_bytes: samples.memory_average(),
            cpu_max_permille: samples.cpu_max(),
            cpu_average_permille: samples.cpu_average(),
            read_bytes_sum: accounting.read_bytes,
            write_bytes_sum: accounting.write_bytes,
        };

        match probe_error {
            None => {
                tracing::debug!(
                    exit_code,
                    memory_max_bytes = result.memory_max_bytes,
                    cpu_max_permille = result.cpu_max_permille,
                    "command finished"
                );
                Ok(result)
            }
            Some(source) => {
                Err(ExecError::Instrumentation { pid, source, result: Box::new(result) })
            }
        }
    }
}

/// Block until `pid` has exited, leaving it unreaped, then signal `done`.
fn watch_exit(pid: u32, done: oneshot::Sender<()>) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        let target = Pid::from_raw(pid as i32);
        loop {
            match waitid(Id::Pid(target), WaitPidFlag::WEXITED | WaitPidFlag::WNOWAIT) {
                Err(Errno::EINTR) => continue,
                Ok(_) => break,
                Err(e) => {
                    tracing::debug!(pid, error = %e, "waitid failed");
                    break;
                }
            }
        }
        let _ = done.send(());
    })
}

/// Final OS accounting; unreadable values stay zero.
fn read_accounting<P: ProcessProbe>(probe: &mut P) -> Accounting {
    let mut accounting = Accounting::default();
    match probe.cpu_times() {
        Ok((user, system)) => {
            accounting.user_time = user;
            accounting.system_time = system;
        }
        Err(e) => log_degraded("cpu times", &e),
    }
    match probe.io_counters() {
        Ok((read, write)) => {
            accounting.read_bytes = read;
            accounting.write_bytes = write;
        }
        Err(e) => log_degraded("io counters", &e),
    }
    accounting
}

fn log_degraded(what: &str, error: &ProbeError) {
    tracing::warn!(error = %error, "{what} unavailable, reporting zero");
}

async fn drain<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

async fn join_drain(task: JoinHandle<std::io::Result<Vec<u8>>>) -> std::io::Result<Vec<u8>> {
    task.await.map_err(std::io::Error::other)?
}
