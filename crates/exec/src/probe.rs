// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-process instrumentation backed by `/proc/<pid>`.
//!
//! | file     | used for                                      |
//! |----------|-----------------------------------------------|
//! | `stat`   | liveness, CPU ticks (self and reaped children) |
//! | `statm`  | resident set size                             |
//! | `io`     | cumulative storage read/write bytes           |
//!
//! `stat` and `io` stay readable while the child is a zombie, which is why the
//! executor waits for exit without reaping before taking final accounting.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use nix::unistd::{sysconf, SysconfVar};

use crate::error::ProbeError;

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;

/// Default procfs mount point.
pub const PROC_ROOT: &str = "/proc";

/// OS accounting read once after the child exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accounting {
    pub user_time: Duration,
    pub system_time: Duration,
    pub read_bytes: u64,
    pub write_bytes: u64,
}

/// Resource queries against one process.
pub trait ProcessProbe {
    /// Current resident memory in bytes.
    fn memory_rss(&mut self) -> Result<u64, ProbeError>;

    /// CPU utilization in percent since the previous call (or since attach).
    /// May exceed 100 on multi-core machines.
    fn cpu_percent(&mut self) -> Result<f64, ProbeError>;

    /// User and system time, including descendants the process has reaped.
    fn cpu_times(&mut self) -> Result<(Duration, Duration), ProbeError>;

    /// Cumulative bytes read from and written to storage.
    fn io_counters(&mut self) -> Result<(u64, u64), ProbeError>;
}

/// Fields of `/proc/<pid>/stat` used here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Stat {
    pub state: char,
    pub utime: u64,
    pub stime: u64,
    pub cutime: u64,
    pub cstime: u64,
}

impl Stat {
    fn is_dead(&self) -> bool {
        matches!(self.state, 'Z' | 'X' | 'x')
    }

    fn busy_ticks(&self) -> u64 {
        self.utime.saturating_add(self.stime)
    }
}

/// Instrumentation handle for a single pid.
#[derive(Debug)]
pub struct ProcProbe {
    pid: u32,
    dir: PathBuf,
    page_size: u64,
    ticks_per_second: u64,
    last_ticks: u64,
    last_at: Instant,
}

impl ProcProbe {
    /// Attach to `pid` under `/proc`.
    pub fn attach(pid: u32) -> Result<Self, ProbeError> {
        Self::attach_at(Path::new(PROC_ROOT), pid)
    }

    /// Attach to `pid` under an alternative procfs root.
    ///
    /// Fails if the process has no readable entry. An exited but unreaped
    /// child attaches fine; only its samples fail.
    pub fn attach_at(proc_root: &Path, pid: u32) -> Result<Self, ProbeError> {
        let mut probe = Self {
            pid,
            dir: proc_root.join(pid.to_string()),
            page_size: page_size()?,
            ticks_per_second: ticks_per_second()?,
            last_ticks: 0,
            last_at: Instant::now(),
        };
        let stat = probe.stat()?;
        probe.last_ticks = stat.busy_ticks();
        probe.last_at = Instant::now();
        tracing::trace!(pid, dir = %probe.dir.display(), "attached probe");
        Ok(probe)
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    fn read(&self, name: &str) -> Result<(PathBuf, String), ProbeError> {
        let path = self.dir.join(name);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok((path, content)),
            Err(source) => Err(ProbeError::Read { path, source }),
        }
    }

    fn stat(&self) -> Result<Stat, ProbeError> {
        let (path, content) = self.read("stat")?;
        parse_stat(&content).ok_or_else(|| ProbeError::Malformed {
            path,
            detail: "truncated stat line".to_string(),
        })
    }

    /// `stat` of a process that is still running.
    fn live_stat(&self) -> Result<Stat, ProbeError> {
        let stat = self.stat()?;
        if stat.is_dead() {
            return Err(ProbeError::Exited { pid: self.pid });
        }
        Ok(stat)
    }

    fn ticks_to_duration(&self, ticks: u64) -> Duration {
        let nanos = u128::from(ticks) * 1_000_000_000 / u128::from(self.ticks_per_second);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

impl ProcessProbe for ProcProbe {
    fn memory_rss(&mut self) -> Result<u64, ProbeError> {
        self.live_stat()?;
        let (path, content) = self.read("statm")?;
        let pages = parse_statm_resident(&content).ok_or_else(|| ProbeError::Malformed {
            path,
            detail: "missing resident field".to_string(),
        })?;
        Ok(pages.saturating_mul(self.page_size))
    }

    fn cpu_percent(&mut self) -> Result<f64, ProbeError> {
        let stat = self.live_stat()?;
        let now = Instant::now();
        let ticks = stat.busy_ticks();
        let elapsed = now.duration_since(self.last_at).as_secs_f64();
        let delta = ticks.saturating_sub(self.last_ticks);
        self.last_ticks = ticks;
        self.last_at = now;

        if elapsed <= 0.0 {
            return Ok(0.0);
        }
        let busy = delta as f64 / self.ticks_per_second as f64;
        Ok(busy / elapsed * 100.0)
    }

    fn cpu_times(&mut self) -> Result<(Duration, Duration), ProbeError> {
        let stat = self.stat()?;
        Ok((
            self.ticks_to_duration(stat.utime.saturating_add(stat.cutime)),
            self.ticks_to_duration(stat.stime.saturating_add(stat.cstime)),
        ))
    }

    fn io_counters(&mut self) -> Result<(u64, u64), ProbeError> {
        let (path, content) = self.read("io")?;
        let counter = |key: &str| {
            parse_io_field(&content, key).ok_or_else(|| ProbeError::Malformed {
                path: path.clone(),
                detail: format!("missing {key}"),
            })
        };
        Ok((counter("read_bytes")?, counter("write_bytes")?))
    }
}

fn page_size() -> Result<u64, ProbeError> {
    sysconf_u64(SysconfVar::PAGE_SIZE, "PAGE_SIZE")
}

fn ticks_per_second() -> Result<u64, ProbeError> {
    sysconf_u64(SysconfVar::CLK_TCK, "CLK_TCK")
}

fn sysconf_u64(var: SysconfVar, name: &'static str) -> Result<u64, ProbeError> {
    match sysconf(var) {
        Ok(Some(value)) if value > 0 => Ok(value as u64),
        _ => Err(ProbeError::Sysconf { name }),
    }
}

/// Parse `/proc/<pid>/stat`.
///
/// The command name sits in parentheses and may itself contain spaces or
/// parentheses, so fields are counted from the last `)`.
pub(crate) fn parse_stat(content: &str) -> Option<Stat> {
    let rest = content.get(content.rfind(')')? + 1..)?;
    let fields: Vec<&str> = rest.split_whitespace().collect();
    // fields[0] is field 3 (state); utime is field 14.
    let unsigned = |i: usize| fields.get(i).and_then(|f| f.parse::<u64>().ok());
    let signed =
        |i: usize| fields.get(i).and_then(|f| f.parse::<i64>().ok()).map(|v| v.max(0) as u64);
    Some(Stat {
        state: fields.first()?.chars().next()?,
        utime: unsigned(11)?,
        stime: unsigned(12)?,
        cutime: signed(13)?,
        cstime: signed(14)?,
    })
}

/// Resident pages from `/proc/<pid>/statm`.
pub(crate) fn parse_statm_resident(content: &str) -> Option<u64> {
    content.split_whitespace().nth(1)?.parse().ok()
}

/// A `key: value` counter from `/proc/<pid>/io`.
pub(crate) fn parse_io_field(content: &str, key: &str) -> Option<u64> {
    content.lines().find_map(|line| {
        let (k, v) = line.split_once(':')?;
        if k.trim() == key {
            v.trim().parse().ok()
        } else {
            None
        }
    })
}
