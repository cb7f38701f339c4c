// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sinks for the one diagnostic line each engine launch emits.

use std::io::Write;
use std::sync::Mutex;

use tracing::{info, warn};

/// Receives the command line of every engine launch.
///
/// Implementations must keep concurrent records from interleaving.
pub trait CommandLog: Send + Sync {
    /// `pid` is the launching (parent) process; `command` is shell-quoted.
    fn record(&self, engine: &str, pid: u32, command: &str);
}

/// Emits launches as `tracing` info events, visible under the default
/// `info` filter. The subscriber serialises output, so no extra lock is
/// needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl CommandLog for TracingLog {
    fn record(&self, engine: &str, pid: u32, command: &str) {
        info!(engine, pid, command, "executing engine");
    }
}

/// Writes one plain-text line per launch to any writer, holding a lock for
/// the duration of each line.
#[derive(Debug)]
pub struct WriterLog<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> WriterLog<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    /// Recover the writer, e.g. to inspect a buffer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> CommandLog for WriterLog<W> {
    fn record(&self, engine: &str, pid: u32, command: &str) {
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = writeln!(out, "[{engine}] Subprocess {pid} executing: {command}")
            .and_then(|()| out.flush())
        {
            warn!(error = %e, "failed to write command log line");
        }
    }
}
