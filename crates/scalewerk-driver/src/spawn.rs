// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// A fully resolved engine command line, and launching it.

use std::path::{Path, PathBuf};
use std::process::{Child, Command};

use tracing::{debug, info};

use scalewerk_core::error::{DriverError, Result};

use crate::argv;

/// The exact process an engine call will start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// `argv[0]` is the executable.
    pub argv: Vec<String>,
    /// Working directory for the child; `None` inherits ours.
    pub working_dir: Option<PathBuf>,
}

impl Invocation {
    pub fn program(&self) -> &str {
        self.argv.first().map_or("", String::as_str)
    }

    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// The command as a copy-pasteable shell line.
    pub fn shell_command(&self) -> String {
        argv::shell_join(&self.argv)
    }

    /// Start the process and return without waiting for it.
    ///
    /// Standard streams are inherited. The caller owns the returned child
    /// and is responsible for waiting on it.
    pub fn spawn(&self) -> Result<Child> {
        let mut cmd = Command::new(self.program());
        cmd.args(self.args());
        if let Some(dir) = &self.working_dir {
            debug!(dir = %dir.display(), "engine working directory set");
            cmd.current_dir(dir);
        }

        let child = cmd.spawn().map_err(|source| DriverError::Spawn {
            program: self.program().to_owned(),
            source,
        })?;
        info!(program = self.program(), child_pid = child.id(), "engine started");
        Ok(child)
    }
}
