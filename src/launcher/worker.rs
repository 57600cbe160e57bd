// src/launcher/worker.rs

//! The worker: the process that runs the user's command.

use std::ffi::OsString;
use std::io;
use std::process::{Command, ExitStatus};

use nix::errno::Errno;
use tracing::{debug, warn};

use crate::errors::{ConcurError, Result};

/// How the worker ended. The launcher never propagates this as its own
/// exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    Exited(ExitStatus),
    /// The process was created but `exec` refused the command (missing,
    /// not executable, unknown format, bad path, ...).
    ExecFailed(Errno),
}

impl WorkerExit {
    pub fn success(&self) -> bool {
        matches!(self, WorkerExit::Exited(status) if status.success())
    }
}

/// Run `command` with inherited stdio and wait for exactly that process.
///
/// `Command::spawn` creates the child without copying our address space
/// (posix_spawn / vfork-style clone), which is all a process about to exec
/// needs.
pub fn run(command: &[OsString]) -> Result<WorkerExit> {
    let (program, args) = command.split_first().ok_or_else(|| {
        ConcurError::ConfigError("no command given to run".to_string())
    })?;

    let mut child = match Command::new(program).args(args).spawn() {
        Ok(child) => child,
        Err(err) => match classify_spawn_error(&err) {
            SpawnFailure::Exec(errno) => {
                warn!(program = ?program, error = %err, "cannot execute command");
                return Ok(WorkerExit::ExecFailed(errno));
            }
            SpawnFailure::Process => return Err(ConcurError::WorkerSpawn(err)),
        },
    };

    let worker = child.id();
    debug!(worker, program = ?program, "worker started");

    let status = child.wait()?;
    debug!(worker, %status, "worker exited");
    Ok(WorkerExit::Exited(status))
}

#[derive(Debug, PartialEq, Eq)]
enum SpawnFailure {
    /// No process could be created at all.
    Process,
    /// A process existed but could not become the command.
    Exec(Errno),
}

/// Only resource exhaustion stops the process from being created; every
/// other errno `spawn` reports comes back from `exec` in the child.
fn classify_spawn_error(err: &io::Error) -> SpawnFailure {
    match err.raw_os_error().map(Errno::from_raw) {
        Some(Errno::EAGAIN | Errno::ENOMEM) => SpawnFailure::Process,
        Some(errno) => SpawnFailure::Exec(errno),
        None if err.kind() == io::ErrorKind::WouldBlock => SpawnFailure::Process,
        None => SpawnFailure::Exec(Errno::UnknownErrno),
    }
}
