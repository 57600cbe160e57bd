// src/launcher/mod.rs

//! The launcher: one per command invocation.
//!
//! ```text
//! attaching -> waiting_for_slot -> detaching -> running_worker -> releasing_slot -> done
//! ```
//!
//! The detaching step forks. The parent process returns to the driver at
//! once with success; the child runs the worker, waits for it, and returns
//! the slot. The slot is posted exactly once, by whichever process still
//! owns the [`Slot`](crate::pool::Slot) guard.

pub mod worker;

use std::ffi::OsString;
use std::fmt;

use nix::unistd::{ForkResult, fork};
use tracing::{debug, info};

use crate::config::Settings;
use crate::errors::{ConcurError, Result};
use crate::pool::{CapacityPool, PoolKey};
use crate::reclaim;

pub use worker::WorkerExit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LauncherState {
    Attaching,
    WaitingForSlot,
    Detaching,
    RunningWorker,
    ReleasingSlot,
    Done,
}

impl fmt::Display for LauncherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LauncherState::Attaching => "attaching",
            LauncherState::WaitingForSlot => "waiting_for_slot",
            LauncherState::Detaching => "detaching",
            LauncherState::RunningWorker => "running_worker",
            LauncherState::ReleasingSlot => "releasing_slot",
            LauncherState::Done => "done",
        };
        f.write_str(s)
    }
}

/// What this process should do after [`launch`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// We are the branch that hands control back to the driver.
    Detached,
    /// We ran the worker and returned its slot.
    Completed(WorkerExit),
}

/// Run `command` under the pool identified by `key`, normally
/// [`PoolKey::current`].
pub fn launch(
    settings: &Settings,
    key: PoolKey,
    command: &[OsString],
) -> Result<LaunchOutcome> {
    if command.is_empty() {
        return Err(ConcurError::ConfigError("no command given to run".to_string()));
    }

    let name = key.pool_name(&settings.prefix)?;

    enter(LauncherState::Attaching);
    let (pool, attachment) = CapacityPool::attach(&name, || settings.initial_capacity())?;
    if attachment.is_creator() {
        reclaim::spawn(&name, key.driver, settings.poll_interval)?;
    }

    enter(LauncherState::WaitingForSlot);
    let slot = pool.acquire()?;

    if settings.detach {
        enter(LauncherState::Detaching);
        // SAFETY: the launcher is single-threaded; both branches continue
        // running ordinary Rust code.
        match unsafe { fork() } {
            Ok(ForkResult::Parent { child }) => {
                debug!(continuing = child.as_raw(), "handing control back to the driver");
                slot.disown();
                return Ok(LaunchOutcome::Detached);
            }
            Ok(ForkResult::Child) => {}
            // `slot` drops here and goes back to the pool.
            Err(err) => return Err(ConcurError::Detach(err)),
        }
    }

    enter(LauncherState::RunningWorker);
    let exit = worker::run(command)?;
    info!(pool = %name, success = exit.success(), "worker finished");

    enter(LauncherState::ReleasingSlot);
    slot.release()?;

    enter(LauncherState::Done);
    Ok(LaunchOutcome::Completed(exit))
}

fn enter(state: LauncherState) {
    debug!(%state, "launcher state");
}
