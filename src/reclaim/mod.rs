// src/reclaim/mod.rs

//! The reclaimer: a detached process that removes the pool's name once the
//! driver is gone.
//!
//! There is no portable way to block on the death of a process that is not
//! our child, so the reclaimer polls a [`LivenessProbe`] with a fixed delay
//! between probes. Reclaiming late only leaves an idle name around a little
//! longer; reclaiming early is impossible because the probe must first
//! report the driver dead.

pub mod probe;

use std::fs::OpenOptions;
use std::os::fd::AsRawFd;
use std::thread;
use std::time::Duration;

use nix::libc;
use nix::sys::signal::{SigHandler, Signal, signal};
use nix::unistd::{ForkResult, Pid, dup2, fork, setsid};
use tracing::{debug, info, warn};

use crate::errors::{ConcurError, Result};
use crate::pool::{self, PoolName, Unlinked};

pub use probe::{LivenessProbe, SignalProbe};

/// Signals a terminal sends to the driver's process group.
const IGNORED_SIGNALS: [Signal; 6] = [
    Signal::SIGINT,
    Signal::SIGQUIT,
    Signal::SIGHUP,
    Signal::SIGTSTP,
    Signal::SIGTTIN,
    Signal::SIGTTOU,
];

/// Poll `probe` until `pid` is gone. Returns the number of probes made.
pub fn wait_for_exit(probe: impl LivenessProbe, pid: Pid, interval: Duration) -> u64 {
    let mut probes = 0u64;
    loop {
        probes += 1;
        if !probe.is_alive(pid) {
            return probes;
        }
        if interval.is_zero() {
            thread::yield_now();
        } else {
            thread::sleep(interval);
        }
    }
}

/// Wait for `driver` to exit, then unlink `name`.
pub fn reclaim(
    probe: impl LivenessProbe,
    driver: Pid,
    name: &PoolName,
    interval: Duration,
) -> Result<Unlinked> {
    debug!(pool = %name, driver = driver.as_raw(), "reclaimer waiting for driver");
    let probes = wait_for_exit(probe, driver, interval);
    info!(pool = %name, driver = driver.as_raw(), probes, "driver exited; reclaiming pool");
    pool::unlink(name)
}

/// Fork a detached reclaimer for `name`. The caller does not wait on it.
///
/// Must be called while the process is single-threaded.
pub fn spawn(name: &PoolName, driver: Pid, interval: Duration) -> Result<Pid> {
    // SAFETY: the launcher never starts threads, and the child only runs
    // `run_detached` before `_exit`.
    match unsafe { fork() }.map_err(ConcurError::ReclaimerSpawn)? {
        ForkResult::Parent { child } => {
            info!(pool = %name, reclaimer = child.as_raw(), "spawned reclaimer");
            Ok(child)
        }
        ForkResult::Child => {
            ignore_terminal_signals();
            let code = match run_detached(name, driver, interval) {
                Ok(_) => 0,
                Err(_) => 1,
            };
            // SAFETY: `_exit` skips atexit handlers and stdio flushing, which
            // belong to the process we were forked from.
            unsafe { libc::_exit(code) }
        }
    }
}

fn run_detached(name: &PoolName, driver: Pid, interval: Duration) -> Result<Unlinked> {
    detach_from_session();
    reclaim(SignalProbe, driver, name, interval)
}

/// Leave the driver's session and let go of the inherited standard streams
/// so pipes to the driver's readers can close.
fn detach_from_session() {
    if let Err(err) = setsid() {
        warn!(error = %err, "setsid failed; staying in the driver's session");
    }

    match OpenOptions::new().read(true).write(true).open("/dev/null") {
        Ok(null) => {
            for fd in [libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO] {
                if let Err(err) = dup2(null.as_raw_fd(), fd) {
                    warn!(fd, error = %err, "failed to redirect stream to /dev/null");
                }
            }
        }
        Err(err) => warn!(error = %err, "cannot open /dev/null"),
    }
}

/// Runs first in the child: until `setsid` we still sit in the driver's
/// process group and share its terminal signals.
fn ignore_terminal_signals() {
    for sig in IGNORED_SIGNALS {
        // SAFETY: installing SIG_IGN does not run any handler code.
        if let Err(err) = unsafe { signal(sig, SigHandler::SigIgn) } {
            warn!(signal = ?sig, error = %err, "failed to ignore signal");
        }
    }
}
