// src/reclaim/probe.rs

//! Process liveness probes.

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use tracing::warn;

/// Answers "does a process with this pid still exist?".
///
/// Production code uses [`SignalProbe`]; tests can script the answers.
pub trait LivenessProbe {
    fn is_alive(&self, pid: Pid) -> bool;
}

/// Probe with a null signal (`kill(pid, 0)`).
///
/// `EPERM` means the process exists but belongs to someone else, so it
/// counts as alive. Only `ESRCH` counts as dead.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalProbe;

impl LivenessProbe for SignalProbe {
    fn is_alive(&self, pid: Pid) -> bool {
        match kill(pid, None) {
            Ok(()) | Err(Errno::EPERM) => true,
            Err(Errno::ESRCH) => false,
            Err(err) => {
                warn!(pid = pid.as_raw(), error = %err, "liveness probe failed; assuming alive");
                true
            }
        }
    }
}

impl<P: LivenessProbe + ?Sized> LivenessProbe for &P {
    fn is_alive(&self, pid: Pid) -> bool {
        (**self).is_alive(pid)
    }
}

#[cfg(test)]
mod tests {
    use std::process::Command;

    use nix::unistd::getpid;

    use super::*;

    #[test]
    fn own_process_is_alive() {
        assert!(SignalProbe.is_alive(getpid()));
    }

    #[test]
    fn reaped_child_is_dead() {
        let mut child = Command::new("true").spawn().unwrap();
        let pid = Pid::from_raw(child.id() as i32);
        child.wait().unwrap();
        assert!(!SignalProbe.is_alive(pid));
    }
}
