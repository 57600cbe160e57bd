// src/pool/semaphore.rs

//! Thin safe wrapper over POSIX named semaphores (`sem_open` and friends).
//!
//! `nix` does not cover named semaphores, so this is the one place in the
//! crate that talks to `libc` directly.

use std::ffi::CStr;
use std::ptr::NonNull;

use nix::errno::Errno;
use nix::libc::{self, c_int, c_uint};

/// Permission bits for a newly created pool: owner read/write only.
const POOL_MODE: c_uint = 0o600;

#[derive(Debug, Clone, Copy)]
pub(crate) enum OpenMode {
    /// `O_CREAT | O_EXCL`: fails with `EEXIST` if the name is taken.
    CreateExclusive { capacity: u32 },
    /// Open a name that must already exist.
    Existing,
}

/// An open handle to a named semaphore. Closed on drop; the name survives.
#[derive(Debug)]
pub(crate) struct NamedSemaphore {
    sem: NonNull<libc::sem_t>,
}

impl NamedSemaphore {
    pub(crate) fn open(name: &CStr, mode: OpenMode) -> Result<Self, Errno> {
        // SAFETY: `name` is a valid NUL-terminated string; the variadic
        // arguments match what sem_open reads when O_CREAT is set.
        let raw = unsafe {
            match mode {
                OpenMode::CreateExclusive { capacity } => libc::sem_open(
                    name.as_ptr(),
                    libc::O_CREAT | libc::O_EXCL | libc::O_RDWR,
                    POOL_MODE,
                    capacity as c_uint,
                ),
                OpenMode::Existing => libc::sem_open(name.as_ptr(), libc::O_RDWR),
            }
        };

        if raw == libc::SEM_FAILED {
            return Err(Errno::last());
        }
        NonNull::new(raw).map(|sem| Self { sem }).ok_or(Errno::EINVAL)
    }

    /// Decrement, blocking while the value is zero.
    pub(crate) fn wait(&self) -> Result<(), Errno> {
        // SAFETY: `sem` came from a successful sem_open and is not yet closed.
        Errno::result(unsafe { libc::sem_wait(self.sem.as_ptr()) }).map(drop)
    }

    /// Increment, waking one waiter if any.
    pub(crate) fn post(&self) -> Result<(), Errno> {
        // SAFETY: see `wait`.
        Errno::result(unsafe { libc::sem_post(self.sem.as_ptr()) }).map(drop)
    }

    pub(crate) fn value(&self) -> Result<c_int, Errno> {
        let mut value: c_int = 0;
        // SAFETY: see `wait`; `value` is a valid out pointer.
        Errno::result(unsafe { libc::sem_getvalue(self.sem.as_ptr(), &mut value) })?;
        Ok(value)
    }
}

impl Drop for NamedSemaphore {
    fn drop(&mut self) {
        // SAFETY: the handle is closed exactly once, here.
        unsafe {
            libc::sem_close(self.sem.as_ptr());
        }
    }
}

/// Remove `name` from the system. Open handles keep working.
pub(crate) fn unlink(name: &CStr) -> Result<(), Errno> {
    // SAFETY: `name` is a valid NUL-terminated string.
    Errno::result(unsafe { libc::sem_unlink(name.as_ptr()) }).map(drop)
}
