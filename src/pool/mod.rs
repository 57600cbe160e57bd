// src/pool/mod.rs

//! The capacity pool: a named counting semaphore shared by every launcher
//! spawned from the same driver by the same user.
//!
//! - [`key`] derives the pool identity and its system-wide name.
//! - [`semaphore`] wraps the raw POSIX named-semaphore calls.
//!
//! Attaching is a two-step race: an exclusive create, and on `EEXIST` a plain
//! open. The kernel makes the create atomic, so exactly one racer per name
//! sees [`Attachment::Created`] and becomes responsible for the reclaimer.

pub mod key;
mod semaphore;

use nix::errno::Errno;
use tracing::{debug, error, info};

use crate::errors::{ConcurError, Result};

pub use key::{DEFAULT_PREFIX, PoolKey, PoolName};
use semaphore::{NamedSemaphore, OpenMode};

/// How this process got hold of the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    /// We won the create race; the pool starts with `capacity` slots.
    Created { capacity: u32 },
    /// Someone else created it first.
    Existing,
}

impl Attachment {
    pub fn is_creator(&self) -> bool {
        matches!(self, Attachment::Created { .. })
    }
}

/// Outcome of removing a pool's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unlinked {
    Removed,
    AlreadyGone,
}

/// An open handle to a capacity pool.
#[derive(Debug)]
pub struct CapacityPool {
    sem: NamedSemaphore,
    name: PoolName,
}

impl CapacityPool {
    /// Create the pool named `name`, or open it if it already exists.
    ///
    /// `capacity` is only called when the name does not exist yet, right
    /// before the exclusive create. An existing pool keeps the capacity its
    /// creator chose.
    pub fn attach(
        name: &PoolName,
        capacity: impl FnOnce() -> u32,
    ) -> Result<(Self, Attachment)> {
        match NamedSemaphore::open(name.as_c_str(), OpenMode::Existing) {
            Ok(sem) => {
                debug!(pool = %name, "attached to existing capacity pool");
                return Ok((Self::from_parts(sem, name), Attachment::Existing));
            }
            Err(Errno::ENOENT) => {}
            Err(source) => {
                return Err(ConcurError::PoolAttach {
                    name: name.to_string(),
                    source,
                });
            }
        }

        let capacity = capacity();
        match NamedSemaphore::open(name.as_c_str(), OpenMode::CreateExclusive { capacity }) {
            Ok(sem) => {
                info!(pool = %name, capacity, "created capacity pool");
                Ok((Self::from_parts(sem, name), Attachment::Created { capacity }))
            }
            // Lost the create race to a sibling.
            Err(Errno::EEXIST) => {
                let pool = Self::open(name).map_err(|err| match err {
                    ConcurError::PoolAttach {
                        source: Errno::ENOENT,
                        ..
                    } => ConcurError::PoolVanished(name.to_string()),
                    other => other,
                })?;
                debug!(pool = %name, "attached to capacity pool created by a sibling");
                Ok((pool, Attachment::Existing))
            }
            Err(source) => Err(ConcurError::PoolAttach {
                name: name.to_string(),
                source,
            }),
        }
    }

    fn from_parts(sem: NamedSemaphore, name: &PoolName) -> Self {
        Self {
            sem,
            name: name.clone(),
        }
    }

    /// Open a pool that must already exist.
    pub fn open(name: &PoolName) -> Result<Self> {
        let sem = NamedSemaphore::open(name.as_c_str(), OpenMode::Existing).map_err(|source| {
            ConcurError::PoolAttach {
                name: name.to_string(),
                source,
            }
        })?;
        Ok(Self::from_parts(sem, name))
    }

    pub fn name(&self) -> &PoolName {
        &self.name
    }

    /// Block until a slot is free and take it. There is no timeout.
    pub fn acquire(&self) -> Result<Slot<'_>> {
        debug!(pool = %self.name, "waiting for a slot");
        self.sem.wait().map_err(ConcurError::SlotWait)?;
        debug!(pool = %self.name, "slot acquired");
        Ok(Slot {
            pool: self,
            armed: true,
        })
    }

    /// Current number of free slots. Diagnostic only.
    pub fn value(&self) -> Result<u32> {
        let value = self.sem.value().map_err(|source| ConcurError::PoolAttach {
            name: self.name.to_string(),
            source,
        })?;
        // Linux reports 0 (never negative) when there are waiters.
        Ok(u32::try_from(value).unwrap_or(0))
    }
}

/// A held slot. Returned to the pool exactly once: by [`Slot::release`] or
/// on drop, unless [`Slot::disown`] handed the duty to another process.
#[derive(Debug)]
#[must_use = "dropping a Slot releases it immediately"]
pub struct Slot<'a> {
    pool: &'a CapacityPool,
    armed: bool,
}

impl Slot<'_> {
    /// Return the slot to the pool.
    pub fn release(mut self) -> Result<()> {
        self.armed = false;
        self.pool.sem.post().map_err(ConcurError::SlotRelease)?;
        debug!(pool = %self.pool.name, "slot released");
        Ok(())
    }

    /// Forget the slot without posting. Used by the branch of a fork that
    /// leaves the release to its sibling.
    pub fn disown(mut self) {
        self.armed = false;
    }
}

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(err) = self.pool.sem.post() {
            error!(pool = %self.pool.name, error = %err, "failed to release slot");
        }
    }
}

/// Remove a pool's name. Missing names are not an error.
pub fn unlink(name: &PoolName) -> Result<Unlinked> {
    match semaphore::unlink(name.as_c_str()) {
        Ok(()) => {
            info!(pool = %name, "capacity pool unlinked");
            Ok(Unlinked::Removed)
        }
        Err(Errno::ENOENT) => {
            debug!(pool = %name, "capacity pool already unlinked");
            Ok(Unlinked::AlreadyGone)
        }
        Err(source) => Err(ConcurError::PoolUnlink {
            name: name.to_string(),
            source,
        }),
    }
}
