// src/pool/key.rs

//! Pool identity and semaphore name derivation.

use std::ffi::{CStr, CString};
use std::fmt;

use nix::unistd::{Pid, Uid, geteuid, getppid};

use crate::errors::{ConcurError, Result};

/// Prefix used when no other prefix is configured.
pub const DEFAULT_PREFIX: &str = "concur";

/// Longest name accepted by `sem_open` on Linux: `NAME_MAX` minus the
/// `sem.` prefix the kernel adds under `/dev/shm`.
pub const MAX_NAME_LEN: usize = 255 - 4;

/// Identity of one capacity pool: who runs it and which driver it serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolKey {
    pub uid: Uid,
    pub driver: Pid,
}

impl PoolKey {
    pub fn new(uid: Uid, driver: Pid) -> Self {
        Self { uid, driver }
    }

    /// Key for the running launcher: effective uid and parent pid.
    ///
    /// Must be taken before any fork, while the driver is still our parent.
    pub fn current() -> Self {
        Self::new(geteuid(), getppid())
    }

    /// Derive the system-wide semaphore name for this key.
    pub fn pool_name(&self, prefix: &str) -> Result<PoolName> {
        validate_prefix(prefix)?;

        let display = format!(
            "/{prefix}.{}.{}",
            self.uid.as_raw(),
            self.driver.as_raw()
        );
        if display.len() > MAX_NAME_LEN {
            return Err(ConcurError::ConfigError(format!(
                "pool name '{display}' exceeds {MAX_NAME_LEN} bytes; use a shorter prefix"
            )));
        }

        let c_name = CString::new(display.clone()).map_err(|_| {
            ConcurError::ConfigError("pool prefix must not contain NUL bytes".to_string())
        })?;

        Ok(PoolName { display, c_name })
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "uid={} driver={}", self.uid, self.driver)
    }
}

/// A validated POSIX semaphore name, e.g. `/concur.1000.4242`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PoolName {
    display: String,
    c_name: CString,
}

impl PoolName {
    pub fn as_str(&self) -> &str {
        &self.display
    }

    pub(crate) fn as_c_str(&self) -> &CStr {
        &self.c_name
    }
}

impl fmt::Display for PoolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

/// Check that `prefix` can be embedded in a semaphore name.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        return Err(ConcurError::ConfigError(
            "pool prefix must not be empty".to_string(),
        ));
    }
    if prefix.contains('/') {
        return Err(ConcurError::ConfigError(format!(
            "pool prefix '{prefix}' must not contain '/'"
        )));
    }
    if prefix.contains('\0') {
        return Err(ConcurError::ConfigError(
            "pool prefix must not contain NUL bytes".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(uid: u32, pid: i32) -> PoolKey {
        PoolKey::new(Uid::from_raw(uid), Pid::from_raw(pid))
    }

    #[test]
    fn name_embeds_user_and_driver() {
        let name = key(1000, 4242).pool_name("concur").unwrap();
        assert_eq!(name.as_str(), "/concur.1000.4242");
        assert_eq!(name.as_c_str().to_bytes(), b"/concur.1000.4242");
    }

    #[test]
    fn same_driver_different_users_do_not_collide() {
        let a = key(1000, 77).pool_name(DEFAULT_PREFIX).unwrap();
        let b = key(1001, 77).pool_name(DEFAULT_PREFIX).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_bad_prefixes() {
        for bad in ["", "a/b", "nul\0byte"] {
            let err = key(0, 1).pool_name(bad).unwrap_err();
            assert!(matches!(err, ConcurError::ConfigError(_)), "prefix {bad:?}");
        }
    }

    #[test]
    fn rejects_overlong_names() {
        let prefix = "p".repeat(MAX_NAME_LEN);
        assert!(matches!(
            key(0, 1).pool_name(&prefix),
            Err(ConcurError::ConfigError(msg)) if msg.contains("exceeds")
        ));
    }

    #[test]
    fn current_key_uses_parent_pid() {
        let k = PoolKey::current();
        assert_eq!(k.driver, getppid());
        assert_eq!(k.uid, geteuid());
    }
}
