// src/cpu.rs

//! Online CPU count, used once by the pool creator to size its capacity.

use std::num::NonZeroUsize;

use nix::libc;
use tracing::debug;

/// Number of logical processors currently online.
///
/// Falls back to [`std::thread::available_parallelism`] and finally to 1 if
/// `sysconf` cannot answer.
pub fn online_cpus() -> u32 {
    // SAFETY: sysconf has no memory-safety preconditions.
    let n = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
    if n >= 1 {
        return u32::try_from(n).unwrap_or(u32::MAX);
    }

    debug!(ret = n, "sysconf(_SC_NPROCESSORS_ONLN) failed; using available_parallelism");
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .ok()
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_least_one_cpu_is_online() {
        assert!(online_cpus() >= 1);
    }
}
