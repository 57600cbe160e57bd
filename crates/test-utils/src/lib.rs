pub mod builders;
pub mod fake_probe;

use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};

use concur::pool::{self, PoolName};
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();
static NEXT_PREFIX: AtomicUsize = AtomicUsize::new(0);

/// Route `tracing` output from the library into the test harness.
///
/// Output is captured and only shown for failing tests. The filter comes
/// from `RUST_LOG`, defaulting to `concur=debug` so failures show the
/// launcher's state transitions.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("concur=debug"));
        // Another harness may already own the global subscriber.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// A pool-name prefix no other test (in this or another test process) uses.
pub fn unique_prefix(tag: &str) -> String {
    let n = NEXT_PREFIX.fetch_add(1, Ordering::Relaxed);
    format!("concur-test-{}-{n}-{tag}", std::process::id())
}

/// Unlinks the pool name when dropped, so failed tests don't leave names
/// behind in `/dev/shm`.
///
/// Pair it with [`unique_prefix`]; it never clears a name up front, since a
/// launcher under test may already have created it.
pub struct PoolGuard {
    name: PoolName,
}

impl PoolGuard {
    pub fn new(name: PoolName) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &PoolName {
        &self.name
    }
}

impl Drop for PoolGuard {
    fn drop(&mut self) {
        let _ = pool::unlink(&self.name);
    }
}
