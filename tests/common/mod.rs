#![allow(dead_code)]

use std::path::PathBuf;
use std::process::Command;

pub use concur_test_utils::{PoolGuard, init_tracing, unique_prefix};

/// Path of the `concur` binary built for these tests.
pub fn concur_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_concur"))
}

/// A `concur` command using `prefix`, with logging kept at warn.
pub fn concur(prefix: &str) -> Command {
    let mut cmd = Command::new(concur_bin());
    cmd.env_remove("CONCUR_CONFIG")
        .env("CONCUR_LOG", "warn")
        .args(["--prefix", prefix]);
    cmd
}
