// src/errors.rs

//! Crate-wide error type and `Result` alias.
//!
//! Every coordination failure is fatal for the launcher instance that hits
//! it. The binary maps any `ConcurError` to exit code 1.

use nix::errno::Errno;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConcurError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("cannot attach to capacity pool {name}: {source}")]
    PoolAttach {
        name: String,
        #[source]
        source: Errno,
    },

    #[error("capacity pool {0} disappeared between create and open")]
    PoolVanished(String),

    #[error("cannot unlink capacity pool {name}: {source}")]
    PoolUnlink {
        name: String,
        #[source]
        source: Errno,
    },

    #[error("waiting for a slot failed: {0}")]
    SlotWait(Errno),

    #[error("releasing a slot failed: {0}")]
    SlotRelease(Errno),

    #[error("cannot detach from the driver process: {0}")]
    Detach(Errno),

    #[error("cannot spawn worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("cannot spawn reclaimer: {0}")]
    ReclaimerSpawn(Errno),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ConcurError>;
