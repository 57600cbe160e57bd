// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{ConcurError, Result};
use crate::pool::key::validate_prefix;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::ConcurError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.pool, raw.reclaimer))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_pool(cfg)?;
    validate_reclaimer(cfg)?;
    Ok(())
}

fn validate_pool(cfg: &RawConfigFile) -> Result<()> {
    validate_prefix(&cfg.pool.prefix)?;
    validate_capacity(cfg.pool.capacity)
}

/// Largest initial value `sem_open` accepts (`SEM_VALUE_MAX` on Linux).
pub const MAX_CAPACITY: u32 = i32::MAX as u32;

/// A pool with zero slots would block every launcher forever.
pub fn validate_capacity(capacity: Option<u32>) -> Result<()> {
    match capacity {
        Some(0) => Err(ConcurError::ConfigError(
            "[pool].capacity must be >= 1 (got 0)".to_string(),
        )),
        Some(n) if n > MAX_CAPACITY => Err(ConcurError::ConfigError(format!(
            "[pool].capacity must be <= {MAX_CAPACITY} (got {n})"
        ))),
        _ => Ok(()),
    }
}

fn validate_reclaimer(cfg: &RawConfigFile) -> Result<()> {
    validate_poll_interval(cfg.reclaimer.poll_interval_ms)
}

pub fn validate_poll_interval(ms: u64) -> Result<()> {
    if ms == 0 {
        return Err(ConcurError::ConfigError(
            "[reclaimer].poll_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
