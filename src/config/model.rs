// src/config/model.rs

use serde::Deserialize;

use crate::pool::DEFAULT_PREFIX;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [pool]
/// prefix = "concur"
/// capacity = 8
///
/// [reclaimer]
/// poll_interval_ms = 50
/// ```
///
/// Every section and key is optional.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub pool: PoolSection,

    #[serde(default)]
    pub reclaimer: ReclaimerSection,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub pool: PoolSection,
    pub reclaimer: ReclaimerSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(pool: PoolSection, reclaimer: ReclaimerSection) -> Self {
        Self { pool, reclaimer }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(PoolSection::default(), ReclaimerSection::default())
    }
}

/// `[pool]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolSection {
    /// Semaphore name prefix; the full name is `/<prefix>.<uid>.<driver-pid>`.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Fixed capacity for newly created pools.
    ///
    /// If `None`, the number of online CPUs is used.
    #[serde(default)]
    pub capacity: Option<u32>,
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

impl Default for PoolSection {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            capacity: None,
        }
    }
}

/// `[reclaimer]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReclaimerSection {
    /// Delay between driver liveness probes, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    50
}

impl Default for ReclaimerSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}
