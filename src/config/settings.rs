// src/config/settings.rs

//! Effective runtime settings: config file values with CLI overrides applied.

use std::time::Duration;

use crate::config::model::ConfigFile;
use crate::config::validate::{validate_capacity, validate_poll_interval};
use crate::cpu::online_cpus;
use crate::errors::Result;
use crate::pool::key::validate_prefix;

/// Values given on the command line, each taking precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub prefix: Option<String>,
    pub capacity: Option<u32>,
    pub poll_interval_ms: Option<u64>,
    pub no_detach: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub prefix: String,
    pub capacity: Option<u32>,
    pub poll_interval: Duration,
    /// Fork away from the driver before waiting on the worker.
    pub detach: bool,
}

impl Settings {
    pub fn resolve(cfg: &ConfigFile, overrides: Overrides) -> Result<Self> {
        let prefix = overrides.prefix.unwrap_or_else(|| cfg.pool.prefix.clone());
        validate_prefix(&prefix)?;

        let capacity = overrides.capacity.or(cfg.pool.capacity);
        validate_capacity(capacity)?;

        let poll_ms = overrides
            .poll_interval_ms
            .unwrap_or(cfg.reclaimer.poll_interval_ms);
        validate_poll_interval(poll_ms)?;

        Ok(Self {
            prefix,
            capacity,
            poll_interval: Duration::from_millis(poll_ms),
            detach: !overrides.no_detach,
        })
    }

    /// Capacity a newly created pool gets: the configured value, or the
    /// online CPU count.
    pub fn initial_capacity(&self) -> u32 {
        self.capacity.unwrap_or_else(online_cpus)
    }
}

impl Default for Settings {
    fn default() -> Self {
        // Defaults are valid by construction.
        Self {
            prefix: crate::pool::DEFAULT_PREFIX.to_string(),
            capacity: None,
            poll_interval: Duration::from_millis(50),
            detach: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ConcurError;

    #[test]
    fn cli_overrides_win_over_file() {
        let mut cfg = ConfigFile::default();
        cfg.pool.capacity = Some(2);
        cfg.pool.prefix = "from-file".to_string();

        let settings = Settings::resolve(
            &cfg,
            Overrides {
                prefix: Some("from-cli".to_string()),
                capacity: Some(5),
                poll_interval_ms: Some(10),
                no_detach: true,
            },
        )
        .unwrap();

        assert_eq!(settings.prefix, "from-cli");
        assert_eq!(settings.capacity, Some(5));
        assert_eq!(settings.poll_interval, Duration::from_millis(10));
        assert!(!settings.detach);
        assert_eq!(settings.initial_capacity(), 5);
    }

    #[test]
    fn file_values_used_without_overrides() {
        let mut cfg = ConfigFile::default();
        cfg.pool.capacity = Some(3);
        let settings = Settings::resolve(&cfg, Overrides::default()).unwrap();
        assert_eq!(settings.capacity, Some(3));
        assert!(settings.detach);
    }

    #[test]
    fn defaults_match_resolved_defaults() {
        let resolved = Settings::resolve(&ConfigFile::default(), Overrides::default()).unwrap();
        assert_eq!(resolved, Settings::default());
        assert!(resolved.initial_capacity() >= 1);
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let cfg = ConfigFile::default();
        let zero_cap = Overrides {
            capacity: Some(0),
            ..Overrides::default()
        };
        assert!(matches!(
            Settings::resolve(&cfg, zero_cap),
            Err(ConcurError::ConfigError(_))
        ));

        let huge_cap = Overrides {
            capacity: Some(u32::MAX),
            ..Overrides::default()
        };
        assert!(matches!(
            Settings::resolve(&cfg, huge_cap),
            Err(ConcurError::ConfigError(_))
        ));

        let zero_poll = Overrides {
            poll_interval_ms: Some(0),
            ..Overrides::default()
        };
        assert!(Settings::resolve(&cfg, zero_poll).is_err());
    }
}
