// src/config/mod.rs

//! Configuration loading and validation for concur.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk or `CONCUR_CONFIG` (`loader.rs`).
//! - Validate value ranges (`validate.rs`).
//! - Merge file values with command-line overrides (`settings.rs`).

pub mod loader;
pub mod model;
pub mod settings;
pub mod validate;

pub use loader::{CONFIG_ENV, load_and_validate, load_from_path, load_or_default};
pub use model::{ConfigFile, PoolSection, RawConfigFile, ReclaimerSection};
pub use settings::{Overrides, Settings};
