// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Everything from the first positional argument onwards is the command to
//! run and is forwarded verbatim, hyphens included. Use `--` if the command
//! itself starts with a hyphen.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::Overrides;

/// Command-line arguments for `concur`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "concur",
    version,
    about = "Run a command, capping how many run at once for the same parent process.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a TOML config file.
    ///
    /// If omitted, `CONCUR_CONFIG` is consulted; otherwise defaults apply.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Capacity for a newly created pool (default: online CPU count).
    #[arg(long, value_name = "N")]
    pub capacity: Option<u32>,

    /// Semaphore name prefix.
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Reclaimer poll interval in milliseconds.
    #[arg(long, value_name = "MS")]
    pub poll_interval: Option<u64>,

    /// Stay attached to the parent until the command finishes.
    #[arg(long)]
    pub no_detach: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CONCUR_LOG` or `warn` is used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the pool that would be used, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,

    /// The command to run and its arguments.
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    pub command: Vec<OsString>,
}

impl CliArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            prefix: self.prefix.clone(),
            capacity: self.capacity,
            poll_interval_ms: self.poll_interval,
            no_detach: self.no_detach,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
