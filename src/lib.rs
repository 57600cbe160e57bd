// src/lib.rs

pub mod cli;
pub mod config;
pub mod cpu;
pub mod errors;
pub mod launcher;
pub mod logging;
pub mod pool;
pub mod reclaim;

use anyhow::Result;
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{Settings, load_or_default};
use crate::launcher::LaunchOutcome;
use crate::pool::PoolKey;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - pool attach / reclaimer spawn / slot acquire (in [`launcher`])
/// - the worker run and slot release
///
/// Returns on both sides of the detaching fork. Neither side reports the
/// worker's exit status.
pub fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(args.config.as_deref())?;
    let settings = Settings::resolve(&cfg, args.overrides())?;
    debug!(?settings, "resolved settings");

    let key = PoolKey::current();

    if args.dry_run {
        return print_dry_run(&settings, key, &args);
    }

    match launcher::launch(&settings, key, &args.command)? {
        LaunchOutcome::Detached => debug!("returned to driver"),
        LaunchOutcome::Completed(exit) => debug!(?exit, "launcher done"),
    }
    Ok(())
}

/// Print the pool this invocation would use, without attaching to it.
fn print_dry_run(settings: &Settings, key: PoolKey, args: &CliArgs) -> Result<()> {
    let name = key.pool_name(&settings.prefix)?;

    println!("concur dry-run");
    println!("  pool = {name}");
    println!("  key = {key}");
    match settings.capacity {
        Some(n) => println!("  capacity (if created) = {n}"),
        None => println!(
            "  capacity (if created) = {} (online CPUs)",
            settings.initial_capacity()
        ),
    }
    println!("  reclaimer poll interval = {:?}", settings.poll_interval);
    println!("  detach = {}", settings.detach);
    println!("  command = {:?}", args.command);

    Ok(())
}
