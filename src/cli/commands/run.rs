//! Run command - foreground tracking with console output.

use anyhow::{Context, Result};
use colored::Colorize;
use tokio::sync::broadcast;

use crate::config::Config;
use crate::daemon::{build_driver, run_loop, spawn_signal_listener};

#[derive(clap::Args)]
pub struct Args {
    /// Suppress the startup banner (for autostart entries).
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn run(args: Args) -> Result<()> {
    let config = Config::load().context(
        "Focuslog is not configured.\nRun 'focuslog init --apps <name,...>' first.",
    )?;

    if !args.quiet {
        println!("{}", "Focuslog".green().bold());
        println!(
            "  {}  {}",
            "Tracking:".dimmed(),
            config.target_apps.join(", ")
        );
        println!(
            "  {}  every {}s",
            "Polling:".dimmed(),
            config.check_interval_secs
        );
        println!("  {}  {}", "Database:".dimmed(), config.db_path);
        println!();
        println!("{}", "Press Ctrl+C to stop".dimmed());
        println!();
    }

    let mut driver = build_driver(&config)?;

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    rt.block_on(async {
        let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
        spawn_signal_listener(shutdown_tx);
        run_loop(&mut driver, shutdown_rx).await
    })?;

    if !args.quiet {
        println!();
        println!("{}", "Tracking stopped, open sessions saved".green());
    }

    Ok(())
}
