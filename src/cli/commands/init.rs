//! Init command - create the initial configuration and database.

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::{Config, DEFAULT_CHECK_INTERVAL_SECS};
use crate::storage::Database;

#[derive(clap::Args)]
pub struct Args {
    /// Comma-separated application names to track (substring match).
    #[arg(long, value_delimiter = ',', required = true)]
    pub apps: Vec<String>,

    /// Seconds between polls of the foreground window.
    #[arg(long, default_value_t = DEFAULT_CHECK_INTERVAL_SECS)]
    pub interval: f64,

    /// Custom database location (defaults to ~/.focuslog/focuslog.db).
    #[arg(long)]
    pub db_path: Option<String>,

    /// Overwrite an existing configuration.
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: Args) -> Result<()> {
    let config_path = Config::config_path()?;

    if config_path.exists() && !args.force {
        println!(
            "{} Config already exists at {}",
            "Warning:".yellow(),
            config_path.display()
        );
        println!("Use {} to overwrite it", "--force".bold());
        return Ok(());
    }

    let apps: Vec<String> = args
        .apps
        .iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();

    let mut config = Config::new(apps)?;
    config.check_interval_secs = args.interval;
    if let Some(db_path) = args.db_path {
        config.db_path = db_path;
    }

    config.save().context("Failed to write config")?;

    // Create the database up front so the first run starts clean
    Database::open(&config.db_path())
        .with_context(|| format!("Failed to create database at {}", config.db_path))?;

    println!("{}", "Focuslog initialized".green().bold());
    println!();
    println!("  {}  {}", "Config:".dimmed(), config_path.display());
    println!("  {}  {}", "Database:".dimmed(), config.db_path);
    println!(
        "  {}  {}s",
        "Interval:".dimmed(),
        config.check_interval_secs
    );
    println!("  {}  {}", "Tracking:".dimmed(), config.target_apps.join(", "));
    println!();
    println!("Run {} to start tracking", "focuslog run".bold());

    Ok(())
}
