//! Apps command - manage the list of tracked applications.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use crate::config::Config;

#[derive(clap::Args)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<AppsCommand>,
}

#[derive(Subcommand)]
pub enum AppsCommand {
    /// List tracked applications
    List,
    /// Add an application to the tracked list
    Add { name: String },
    /// Remove an application from the tracked list
    Remove { name: String },
}

pub fn run(args: Args) -> Result<()> {
    match args.command {
        Some(AppsCommand::List) | None => list_apps(),
        Some(AppsCommand::Add { name }) => add_app(&name),
        Some(AppsCommand::Remove { name }) => remove_app(&name),
    }
}

fn list_apps() -> Result<()> {
    let config = Config::load().context("Failed to load config (run 'focuslog init' first)")?;

    println!("{}", "Tracked applications".bold());
    println!();
    for app in &config.target_apps {
        println!("  {} {}", "•".green(), app);
    }

    Ok(())
}

fn add_app(name: &str) -> Result<()> {
    let mut config = Config::load().context("Failed to load config (run 'focuslog init' first)")?;

    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Application name must not be blank");
    }

    if config
        .target_apps
        .iter()
        .any(|a| a.eq_ignore_ascii_case(name))
    {
        println!("{} '{name}' is already tracked", "Warning:".yellow());
        return Ok(());
    }

    config.target_apps.push(name.to_string());
    config.save().context("Failed to write config")?;

    println!("{} Now tracking '{name}'", "Success:".green());
    println!(
        "{}",
        "Restart the daemon for the change to take effect".dimmed()
    );

    Ok(())
}

fn remove_app(name: &str) -> Result<()> {
    let mut config = Config::load().context("Failed to load config (run 'focuslog init' first)")?;

    let name = name.trim();
    let before = config.target_apps.len();
    config
        .target_apps
        .retain(|a| !a.eq_ignore_ascii_case(name));

    if config.target_apps.len() == before {
        println!("{} '{name}' is not tracked", "Warning:".yellow());
        return Ok(());
    }

    if config.target_apps.is_empty() {
        anyhow::bail!("Cannot remove the last tracked application");
    }

    config.save().context("Failed to write config")?;

    println!("{} No longer tracking '{name}'", "Success:".green());
    println!(
        "{}",
        "Restart the daemon for the change to take effect".dimmed()
    );

    Ok(())
}
