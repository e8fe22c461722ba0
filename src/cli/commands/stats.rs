//! Stats command - usage statistics for tracked applications.

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use serde::Serialize;

use crate::cli::format::{format_duration, OutputFormat};
use crate::config::Config;
use crate::storage::{AllTimeStats, Database, DayStats};

#[derive(clap::Args)]
pub struct Args {
    /// Only show stats for app names containing this substring.
    #[arg(long)]
    pub app: Option<String>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Stats for one recorded app, as rendered by this command.
#[derive(Serialize)]
struct AppStats {
    app_name: String,
    today: Option<DayStats>,
    all_time: Option<AllTimeStats>,
}

pub fn run(args: Args) -> Result<()> {
    let config = Config::load().context("Failed to load config (run 'focuslog init' first)")?;
    let db = Database::open(&config.db_path())
        .with_context(|| format!("Failed to open database at {}", config.db_path))?;

    let filter = args.app.as_deref().map(str::to_lowercase);
    let today = Utc::now().date_naive();

    let mut stats = Vec::new();
    for name in db.app_names().context("Failed to list recorded apps")? {
        if let Some(filter) = &filter {
            if !name.to_lowercase().contains(filter) {
                continue;
            }
        }

        stats.push(AppStats {
            today: db
                .stats_for_day(&name, today)
                .with_context(|| format!("Failed to query today's stats for {name}"))?,
            all_time: db
                .stats_all_time(&name)
                .with_context(|| format!("Failed to query all-time stats for {name}"))?,
            app_name: name,
        });
    }

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Text => print_text(&stats),
    }

    Ok(())
}

fn print_text(stats: &[AppStats]) {
    if stats.is_empty() {
        println!("{}", "No sessions recorded yet".yellow());
        println!(
            "{}",
            "Start tracking with 'focuslog run' or 'focuslog daemon start'".dimmed()
        );
        return;
    }

    println!("{}", "Usage Statistics".green().bold());

    for app in stats {
        println!();
        println!("{}", app.app_name.bold());

        match &app.today {
            Some(today) => {
                println!(
                    "  {} {} opens, {} focused, {} total (avg {})",
                    "Today:".dimmed(),
                    today.opens,
                    format_duration(today.focus_seconds),
                    format_duration(today.total_seconds),
                    format_duration(today.avg_total_seconds.round() as i64),
                );
            }
            None => println!("  {} no sessions", "Today:".dimmed()),
        }

        if let Some(all_time) = &app.all_time {
            println!(
                "  {} {} opens, {} focused, {} total",
                "All time:".dimmed(),
                all_time.opens,
                format_duration(all_time.focus_seconds),
                format_duration(all_time.total_seconds),
            );
            println!(
                "  {} {}",
                "First use:".dimmed(),
                all_time.first_use.format("%Y-%m-%d %H:%M UTC")
            );
        }
    }
}
