use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod config;
mod daemon;
mod error;
mod inspect;
mod storage;
mod tracker;

use cli::commands;

/// The main CLI command line interface.
#[derive(Parser)]
#[command(name = "focuslog")]
#[command(version)]
#[command(about = "Track how long your applications run and hold focus")]
#[command(long_about = "Focuslog polls the foreground window and the process table,\n\
    records when tracked applications gain and lose focus, and stores\n\
    a session record to SQLite each time a tracked application exits.")]
#[command(after_help = "EXAMPLES:\n    \
    focuslog init --apps notepad,chrome   Configure tracked applications\n    \
    focuslog run                          Track in the foreground\n    \
    focuslog daemon start                 Track in the background\n    \
    focuslog stats                        Show usage statistics\n    \
    focuslog apps add firefox             Track another application\n\n\
    For more information about a command, run 'focuslog <command> --help'.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Create the initial configuration and database
    #[command(long_about = "Writes ~/.focuslog/config.json with the applications to track,\n\
        the polling interval, and the database path, then creates the\n\
        SQLite database so the first run starts clean.")]
    Init(commands::init::Args),

    /// Run the tracker interactively in the foreground
    #[command(long_about = "Polls the foreground window at the configured interval and\n\
        records sessions until interrupted. Open sessions are saved\n\
        on Ctrl+C.")]
    Run(commands::run::Args),

    /// Show usage statistics for tracked applications
    #[command(long_about = "Shows per-application session counts and focus/total durations\n\
        for today and across all recorded history.\n\
        \n\
        Supports multiple output formats:\n\
        - text: colored terminal output (default)\n\
        - json: machine-readable structured output")]
    Stats(commands::stats::Args),

    /// Manage the list of tracked applications
    #[command(long_about = "Lists, adds, or removes tracked application names. Names match\n\
        process names case-insensitively as substrings. Changes take\n\
        effect on the next tracker start.")]
    Apps(commands::apps::Args),

    /// Manage the background tracking daemon
    #[command(long_about = "Controls the background daemon that polls the foreground window\n\
        and records sessions without a console.")]
    Daemon(commands::daemon::Args),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "focuslog=debug"
    } else {
        "focuslog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    match cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Run(args) => commands::run::run(args),
        Commands::Stats(args) => commands::stats::run(args),
        Commands::Apps(args) => commands::apps::run(args),
        Commands::Daemon(args) => commands::daemon::run(args),
    }
}
