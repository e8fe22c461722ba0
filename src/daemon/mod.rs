//! Background monitoring daemon.
//!
//! Runs the poll loop without a console: logs go to a file, a PID file
//! guards against double starts, and SIGTERM/Ctrl+C trigger a flush of
//! every open session before exit.
//!
//! # Architecture
//!
//! - **Driver**: the observe/update/persist cycle, one tick per interval
//! - **State**: PID file and log file lifecycle
//!
//! The interactive `run` command and this daemon are thin adapters over
//! the same driver; the daemon only adds file logging and the PID guard.

pub mod driver;
pub mod state;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing_appender::non_blocking::WorkerGuard;

use crate::config::Config;
use crate::error::Error;
use crate::inspect::{Inspector, NativeInspector};
use crate::storage::{Database, SessionStore};
use crate::tracker::{SessionTracker, TargetSet};

pub use driver::PollDriver;
pub use state::DaemonState;

/// Runs the daemon in the foreground of the current process.
///
/// 1. Refuses to start if another instance is already running
/// 2. Loads and validates the config (fatal on error, never retried)
/// 3. Switches logging to `~/.focuslog/daemon.log`
/// 4. Writes the PID file and runs the poll loop
/// 5. On SIGTERM/Ctrl+C, flushes open sessions and cleans up state files
pub async fn run_daemon() -> Result<()> {
    let state = DaemonState::new()?;

    if state.is_running() {
        anyhow::bail!(
            "Daemon is already running (PID {})",
            state.get_pid().unwrap_or(0)
        );
    }

    let config = Config::load().context(
        "Focuslog is not configured.\n\
         Run 'focuslog init --apps <name,...>' first, then start the daemon again.",
    )?;

    let _guard = setup_logging(&state)?;

    tracing::info!("Starting focuslog daemon...");

    let pid = std::process::id();
    state.write_pid(pid)?;
    tracing::info!("Daemon started with PID {}", pid);

    let mut driver = build_driver(&config)?;

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    spawn_signal_listener(shutdown_tx);

    let result = run_loop(&mut driver, shutdown_rx).await;

    state.cleanup()?;
    tracing::info!("Daemon stopped");

    result.map_err(Into::into)
}

/// Wires config, inspector, tracker, and store into a driver.
pub fn build_driver(config: &Config) -> Result<PollDriver<NativeInspector, Database>> {
    let targets = TargetSet::new(&config.target_apps)?;
    let inspector = NativeInspector::new()?;
    let db = Database::open(&config.db_path())
        .with_context(|| format!("Failed to open database at {}", config.db_path))?;

    Ok(PollDriver::new(
        SessionTracker::new(targets),
        inspector,
        db,
        config.check_interval(),
    ))
}

/// Drives ticks until the shutdown signal, then flushes.
///
/// The stop signal is honored only between ticks; the flush runs to
/// completion before this returns. Tick errors (a lost session record)
/// are logged and tracking continues.
pub async fn run_loop<I: Inspector, S: SessionStore>(
    driver: &mut PollDriver<I, S>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), Error> {
    tracing::info!(interval = ?driver.interval(), "poll loop started");

    loop {
        if let Err(e) = driver.poll_once() {
            tracing::error!("tick failed: {e}");
        }

        tokio::select! {
            _ = tokio::time::sleep(driver.interval()) => {}
            _ = shutdown.recv() => break,
        }
    }

    let flushed = driver.flush()?;
    tracing::info!(sessions = flushed, "poll loop stopped, open sessions flushed");

    Ok(())
}

/// Sends one shutdown notification on Ctrl+C or, on Unix, SIGTERM.
pub fn spawn_signal_listener(shutdown_tx: broadcast::Sender<()>) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            match signal(SignalKind::terminate()) {
                Ok(mut term) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = term.recv() => {}
                    }
                }
                Err(e) => {
                    tracing::warn!("failed to install SIGTERM handler: {e}");
                    let _ = tokio::signal::ctrl_c().await;
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }

        let _ = shutdown_tx.send(());
    });
}

/// Switches tracing output to the daemon log file.
///
/// The returned guard must stay alive for the daemon's lifetime. Uses
/// `try_init` so running in the foreground from the CLI (where main.rs
/// already installed a subscriber) logs to the existing one instead of
/// panicking.
fn setup_logging(state: &DaemonState) -> Result<WorkerGuard> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let file_appender = tracing_appender::rolling::never(
        state.log_file.parent().unwrap_or(std::path::Path::new(".")),
        state.log_file.file_name().unwrap_or_default(),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "focuslog=info".into()),
        )
        .with(file_layer)
        .try_init();

    Ok(guard)
}
