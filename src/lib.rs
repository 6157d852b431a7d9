pub mod commands;
pub mod config;
pub mod merge;
pub mod models;
pub mod store;
pub mod tracker;

use std::{future::Future, path::PathBuf};

use anyhow::{Context, Result};
use log::info;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use config::TrackerConfig;
use tracker::{ProgressTracker, SweepController};

pub struct AppState {
    pub(crate) tracker: ProgressTracker,
}

impl AppState {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            tracker: ProgressTracker::new(config),
        }
    }
}

/// Start the tracker, the background sweep and the stdin command loop.
/// Returns once stdin closes or Ctrl-C is received.
pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var); stdout carries replies.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("watchtime starting up...");

    let config_path = std::env::var_os("WATCHTIME_CONFIG").map(PathBuf::from);
    let config = TrackerConfig::load(config_path.as_deref())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(serve(config))
}

async fn serve(config: TrackerConfig) -> Result<()> {
    let sweep_interval = config.sweep_interval();
    let state = AppState::new(config);

    let mut sweeper = SweepController::new();
    sweeper.start(state.tracker.clone(), sweep_interval)?;

    let served = command_loop(
        &state,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        tokio::signal::ctrl_c(),
    )
    .await;

    shut_down(served, &mut sweeper).await
}

/// Stop the sweep whatever way the command loop ended, then report the
/// loop's error ahead of any error from stopping.
async fn shut_down(served: Result<()>, sweeper: &mut SweepController) -> Result<()> {
    let stopped = sweeper.stop().await;
    info!("watchtime stopped; in-memory progress discarded");
    served.and(stopped)
}

/// Answer one JSON reply line per input line until input ends or `shutdown`
/// resolves.
async fn command_loop<R, W, S>(
    state: &AppState,
    input: R,
    mut output: W,
    shutdown: S,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Future<Output = std::io::Result<()>>,
{
    let mut lines = input.lines();
    // Pinned once so an interrupt that lands mid-dispatch is still seen.
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read command from stdin")? else {
                    info!("stdin closed");
                    return Ok(());
                };
                if line.trim().is_empty() {
                    continue;
                }

                let reply = commands::dispatch(state, &line).await;
                let mut encoded = serde_json::to_string(&reply)?;
                encoded.push('\n');
                output.write_all(encoded.as_bytes()).await?;
                output.flush().await?;
            }
            _ = &mut shutdown => {
                info!("Interrupt received");
                return Ok(());
            }
        }
    }
}
