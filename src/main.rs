//! Server entry point for the audio downloader.

use std::sync::Arc;

use anyhow::{Context, Result};
use audio_downloader_core::api::{self, AppState};
use audio_downloader_core::{Queue, Worker};
use clap::Parser;
use tracing::{debug, info, warn};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.default_log_level()));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    debug!(?args, "CLI arguments parsed");
    info!("Audio downloader starting");

    let config = Arc::new(args.downloader_config());
    config
        .ensure_dirs()
        .context("failed to create config/music directories")?;

    let queue = Queue::new();
    let worker = Worker::from_config(queue.clone(), &config).spawn();

    let app = api::router(
        AppState::new(queue, Arc::clone(&config)),
        Some(args.static_dir.as_path()),
    );

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    info!(addr = %args.bind, music_dir = %config.music_dir.display(), "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    // No designed stop signal for the worker; an in-flight download is
    // abandoned (its child process is killed on drop).
    worker.abort();
    info!("Audio downloader stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
