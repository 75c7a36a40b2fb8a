//! Mosaic API service.
//!
//! Stitches satellite tiles into per-timestamp mosaic frames and turns a
//! session's frames into an interpolated video.

use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use mosaic_api::{router, AppState, ServiceConfig};

#[derive(Parser, Debug)]
#[command(name = "mosaic-api")]
#[command(about = "Satellite mosaic and interpolated video API server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8000")]
    listen: String,

    /// YAML configuration file
    #[arg(short, long, env = "MOSAIC_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Number of tokio worker threads (default: number of CPU cores)
    #[arg(long)]
    worker_threads: Option<usize>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    } else if let Ok(threads_str) = env::var("TOKIO_WORKER_THREADS") {
        if let Ok(threads) = threads_str.parse::<usize>() {
            runtime_builder.worker_threads(threads);
        }
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    let config = ServiceConfig::load(args.config.as_deref())?;
    tokio::fs::create_dir_all(&config.sessions_root)
        .await
        .with_context(|| format!("Failed to create {}", config.sessions_root.display()))?;

    info!(
        sessions_root = %config.sessions_root.display(),
        ffmpeg = %config.encoder.ffmpeg_path.display(),
        max_tiles = config.max_tiles,
        "Starting mosaic API server"
    );

    let state = Arc::new(AppState::from_config(config)?.with_prometheus(prometheus_handle));
    let app = router(state.clone());

    let addr: SocketAddr = args.listen.parse()?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let removed = state.sessions.destroy_all().await;
    info!(sessions = removed, "Session directories removed, shutting down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
