//! Raw tile archiver.
//!
//! Fetches every tile of a bbox (the full disk by default) for one local
//! timestamp and stores the PNGs under a dated directory tree.

mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use cli::Args;
use tile_fetcher::{ArchiveFetcher, HttpTileSource, TileFetcher, WmsGetMapParams};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let job = args.to_job().context("Invalid archive request")?;
    let source = HttpTileSource::new(WmsGetMapParams::default())
        .context("Failed to build tile HTTP client")?;
    let fetcher = TileFetcher::new(Arc::new(source), args.fetch_config());
    let archiver = ArchiveFetcher::new(fetcher, args.template()).with_planner(args.planner());

    info!(
        timestamp = %job.timestamp,
        zoom = job.zoom.value(),
        probe = job.probe_before_fetch,
        output = %job.output_dir().display(),
        "Starting archive run"
    );

    let report = archiver.run(&job).await?;

    if report.skipped {
        info!("Source has no data for this timestamp, nothing archived");
    } else if report.failed > 0 {
        warn!(
            saved = report.saved,
            failed = report.failed,
            planned = report.planned,
            "Archive run finished with missing tiles"
        );
    } else {
        info!(saved = report.saved, directory = %report.directory.display(), "Archive run finished");
    }

    Ok(())
}
