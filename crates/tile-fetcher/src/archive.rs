//! Raw tile archival.
//!
//! One fetcher covers both the full-disk and regional archives: the bbox is
//! a parameter, snapping is symmetric, there is no tile cap, and an optional
//! probe checks the timestamp is published before fanning out.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use futures::stream::{self, StreamExt};
use tracing::{info, instrument, warn};

use mosaic_common::{
    MosaicResult, PlanarBoundingBox, SourceTime, TileGridCell, TileGridPlanner, ZoomLevel,
};

use crate::fetcher::TileFetcher;
use crate::source::SourceUrlTemplate;

/// Planar extent that covers the whole geostationary disk.
pub const FULL_DISK_BBOX: PlanarBoundingBox = PlanarBoundingBox {
    min_x: -21_000_000.0,
    min_y: -21_000_000.0,
    max_x: 21_000_000.0,
    max_y: 21_000_000.0,
};

/// One archival run: every tile of `bbox` at one timestamp.
#[derive(Debug, Clone)]
pub struct ArchiveJob {
    pub bbox: PlanarBoundingBox,
    pub zoom: ZoomLevel,
    pub probe_before_fetch: bool,
    pub output_root: PathBuf,
    /// Local timestamp; also names the output directory and files
    pub timestamp: DateTime<FixedOffset>,
}

impl ArchiveJob {
    /// `<root>/YYYY/MM/DD` in local time.
    pub fn output_dir(&self) -> PathBuf {
        self.output_root
            .join(self.timestamp.format("%Y").to_string())
            .join(self.timestamp.format("%m").to_string())
            .join(self.timestamp.format("%d").to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    pub directory: PathBuf,
    pub planned: usize,
    pub saved: usize,
    pub failed: usize,
    /// The probe found nothing at the source, so no tiles were requested
    pub skipped: bool,
}

/// `<YYYYmmddHHMMSS>BBOX=<bbox with '.' and ',' replaced by '_'>.png`
pub fn tile_filename(timestamp: &DateTime<FixedOffset>, bbox: &PlanarBoundingBox) -> String {
    format!(
        "{}BBOX={}.png",
        timestamp.format("%Y%m%d%H%M%S"),
        bbox.to_wms_string().replace(['.', ','], "_")
    )
}

pub struct ArchiveFetcher {
    fetcher: TileFetcher,
    template: SourceUrlTemplate,
    planner: TileGridPlanner,
}

impl ArchiveFetcher {
    pub fn new(fetcher: TileFetcher, template: SourceUrlTemplate) -> Self {
        Self {
            fetcher,
            template,
            planner: TileGridPlanner::archival(),
        }
    }

    pub fn with_planner(mut self, planner: TileGridPlanner) -> Self {
        self.planner = planner;
        self
    }

    #[instrument(skip(self, job), fields(timestamp = %job.timestamp, zoom = job.zoom.value()))]
    pub async fn run(&self, job: &ArchiveJob) -> MosaicResult<ArchiveReport> {
        let grid = self.planner.plan(&job.bbox, job.zoom)?;
        let url = self.template.render(&SourceTime::from_local(&job.timestamp));
        let directory = job.output_dir();

        let mut report = ArchiveReport {
            directory: directory.clone(),
            planned: grid.cells.len(),
            saved: 0,
            failed: 0,
            skipped: false,
        };

        if job.probe_before_fetch {
            let centre = grid.cells[grid.cells.len() / 2];
            if let Err(e) = self.fetcher.probe(&url, &centre).await {
                info!(url = %url, error = %e, "Timestamp not available at source, skipping");
                report.skipped = true;
                return Ok(report);
            }
        }

        tokio::fs::create_dir_all(&directory).await?;
        info!(
            url = %url,
            tiles = grid.cells.len(),
            directory = %directory.display(),
            "Archiving tiles"
        );

        let outcomes: Vec<bool> = stream::iter(&grid.cells)
            .map(|cell| self.archive_tile(&url, cell, &directory, &job.timestamp))
            .buffer_unordered(self.fetcher.config().max_workers.max(1))
            .collect()
            .await;

        report.saved = outcomes.iter().filter(|saved| **saved).count();
        report.failed = outcomes.len() - report.saved;

        info!(saved = report.saved, failed = report.failed, "Archive run complete");
        Ok(report)
    }

    async fn archive_tile(
        &self,
        url: &str,
        cell: &TileGridCell,
        directory: &Path,
        timestamp: &DateTime<FixedOffset>,
    ) -> bool {
        let bytes = match self.fetcher.fetch_tile_bytes(url, cell).await {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };

        let path = directory.join(tile_filename(timestamp, &cell.bbox));
        match tokio::fs::write(&path, &bytes).await {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to write tile");
                false
            }
        }
    }
}
