//! Mosaic generation: request in, one stitched frame per timestamp on disk.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use mosaic::MosaicAssembler;
use mosaic_common::time::utc_offset;
use mosaic_common::{
    FrameTime, GeoBoundingBox, MosaicError, MosaicResult, RequestWindow, SourceTime, TileGrid,
    TileGridPlanner, ZoomLevel,
};
use projection::WebMercator;
use storage::{Session, SessionManager};
use tile_fetcher::{SourceUrlTemplate, TileFetcher};

use crate::config::ServiceConfig;
use crate::metrics::MetricsCollector;

/// Body of a mosaic generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MosaicRequest {
    /// Local start time, `YYYY-MM-DD HH:MM`
    pub datetime: String,
    /// Local end time, inclusive
    pub endtime: String,
    /// `[min_lon, min_lat, max_lon, max_lat]`
    pub bbox: Vec<f64>,
    pub zoom: u32,
}

/// A request that passed validation, with its tile grid.
#[derive(Debug, Clone)]
pub struct PlannedMosaic {
    pub window: RequestWindow,
    pub zoom: ZoomLevel,
    pub grid: TileGrid,
}

#[derive(Debug, Clone)]
pub struct MosaicOutcome {
    pub session: Session,
    pub frames: Vec<FrameTime>,
    /// Timestamps for which no tile could be fetched
    pub skipped: Vec<FrameTime>,
    pub cols: u32,
    pub rows: u32,
}

pub struct MosaicPipeline {
    sessions: Arc<SessionManager>,
    fetcher: TileFetcher,
    template: SourceUrlTemplate,
    projector: WebMercator,
    planner: TileGridPlanner,
    assembler: MosaicAssembler,
    offset: FixedOffset,
    allowed_minutes: Vec<u32>,
    step_minutes: u32,
    metrics: Arc<MetricsCollector>,
}

impl MosaicPipeline {
    pub fn new(
        config: &ServiceConfig,
        sessions: Arc<SessionManager>,
        fetcher: TileFetcher,
        metrics: Arc<MetricsCollector>,
    ) -> MosaicResult<Self> {
        Ok(Self {
            sessions,
            fetcher,
            template: config.source_template.clone(),
            projector: WebMercator::new(),
            planner: TileGridPlanner::mosaic()
                .with_tile_size(config.tile_size_px)
                .with_max_tiles(Some(config.max_tiles)),
            assembler: MosaicAssembler::new(config.tile_size_px),
            offset: utc_offset(config.utc_offset_minutes)?,
            allowed_minutes: config.allowed_minutes.clone(),
            step_minutes: config.step_minutes,
            metrics,
        })
    }

    /// Validate a request and plan its grid without touching disk or network.
    pub fn plan(&self, request: &MosaicRequest) -> MosaicResult<PlannedMosaic> {
        let window = RequestWindow::parse(
            &request.datetime,
            &request.endtime,
            self.offset,
            &self.allowed_minutes,
        )?;
        let geo = GeoBoundingBox::from_slice(&request.bbox)?;
        let planar = self.projector.project_bbox(&geo)?;
        let zoom = ZoomLevel::new(request.zoom)?;
        let grid = self.planner.plan(&planar, zoom)?;

        Ok(PlannedMosaic { window, zoom, grid })
    }

    /// Create a session and write one mosaic frame per timestamp into it.
    ///
    /// Timestamps are processed in order. One for which every tile failed is
    /// logged and skipped rather than written as an empty frame.
    #[instrument(skip(self, request), fields(zoom = request.zoom))]
    pub async fn generate(&self, request: &MosaicRequest) -> MosaicResult<MosaicOutcome> {
        let plan = self.plan(request)?;
        let steps = plan.window.steps(self.step_minutes);
        let session = self.sessions.create().await?;

        info!(
            session_id = %session.id,
            cols = plan.grid.cols,
            rows = plan.grid.rows,
            timestamps = steps.len(),
            "Generating mosaic frames"
        );

        let mut frames = Vec::with_capacity(steps.len());
        let mut skipped = Vec::new();
        for step in &steps {
            let time = FrameTime::from_datetime(step);
            if self.generate_frame(&session, &plan.grid, step).await? {
                frames.push(time);
            } else {
                skipped.push(time);
            }
        }

        info!(
            session_id = %session.id,
            written = frames.len(),
            skipped = skipped.len(),
            "Mosaic frames complete"
        );

        Ok(MosaicOutcome {
            session,
            frames,
            skipped,
            cols: plan.grid.cols,
            rows: plan.grid.rows,
        })
    }

    /// Returns false when nothing could be fetched for this timestamp.
    async fn generate_frame(
        &self,
        session: &Session,
        grid: &TileGrid,
        step: &DateTime<FixedOffset>,
    ) -> MosaicResult<bool> {
        let time = FrameTime::from_datetime(step);
        let url = self.template.render(&SourceTime::from_local(step));

        let report = self.fetcher.fetch_all(&grid.cells, &url).await;
        if report.is_empty() {
            warn!(time = %time, url = %url, "No tiles fetched, skipping timestamp");
            return Ok(false);
        }
        if !report.failures.is_empty() {
            warn!(
                time = %time,
                failed = report.failures.len(),
                requested = report.requested(),
                "Some tiles missing from frame"
            );
        }

        let frame = self.assembler.assemble_frame(time, grid, &report.tiles);
        let path = session.layout.frame_path(time);
        tokio::task::spawn_blocking(move || frame.save(&path))
            .await
            .map_err(|e| MosaicError::Internal(format!("frame writer panicked: {}", e)))??;

        self.metrics.record_frame_written();
        Ok(true)
    }
}
