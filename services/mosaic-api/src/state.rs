//! Shared application state.

use std::sync::Arc;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;

use sequencer::{CommandTool, ExternalTool, FfmpegEncoder, FrameSequenceOrchestrator, RifeInterpolator};
use storage::SessionManager;
use tile_fetcher::{HttpTileSource, TileFetcher, TileSource};

use crate::config::ServiceConfig;
use crate::metrics::MetricsCollector;
use crate::pipeline::MosaicPipeline;

pub struct AppState {
    pub config: ServiceConfig,
    pub sessions: Arc<SessionManager>,
    pub pipeline: MosaicPipeline,
    pub orchestrator: FrameSequenceOrchestrator,
    pub metrics: Arc<MetricsCollector>,
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Wire the production HTTP source and external programs.
    pub fn from_config(config: ServiceConfig) -> Result<Self> {
        let params = config.wms.clone().with_tile_size(config.tile_size_px);
        let source = HttpTileSource::new(params).context("Failed to build tile HTTP client")?;
        let python = CommandTool::new(config.interpolation.python_path.clone());
        let ffmpeg = CommandTool::new(config.encoder.ffmpeg_path.clone());

        Self::with_components(config, Arc::new(source), Arc::new(python), Arc::new(ffmpeg))
    }

    /// Wire arbitrary tile source and tool implementations.
    pub fn with_components(
        config: ServiceConfig,
        source: Arc<dyn TileSource>,
        interpolation_tool: Arc<dyn ExternalTool>,
        encoder_tool: Arc<dyn ExternalTool>,
    ) -> Result<Self> {
        let sessions = Arc::new(SessionManager::new(config.sessions_root.clone()));
        let metrics = Arc::new(MetricsCollector::new());

        let fetcher = TileFetcher::new(source, config.fetch.to_fetch_config());
        let pipeline = MosaicPipeline::new(&config, sessions.clone(), fetcher, metrics.clone())
            .context("Invalid mosaic configuration")?;

        let interpolator = RifeInterpolator::new(
            interpolation_tool,
            config.interpolation.script.clone(),
            config.interpolation.model_dir.clone(),
        )
        .with_exponent(config.interpolation.exponent)
        .context("Invalid interpolation configuration")?;
        let encoder = FfmpegEncoder::new(encoder_tool).with_frame_rate(config.encoder.frame_rate);
        let orchestrator = FrameSequenceOrchestrator::new(interpolator, encoder);

        Ok(Self {
            config,
            sessions,
            pipeline,
            orchestrator,
            metrics,
            prometheus: None,
        })
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
