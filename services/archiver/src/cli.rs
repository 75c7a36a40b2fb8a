//! Command-line arguments and their translation into an archive job.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Timelike;
use clap::Parser;

use mosaic_common::time::{
    parse_local_datetime, utc_offset, DEFAULT_ALLOWED_MINUTES, DEFAULT_UTC_OFFSET_MINUTES,
};
use mosaic_common::tile::DEFAULT_ARCHIVE_MAX_TILES;
use mosaic_common::{GeoBoundingBox, MosaicError, MosaicResult, TileGridPlanner, ZoomLevel};
use projection::WebMercator;
use tile_fetcher::{ArchiveJob, FetchConfig, SourceUrlTemplate, FULL_DISK_BBOX};

#[derive(Parser, Debug)]
#[command(name = "archiver")]
#[command(about = "Archive raw satellite tiles for one timestamp")]
pub struct Args {
    /// Local date (YYYY-MM-DD)
    #[arg(long)]
    pub date: String,

    /// Local time (HH:MM), on a :15 or :45 mark
    #[arg(long)]
    pub time: String,

    /// Geographic bbox "minLon,minLat,maxLon,maxLat"; the full disk if omitted
    #[arg(long)]
    pub bbox: Option<String>,

    #[arg(long, default_value_t = 5)]
    pub zoom: u32,

    /// Refuse runs whose grid has more tiles than this
    #[arg(long, default_value_t = DEFAULT_ARCHIVE_MAX_TILES)]
    pub max_tiles: usize,

    /// Skip the run when the source has nothing for this timestamp
    #[arg(long)]
    pub probe: bool,

    #[arg(long, default_value = "RAW_DATA/INSAT")]
    pub output_dir: PathBuf,

    #[arg(long, default_value_t = 16)]
    pub max_workers: usize,

    #[arg(long, default_value_t = 2)]
    pub retries: u32,

    /// Per-attempt timeout in seconds
    #[arg(long, default_value_t = 20)]
    pub timeout_secs: u64,

    /// Source URL template
    #[arg(long, env = "TILE_SOURCE_TEMPLATE")]
    pub source_template: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn to_job(&self) -> MosaicResult<ArchiveJob> {
        let offset = utc_offset(DEFAULT_UTC_OFFSET_MINUTES)?;
        let timestamp = parse_local_datetime(&format!("{} {}", self.date, self.time), offset)?;
        if !DEFAULT_ALLOWED_MINUTES.contains(&timestamp.minute()) {
            return Err(MosaicError::invalid(format!(
                "{} is not on an allowed minute mark {:?}",
                self.time, DEFAULT_ALLOWED_MINUTES
            )));
        }

        let bbox = match &self.bbox {
            Some(raw) => {
                let values = raw
                    .split(',')
                    .map(|v| v.trim().parse::<f64>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| MosaicError::invalid(format!("bad bbox '{}': {}", raw, e)))?;
                WebMercator::new().project_bbox(&GeoBoundingBox::from_slice(&values)?)?
            }
            None => FULL_DISK_BBOX,
        };

        Ok(ArchiveJob {
            bbox,
            zoom: ZoomLevel::new(self.zoom)?,
            probe_before_fetch: self.probe,
            output_root: self.output_dir.clone(),
            timestamp,
        })
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            max_workers: self.max_workers.max(1),
            retries: self.retries,
            timeout: Duration::from_secs(self.timeout_secs),
            ..FetchConfig::default()
        }
    }

    pub fn planner(&self) -> TileGridPlanner {
        TileGridPlanner::archival().with_max_tiles(Some(self.max_tiles))
    }

    pub fn template(&self) -> SourceUrlTemplate {
        self.source_template
            .as_ref()
            .map(SourceUrlTemplate::new)
            .unwrap_or_default()
    }
}
