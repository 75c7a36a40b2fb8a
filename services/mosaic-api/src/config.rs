//! Service configuration.
//!
//! Built-in defaults, optionally overlaid by a YAML file, then by
//! environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use mosaic_common::tile::{DEFAULT_MAX_TILES, DEFAULT_TILE_SIZE_PX};
use mosaic_common::time::{DEFAULT_ALLOWED_MINUTES, DEFAULT_UTC_OFFSET_MINUTES};
use tile_fetcher::{FetchConfig, SourceUrlTemplate, WmsGetMapParams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Parent directory of all session directories
    pub sessions_root: PathBuf,
    pub tile_size_px: u32,
    /// Spacing of requested timestamps
    pub step_minutes: u32,
    pub max_tiles: usize,
    /// Offset of request times from UTC
    pub utc_offset_minutes: i32,
    /// Minute marks request times must fall on
    pub allowed_minutes: Vec<u32>,
    pub source_template: SourceUrlTemplate,
    pub wms: WmsGetMapParams,
    pub fetch: FetchSettings,
    pub interpolation: InterpolationSettings,
    pub encoder: EncoderSettings,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            sessions_root: PathBuf::from("temp_stitched"),
            tile_size_px: DEFAULT_TILE_SIZE_PX,
            step_minutes: 30,
            max_tiles: DEFAULT_MAX_TILES,
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            allowed_minutes: DEFAULT_ALLOWED_MINUTES.to_vec(),
            source_template: SourceUrlTemplate::default(),
            wms: WmsGetMapParams::default(),
            fetch: FetchSettings::default(),
            interpolation: InterpolationSettings::default(),
            encoder: EncoderSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub max_workers: usize,
    pub retries: u32,
    pub timeout_secs: f64,
    pub retry_delay_secs: f64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            max_workers: 8,
            retries: 2,
            timeout_secs: 20.0,
            retry_delay_secs: 2.0,
        }
    }
}

impl FetchSettings {
    pub fn to_fetch_config(&self) -> FetchConfig {
        FetchConfig {
            max_workers: self.max_workers.max(1),
            retries: self.retries,
            timeout: Duration::from_secs_f64(self.timeout_secs.max(0.0)),
            retry_delay: Duration::from_secs_f64(self.retry_delay_secs.max(0.0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationSettings {
    /// Interpreter that runs the script
    pub python_path: PathBuf,
    pub script: PathBuf,
    pub model_dir: PathBuf,
    /// Frames per pair are `2^exponent`
    pub exponent: u32,
}

impl Default for InterpolationSettings {
    fn default() -> Self {
        Self {
            python_path: PathBuf::from("python"),
            script: PathBuf::from("Practical-RIFE/inference_img_preserve.py"),
            model_dir: PathBuf::from("Practical-RIFE/train_log"),
            exponent: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    pub ffmpeg_path: PathBuf,
    pub frame_rate: u32,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            frame_rate: 30,
        }
    }
}

impl ServiceConfig {
    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        info!(path = %path.display(), "Loaded service config");
        Ok(config)
    }

    /// Apply environment-style overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SESSIONS_ROOT") {
            self.sessions_root = PathBuf::from(v);
        }
        if let Some(v) = lookup("FFMPEG_PATH") {
            self.encoder.ffmpeg_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("PYTHON_PATH") {
            self.interpolation.python_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("RIFE_SCRIPT") {
            self.interpolation.script = PathBuf::from(v);
        }
        if let Some(v) = lookup("RIFE_MODEL_DIR") {
            self.interpolation.model_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("TILE_SOURCE_TEMPLATE") {
            self.source_template = SourceUrlTemplate::new(v);
        }
        if let Some(v) = lookup("MAX_TILE_WORKERS") {
            self.fetch.max_workers = v
                .parse()
                .with_context(|| format!("MAX_TILE_WORKERS must be an integer, got '{}'", v))?;
        }
        Ok(())
    }
}
