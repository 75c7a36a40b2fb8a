//! RIFE frame interpolation between two mosaic frames.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use mosaic_common::{MosaicError, MosaicResult};

use crate::tool::{absolute_path, ExternalTool};

/// Subdirectory of the scratch dir the model writes into.
pub const OUTPUT_SUBDIR: &str = "output";

pub const DEFAULT_EXPONENT: u32 = 5;

/// Largest accepted exponent (1024 frames per pair).
pub const MAX_EXPONENT: u32 = 10;

/// Drives the interpolation script over a staged `0.png`/`1.png` pair.
#[derive(Clone)]
pub struct RifeInterpolator {
    tool: Arc<dyn ExternalTool>,
    script: PathBuf,
    model_dir: PathBuf,
    exponent: u32,
}

impl RifeInterpolator {
    /// `tool` is the interpreter that runs `script`.
    ///
    /// The tool runs inside the scratch dir, so relative `script` and
    /// `model_dir` are resolved against the current directory here.
    pub fn new(tool: Arc<dyn ExternalTool>, script: impl Into<PathBuf>, model_dir: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            script: absolute_path(script.into()),
            model_dir: absolute_path(model_dir.into()),
            exponent: DEFAULT_EXPONENT,
        }
    }

    pub fn with_exponent(mut self, exponent: u32) -> MosaicResult<Self> {
        if !(1..=MAX_EXPONENT).contains(&exponent) {
            return Err(MosaicError::invalid(format!(
                "interpolation exponent {} outside [1, {}]",
                exponent, MAX_EXPONENT
            )));
        }
        self.exponent = exponent;
        Ok(self)
    }

    /// Frames produced per pair: `2^exponent`.
    pub fn output_count(&self) -> u32 {
        1 << self.exponent
    }

    pub fn args(&self) -> Vec<String> {
        vec![
            self.script.display().to_string(),
            "--img".to_string(),
            "0.png".to_string(),
            "1.png".to_string(),
            "--exp".to_string(),
            self.exponent.to_string(),
            "--model".to_string(),
            self.model_dir.display().to_string(),
        ]
    }

    /// Interpolate between `first` and `second` using `scratch` as the
    /// working directory.
    ///
    /// Returns the output paths in sequence order. Any leftover scratch
    /// content is discarded first.
    #[instrument(skip(self), fields(exponent = self.exponent))]
    pub async fn interpolate(&self, scratch: &Path, first: &Path, second: &Path) -> MosaicResult<Vec<PathBuf>> {
        if tokio::fs::try_exists(scratch).await? {
            tokio::fs::remove_dir_all(scratch).await?;
        }
        tokio::fs::create_dir_all(scratch).await?;
        tokio::fs::copy(first, scratch.join("0.png")).await?;
        tokio::fs::copy(second, scratch.join("1.png")).await?;

        self.tool
            .run(&self.args(), scratch)
            .await
            .map_err(|e| MosaicError::InterpolationFailed(e.to_string()))?;

        let output_dir = scratch.join(OUTPUT_SUBDIR);
        let mut outputs = Vec::with_capacity(self.output_count() as usize);
        for i in 0..self.output_count() {
            let path = output_dir.join(format!("{}.png", i));
            if !tokio::fs::try_exists(&path).await? {
                return Err(MosaicError::InterpolationFailed(format!(
                    "interpolator did not produce {}/{}.png",
                    OUTPUT_SUBDIR, i
                )));
            }
            outputs.push(path);
        }

        debug!(outputs = outputs.len(), "Pair interpolated");
        Ok(outputs)
    }
}
