//! ffmpeg encoding of a renumbered frame sequence.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::instrument;

use mosaic_common::{MosaicError, MosaicResult};

use crate::tool::{ExternalTool, ProcessError};

pub const DEFAULT_FRAME_RATE: u32 = 30;

#[derive(Clone)]
pub struct FfmpegEncoder {
    tool: Arc<dyn ExternalTool>,
    frame_rate: u32,
}

impl FfmpegEncoder {
    pub fn new(tool: Arc<dyn ExternalTool>) -> Self {
        Self {
            tool,
            frame_rate: DEFAULT_FRAME_RATE,
        }
    }

    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn args(&self, output_name: &str) -> Vec<String> {
        let frame_rate = self.frame_rate.to_string();
        [
            "-y",
            "-framerate",
            frame_rate.as_str(),
            "-i",
            "%d.png",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            output_name,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Encode `frames_dir/0.png..` into `frames_dir/<output_name>`.
    #[instrument(skip(self), fields(frame_rate = self.frame_rate))]
    pub async fn encode(&self, frames_dir: &Path, output_name: &str) -> MosaicResult<PathBuf> {
        self.tool
            .run(&self.args(output_name), frames_dir)
            .await
            .map_err(|e| match e {
                ProcessError::NotFound(program) => MosaicError::EncodingFailed(format!(
                    "{} not found; set FFMPEG_PATH to the ffmpeg executable",
                    program
                )),
                other => MosaicError::EncodingFailed(other.to_string()),
            })?;

        let output = frames_dir.join(output_name);
        if !tokio::fs::try_exists(&output).await? {
            return Err(MosaicError::EncodingFailed(format!(
                "encoder did not produce {}",
                output_name
            )));
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::CommandTool;

    #[test]
    fn test_args() {
        let encoder = FfmpegEncoder::new(Arc::new(CommandTool::new("ffmpeg")));
        assert_eq!(
            encoder.args("out.mp4").join(" "),
            "-y -framerate 30 -i %d.png -c:v libx264 -pix_fmt yuv420p out.mp4"
        );
    }
}
