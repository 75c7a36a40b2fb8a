//! Frame sequencing: mosaic frames in, one encoded video out.
//!
//! For each consecutive pair of mosaic frames the interpolator produces a
//! fixed number of frames, relabelled at one-minute cadence from the pair's
//! start time. Labels from later pairs overwrite earlier ones where they
//! overlap. The union is renumbered `0..N-1` and handed to the encoder.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, instrument};

use mosaic_common::{MosaicError, MosaicResult};
use storage::layout::VIDEO_FILE;
use storage::{FrameFile, Session, SessionLayout};

use crate::encoder::FfmpegEncoder;
use crate::interpolator::RifeInterpolator;

/// Minutes between consecutive interpolator outputs.
pub const MINUTES_PER_OUTPUT: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    Planned,
    PairsEnumerated,
    PerPairInterpolated,
    Renumbered,
    Encoded,
}

impl fmt::Display for SequenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SequenceState::Planned => "planned",
            SequenceState::PairsEnumerated => "pairs_enumerated",
            SequenceState::PerPairInterpolated => "per_pair_interpolated",
            SequenceState::Renumbered => "renumbered",
            SequenceState::Encoded => "encoded",
        };
        f.write_str(name)
    }
}

/// The encoded video, owned by its session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoArtifact {
    pub path: PathBuf,
    pub frame_count: usize,
}

#[derive(Clone)]
pub struct FrameSequenceOrchestrator {
    interpolator: RifeInterpolator,
    encoder: FfmpegEncoder,
}

impl FrameSequenceOrchestrator {
    pub fn new(interpolator: RifeInterpolator, encoder: FfmpegEncoder) -> Self {
        Self {
            interpolator,
            encoder,
        }
    }

    /// Interpolate every frame pair of `session` and encode the result.
    ///
    /// Any interpolator or encoder failure aborts the run. Scratch and
    /// renumbering directories are removed whether or not it succeeds.
    #[instrument(skip(self, session), fields(session_id = %session.id))]
    pub async fn run(&self, session: &Session) -> MosaicResult<VideoArtifact> {
        let result = self.run_stages(&session.layout).await;

        remove_dir_if_exists(&session.layout.scratch_dir()).await;
        remove_dir_if_exists(&session.layout.renamed_dir()).await;

        match &result {
            Ok(artifact) => {
                info!(
                    path = %artifact.path.display(),
                    frames = artifact.frame_count,
                    "Video generated"
                );
            }
            Err(e) => error!(error = %e, "Video generation failed"),
        }
        result
    }

    async fn run_stages(&self, layout: &SessionLayout) -> MosaicResult<VideoArtifact> {
        let mut state = SequenceState::Planned;

        let frames = layout.list_frames().await?;
        if frames.len() < 2 {
            return Err(MosaicError::invalid(format!(
                "at least two mosaic frames are needed, found {}",
                frames.len()
            )));
        }
        advance(&mut state, SequenceState::PairsEnumerated, frames.len() - 1);

        let interpolated_dir = layout.interpolated_dir();
        if tokio::fs::try_exists(&interpolated_dir).await? {
            tokio::fs::remove_dir_all(&interpolated_dir).await?;
        }
        tokio::fs::create_dir_all(&interpolated_dir).await?;

        // Strictly in order: each pair reuses the scratch directory
        for pair in frames.windows(2) {
            self.interpolate_pair(layout, &pair[0], &pair[1]).await?;
        }
        let interpolated = layout.list_interpolated().await?;
        advance(&mut state, SequenceState::PerPairInterpolated, interpolated.len());

        let renamed_dir = layout.renamed_dir();
        let frame_count = renumber(&interpolated, &renamed_dir).await?;
        advance(&mut state, SequenceState::Renumbered, frame_count);

        let encoded = self.encoder.encode(&renamed_dir, VIDEO_FILE).await?;
        let video_path = layout.video_path();
        tokio::fs::rename(&encoded, &video_path).await?;
        advance(&mut state, SequenceState::Encoded, frame_count);

        Ok(VideoArtifact {
            path: video_path,
            frame_count,
        })
    }

    async fn interpolate_pair(&self, layout: &SessionLayout, first: &FrameFile, second: &FrameFile) -> MosaicResult<()> {
        let scratch = layout.scratch_dir();
        let outputs = self
            .interpolator
            .interpolate(&scratch, &first.path, &second.path)
            .await?;

        for (i, output) in (0u32..).zip(&outputs) {
            let time = first.time.add_minutes(i * MINUTES_PER_OUTPUT);
            tokio::fs::rename(output, layout.interpolated_frame_path(time)).await?;
        }

        tokio::fs::remove_dir_all(&scratch).await?;
        info!(
            from = %first.time,
            to = %second.time,
            outputs = outputs.len(),
            "Frame pair interpolated"
        );
        Ok(())
    }
}

/// Copy `frames` (already in time order) to `dir/0.png .. dir/N-1.png`.
pub async fn renumber(frames: &[FrameFile], dir: &Path) -> MosaicResult<usize> {
    if tokio::fs::try_exists(dir).await? {
        tokio::fs::remove_dir_all(dir).await?;
    }
    tokio::fs::create_dir_all(dir).await?;

    for (i, frame) in frames.iter().enumerate() {
        tokio::fs::copy(&frame.path, dir.join(format!("{}.png", i))).await?;
    }
    Ok(frames.len())
}

fn advance(state: &mut SequenceState, next: SequenceState, items: usize) {
    info!(from = %state, to = %next, items, "Sequence state transition");
    *state = next;
}

async fn remove_dir_if_exists(dir: &Path) {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => error!(dir = %dir.display(), error = %e, "Failed to remove scratch directory"),
    }
}
