//! On-disk layout of a session directory.
//!
//! ```text
//! <session>/frame_<HHMM>.png            mosaic frames (+ .pgw sidecars)
//! <session>/tmp_rife/                   per-pair interpolator scratch
//! <session>/interpolated_frames/<HHMM>.png
//! <session>/interpolated_frames/renamed/<n>.png
//! <session>/interpolated_video.mp4
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;

use mosaic_common::{FrameTime, MosaicResult};

pub const FRAME_PREFIX: &str = "frame_";
pub const PNG_EXTENSION: &str = "png";
pub const INTERPOLATED_DIR: &str = "interpolated_frames";
pub const RENAMED_DIR: &str = "renamed";
pub const SCRATCH_DIR: &str = "tmp_rife";
pub const VIDEO_FILE: &str = "interpolated_video.mp4";

/// A labelled PNG found in a session directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FrameFile {
    pub time: FrameTime,
    pub path: PathBuf,
}

/// Paths inside one session directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLayout {
    root: PathBuf,
}

impl SessionLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn frame_path(&self, time: FrameTime) -> PathBuf {
        self.root
            .join(format!("{}{}.{}", FRAME_PREFIX, time, PNG_EXTENSION))
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.root.join(SCRATCH_DIR)
    }

    pub fn interpolated_dir(&self) -> PathBuf {
        self.root.join(INTERPOLATED_DIR)
    }

    pub fn interpolated_frame_path(&self, time: FrameTime) -> PathBuf {
        self.interpolated_dir()
            .join(format!("{}.{}", time, PNG_EXTENSION))
    }

    pub fn renamed_dir(&self) -> PathBuf {
        self.interpolated_dir().join(RENAMED_DIR)
    }

    pub fn video_path(&self) -> PathBuf {
        self.root.join(VIDEO_FILE)
    }

    /// Mosaic frames (`frame_<HHMM>.png`), ascending by time.
    pub async fn list_frames(&self) -> MosaicResult<Vec<FrameFile>> {
        list_labelled(&self.root, FRAME_PREFIX).await
    }

    /// Interpolated frames (`<HHMM>.png`), ascending by time.
    pub async fn list_interpolated(&self) -> MosaicResult<Vec<FrameFile>> {
        list_labelled(&self.interpolated_dir(), "").await
    }
}

/// Parse `<prefix><HHMM>.png`.
pub fn parse_frame_name(name: &str, prefix: &str) -> Option<FrameTime> {
    let label = name
        .strip_prefix(prefix)?
        .strip_suffix(PNG_EXTENSION)?
        .strip_suffix('.')?;
    label.parse().ok()
}

async fn list_labelled(dir: &Path, prefix: &str) -> MosaicResult<Vec<FrameFile>> {
    let mut frames = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        match parse_frame_name(&name, prefix) {
            Some(time) => frames.push(FrameFile {
                time,
                path: entry.path(),
            }),
            None => debug!(file = %name, "Ignoring unlabelled file"),
        }
    }

    frames.sort();
    Ok(frames)
}
