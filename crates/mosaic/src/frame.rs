use std::path::Path;

use image::RgbaImage;
use tracing::debug;

use mosaic_common::{FrameTime, MosaicError, MosaicResult};

use crate::world_file::WorldFile;

/// One composed raster for one requested timestamp.
#[derive(Debug, Clone)]
pub struct MosaicFrame {
    pub time: FrameTime,
    pub image: RgbaImage,
    pub world_file: WorldFile,
}

impl MosaicFrame {
    /// Write the PNG and its `.pgw` sidecar.
    ///
    /// Blocking; async callers should run this on a blocking thread.
    pub fn save(&self, path: &Path) -> MosaicResult<()> {
        self.image
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| MosaicError::Image(format!("{}: {}", path.display(), e)))?;

        let sidecar = WorldFile::sidecar_path(path);
        std::fs::write(&sidecar, self.world_file.to_string())?;

        debug!(
            time = %self.time,
            path = %path.display(),
            width = self.image.width(),
            height = self.image.height(),
            "Frame saved"
        );
        Ok(())
    }
}
