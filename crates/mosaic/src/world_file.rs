//! ESRI world files (`.pgw`) for georeferencing saved frames.

use std::fmt;
use std::path::{Path, PathBuf};

use mosaic_common::TileGrid;

/// Six-line affine transform from pixel to planar coordinates.
///
/// The translation terms refer to the centre of the upper-left pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldFile {
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub upper_left_x: f64,
    pub upper_left_y: f64,
}

impl WorldFile {
    pub fn for_grid(grid: &TileGrid, tile_size_px: u32) -> Self {
        let pixel = grid.tile_extent / f64::from(tile_size_px);
        let bounds = grid.bounds();

        Self {
            pixel_width: pixel,
            pixel_height: pixel,
            upper_left_x: bounds.min_x + pixel / 2.0,
            upper_left_y: bounds.max_y - pixel / 2.0,
        }
    }

    /// `frame_0915.png` -> `frame_0915.pgw`
    pub fn sidecar_path(image_path: &Path) -> PathBuf {
        image_path.with_extension("pgw")
    }
}

impl fmt::Display for WorldFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.pixel_width)?;
        writeln!(f, "0")?;
        writeln!(f, "0")?;
        writeln!(f, "{}", -self.pixel_height)?;
        writeln!(f, "{}", self.upper_left_x)?;
        writeln!(f, "{}", self.upper_left_y)
    }
}
