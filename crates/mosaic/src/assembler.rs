use image::{imageops, RgbaImage};
use tracing::{debug, warn};

use mosaic_common::tile::DEFAULT_TILE_SIZE_PX;
use mosaic_common::{FrameTime, TileGrid};
use tile_fetcher::TileImage;

use crate::frame::MosaicFrame;
use crate::world_file::WorldFile;

/// Composites tiles onto a transparent canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicAssembler {
    pub tile_size_px: u32,
}

impl Default for MosaicAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SIZE_PX)
    }
}

impl MosaicAssembler {
    pub fn new(tile_size_px: u32) -> Self {
        Self { tile_size_px }
    }

    /// Pixel offset of the top-left corner of cell `(col, row)`.
    pub fn tile_offset(&self, col: u32, row: u32, rows: u32) -> (u32, u32) {
        (col * self.tile_size_px, (rows - 1 - row) * self.tile_size_px)
    }

    /// Compose a `cols*px` by `rows*px` image. Missing cells stay transparent.
    pub fn assemble(&self, cols: u32, rows: u32, tiles: &[TileImage]) -> RgbaImage {
        let mut canvas = RgbaImage::new(cols * self.tile_size_px, rows * self.tile_size_px);

        for tile in tiles {
            if tile.col >= cols || tile.row >= rows {
                warn!(
                    col = tile.col,
                    row = tile.row,
                    cols,
                    rows,
                    "Tile outside grid, skipping"
                );
                continue;
            }

            let (x, y) = self.tile_offset(tile.col, tile.row, rows);
            imageops::replace(&mut canvas, &tile.image, i64::from(x), i64::from(y));
        }

        debug!(
            placed = tiles.len(),
            width = canvas.width(),
            height = canvas.height(),
            "Mosaic assembled"
        );
        canvas
    }

    /// Assemble a grid's tiles into a labelled, georeferenced frame.
    pub fn assemble_frame(&self, time: FrameTime, grid: &TileGrid, tiles: &[TileImage]) -> MosaicFrame {
        MosaicFrame {
            time,
            image: self.assemble(grid.cols, grid.rows, tiles),
            world_file: WorldFile::for_grid(grid, self.tile_size_px),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_offset_flips_rows() {
        let assembler = MosaicAssembler::new(256);
        assert_eq!(assembler.tile_offset(0, 0, 3), (0, 512));
        assert_eq!(assembler.tile_offset(2, 2, 3), (512, 0));
    }

    #[test]
    fn test_empty_grid_is_transparent() {
        let image = MosaicAssembler::new(16).assemble(2, 3, &[]);
        assert_eq!(image.dimensions(), (32, 48));
        assert!(image.pixels().all(|p| p.0[3] == 0));
    }
}
