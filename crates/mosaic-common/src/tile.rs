//! Zoom-dependent tile grid planning.
//!
//! The tile service is queried with arbitrary planar BBOX values, so the grid
//! is anchored on multiples of the tile extent rather than on a fixed tile
//! matrix origin. Column and row indices are relative to the snapped grid
//! origin (the south-west corner); rows increase northward.

use serde::{Deserialize, Serialize};

use crate::error::{MosaicError, MosaicResult};
use crate::PlanarBoundingBox;

/// Tile edge length in pixels requested from the tile service.
pub const DEFAULT_TILE_SIZE_PX: u32 = 256;

/// Meters per pixel at zoom 0.
pub const BASE_RESOLUTION: f64 = 156543.03;

/// Highest supported zoom level.
pub const MAX_ZOOM: u8 = 22;

/// Default fan-out cap for a single mosaic request.
pub const DEFAULT_MAX_TILES: usize = 400;

/// Default cap for one archival run. Full disk at zoom 9 is about 290k tiles.
pub const DEFAULT_ARCHIVE_MAX_TILES: usize = 1_000_000;

/// Relative tolerance for treating a coordinate as lying on a grid line.
const GRID_EPSILON: f64 = 1e-9;

/// A validated zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoomLevel(u8);

impl ZoomLevel {
    pub fn new(zoom: u32) -> MosaicResult<Self> {
        if zoom > MAX_ZOOM as u32 {
            return Err(MosaicError::invalid(format!(
                "zoom {} outside 0..={}",
                zoom, MAX_ZOOM
            )));
        }
        Ok(Self(zoom as u8))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Ground resolution in meters per pixel.
    pub fn meters_per_pixel(&self) -> f64 {
        BASE_RESOLUTION / f64::from(1u32 << self.0)
    }

    /// Side length of one tile in planar meters.
    pub fn tile_extent(&self, tile_size_px: u32) -> f64 {
        self.meters_per_pixel() * f64::from(tile_size_px)
    }
}

/// How the requested bbox is snapped onto the tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapMode {
    /// Floor the minimum corner; counts are `ceil((max - origin) / extent)`.
    /// Used by mosaic generation.
    #[default]
    FloorOrigin,
    /// Floor the minimum corner and ceil the maximum corner independently.
    /// Used by archival fetches.
    Symmetric,
}

/// One cell of a planned grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileGridCell {
    pub col: u32,
    pub row: u32,
    pub bbox: PlanarBoundingBox,
}

/// The result of planning a bbox at a zoom level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    pub origin_x: f64,
    pub origin_y: f64,
    pub tile_extent: f64,
    pub cols: u32,
    pub rows: u32,
    pub cells: Vec<TileGridCell>,
}

impl TileGrid {
    pub fn tile_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Planar extent covered by the whole grid.
    pub fn bounds(&self) -> PlanarBoundingBox {
        PlanarBoundingBox::new(
            self.origin_x,
            self.origin_y,
            self.origin_x + f64::from(self.cols) * self.tile_extent,
            self.origin_y + f64::from(self.rows) * self.tile_extent,
        )
    }
}

/// Grid placement before cells are materialised.
#[derive(Debug, Clone, Copy)]
struct GridLayout {
    min_ix: i64,
    min_iy: i64,
    cols: i64,
    rows: i64,
}

/// Snaps planar bboxes onto a zoom-dependent tile grid and enumerates cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileGridPlanner {
    pub tile_size_px: u32,
    pub max_tiles: Option<usize>,
    pub snap_mode: SnapMode,
}

impl Default for TileGridPlanner {
    fn default() -> Self {
        Self::mosaic()
    }
}

impl TileGridPlanner {
    /// Planner for mosaic generation: floor-origin snapping with the 400 tile cap.
    pub fn mosaic() -> Self {
        Self {
            tile_size_px: DEFAULT_TILE_SIZE_PX,
            max_tiles: Some(DEFAULT_MAX_TILES),
            snap_mode: SnapMode::FloorOrigin,
        }
    }

    /// Planner for archival fetches: symmetric snapping, large cap.
    pub fn archival() -> Self {
        Self {
            tile_size_px: DEFAULT_TILE_SIZE_PX,
            max_tiles: Some(DEFAULT_ARCHIVE_MAX_TILES),
            snap_mode: SnapMode::Symmetric,
        }
    }

    pub fn with_max_tiles(mut self, max_tiles: Option<usize>) -> Self {
        self.max_tiles = max_tiles;
        self
    }

    pub fn with_tile_size(mut self, tile_size_px: u32) -> Self {
        self.tile_size_px = tile_size_px;
        self
    }

    /// Snap a bbox to the grid without enumerating cells or applying the cap.
    pub fn snap(&self, bbox: &PlanarBoundingBox, zoom: ZoomLevel) -> MosaicResult<PlanarBoundingBox> {
        let extent = zoom.tile_extent(self.tile_size_px);
        let layout = self.layout(bbox, extent)?;

        Ok(PlanarBoundingBox::new(
            layout.min_ix as f64 * extent,
            layout.min_iy as f64 * extent,
            layout.min_ix as f64 * extent + layout.cols as f64 * extent,
            layout.min_iy as f64 * extent + layout.rows as f64 * extent,
        ))
    }

    /// Plan the grid covering `bbox` at `zoom`.
    ///
    /// Fails with `TooManyTiles` before any cell is built when the grid
    /// exceeds `max_tiles`.
    pub fn plan(&self, bbox: &PlanarBoundingBox, zoom: ZoomLevel) -> MosaicResult<TileGrid> {
        let extent = zoom.tile_extent(self.tile_size_px);
        let layout = self.layout(bbox, extent)?;

        let requested = layout
            .cols
            .checked_mul(layout.rows)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(usize::MAX);

        if let Some(limit) = self.max_tiles {
            if requested > limit {
                return Err(MosaicError::TooManyTiles { requested, limit });
            }
        }

        let cols = u32::try_from(layout.cols)
            .map_err(|_| MosaicError::invalid("tile grid has too many columns"))?;
        let rows = u32::try_from(layout.rows)
            .map_err(|_| MosaicError::invalid("tile grid has too many rows"))?;

        let origin_x = layout.min_ix as f64 * extent;
        let origin_y = layout.min_iy as f64 * extent;

        let mut cells = Vec::with_capacity(requested);
        for row in 0..rows {
            for col in 0..cols {
                let x0 = origin_x + f64::from(col) * extent;
                let y0 = origin_y + f64::from(row) * extent;
                cells.push(TileGridCell {
                    col,
                    row,
                    bbox: PlanarBoundingBox::new(x0, y0, x0 + extent, y0 + extent),
                });
            }
        }

        Ok(TileGrid {
            origin_x,
            origin_y,
            tile_extent: extent,
            cols,
            rows,
            cells,
        })
    }

    fn layout(&self, bbox: &PlanarBoundingBox, extent: f64) -> MosaicResult<GridLayout> {
        if !(bbox.min_x < bbox.max_x && bbox.min_y < bbox.max_y) {
            return Err(MosaicError::invalid("planar bbox is empty or inverted"));
        }
        if self.tile_size_px == 0 {
            return Err(MosaicError::invalid("tile size must be positive"));
        }

        let min_ix = grid_index_floor(bbox.min_x, extent);
        let min_iy = grid_index_floor(bbox.min_y, extent);

        let (cols, rows) = match self.snap_mode {
            SnapMode::FloorOrigin => {
                let origin_x = min_ix as f64 * extent;
                let origin_y = min_iy as f64 * extent;
                (
                    grid_index_ceil(bbox.max_x - origin_x, extent),
                    grid_index_ceil(bbox.max_y - origin_y, extent),
                )
            }
            SnapMode::Symmetric => (
                grid_index_ceil(bbox.max_x, extent) - min_ix,
                grid_index_ceil(bbox.max_y, extent) - min_iy,
            ),
        };

        Ok(GridLayout {
            min_ix,
            min_iy,
            cols: cols.max(1),
            rows: rows.max(1),
        })
    }
}

/// `floor(value / extent)`, treating values within rounding noise of a grid
/// line as lying on it.
fn grid_index_floor(value: f64, extent: f64) -> i64 {
    let q = value / extent;
    let nearest = q.round();
    if (q - nearest).abs() <= GRID_EPSILON * nearest.abs().max(1.0) {
        nearest as i64
    } else {
        q.floor() as i64
    }
}

/// `ceil(value / extent)` with the same grid-line tolerance.
fn grid_index_ceil(value: f64, extent: f64) -> i64 {
    let q = value / extent;
    let nearest = q.round();
    if (q - nearest).abs() <= GRID_EPSILON * nearest.abs().max(1.0) {
        nearest as i64
    } else {
        q.ceil() as i64
    }
}
