//! WMS GetMap query parameters for the tile source.

use serde::{Deserialize, Serialize};

use mosaic_common::tile::DEFAULT_TILE_SIZE_PX;
use mosaic_common::{CrsCode, PlanarBoundingBox};

/// Fixed GetMap parameters; only `BBOX` varies per tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WmsGetMapParams {
    pub version: String,
    pub format: String,
    pub transparent: bool,
    pub layers: String,
    pub styles: String,
    pub color_scale_range: String,
    pub below_min_color: String,
    pub above_max_color: String,
    pub crs: CrsCode,
    pub width: u32,
    pub height: u32,
}

impl Default for WmsGetMapParams {
    fn default() -> Self {
        Self {
            version: "1.3.0".to_string(),
            format: "image/png".to_string(),
            transparent: true,
            layers: "IMG_VIS".to_string(),
            styles: "boxfill/greyscale".to_string(),
            color_scale_range: "0,407".to_string(),
            below_min_color: "extend".to_string(),
            above_max_color: "extend".to_string(),
            crs: CrsCode::Epsg3857,
            width: DEFAULT_TILE_SIZE_PX,
            height: DEFAULT_TILE_SIZE_PX,
        }
    }
}

impl WmsGetMapParams {
    /// Square tiles of the given pixel size.
    pub fn with_tile_size(mut self, tile_size_px: u32) -> Self {
        self.width = tile_size_px;
        self.height = tile_size_px;
        self
    }

    /// Query pairs for one tile request.
    pub fn query_pairs(&self, bbox: &PlanarBoundingBox) -> Vec<(&'static str, String)> {
        vec![
            ("SERVICE", "WMS".to_string()),
            ("VERSION", self.version.clone()),
            ("REQUEST", "GetMap".to_string()),
            ("FORMAT", self.format.clone()),
            ("TRANSPARENT", self.transparent.to_string()),
            ("LAYERS", self.layers.clone()),
            ("STYLES", self.styles.clone()),
            ("COLORSCALERANGE", self.color_scale_range.clone()),
            ("BELOWMINCOLOR", self.below_min_color.clone()),
            ("ABOVEMAXCOLOR", self.above_max_color.clone()),
            ("CRS", self.crs.to_string()),
            ("WIDTH", self.width.to_string()),
            ("HEIGHT", self.height.to_string()),
            ("BBOX", bbox.to_wms_string()),
        ]
    }
}
