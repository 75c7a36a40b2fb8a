//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

use crate::error::{MosaicError, MosaicResult};

/// A geographic bounding box in degrees (EPSG:4326, lon/lat axis order).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl GeoBoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Build from a `[min_lon, min_lat, max_lon, max_lat]` slice and validate it.
    pub fn from_slice(values: &[f64]) -> MosaicResult<Self> {
        let [min_lon, min_lat, max_lon, max_lat] = values else {
            return Err(MosaicError::invalid(format!(
                "bbox must have exactly 4 values, got {}",
                values.len()
            )));
        };

        let bbox = Self::new(*min_lon, *min_lat, *max_lon, *max_lat);
        bbox.validate()?;
        Ok(bbox)
    }

    /// Check coordinate ranges and corner ordering.
    pub fn validate(&self) -> MosaicResult<()> {
        let coords = [self.min_lon, self.min_lat, self.max_lon, self.max_lat];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(MosaicError::invalid("bbox contains a non-finite coordinate"));
        }

        for lon in [self.min_lon, self.max_lon] {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(MosaicError::invalid(format!(
                    "longitude {} outside [-180, 180]",
                    lon
                )));
            }
        }

        for lat in [self.min_lat, self.max_lat] {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(MosaicError::invalid(format!(
                    "latitude {} outside [-90, 90]",
                    lat
                )));
            }
        }

        if self.min_lon >= self.max_lon || self.min_lat >= self.max_lat {
            return Err(MosaicError::invalid(
                "bbox minimum corner must be strictly below the maximum corner",
            ));
        }

        Ok(())
    }
}

/// A bounding box in projected planar coordinates (meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarBoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl PlanarBoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Create a bounding box, rejecting empty or inverted extents.
    pub fn try_new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> MosaicResult<Self> {
        if !(min_x < max_x && min_y < max_y) {
            return Err(MosaicError::invalid(format!(
                "degenerate planar bbox {},{},{},{}",
                min_x, min_y, max_x, max_y
            )));
        }
        Ok(Self::new(min_x, min_y, max_x, max_y))
    }

    /// Format as the comma-joined WMS BBOX value.
    pub fn to_wms_string(&self) -> String {
        format!("{},{},{},{}", self.min_x, self.min_y, self.max_x, self.max_y)
    }

    /// Width of the bounding box in meters.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in meters.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}
