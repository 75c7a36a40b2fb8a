//! Spherical Web Mercator projection (EPSG:3857).
//!
//! Uses the WGS84 semi-major axis as the sphere radius, which is what tile
//! services mean by "Web Mercator". Latitudes are limited to the range where
//! the projected square is bounded.

use std::f64::consts::PI;

use mosaic_common::crs::WEB_MERCATOR_MAX_EXTENT;
use mosaic_common::{GeoBoundingBox, MosaicError, MosaicResult, PlanarBoundingBox};

/// Sphere radius in meters.
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Latitude at which the projected y equals the x half-extent.
pub const MAX_LATITUDE: f64 = 85.05112877980659;

/// Forward and inverse spherical Mercator transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl WebMercator {
    pub fn new() -> Self {
        Self
    }

    /// Project lon/lat degrees to planar meters.
    ///
    /// Latitudes beyond [`MAX_LATITUDE`] are rejected rather than clamped.
    pub fn forward(&self, lon: f64, lat: f64) -> MosaicResult<(f64, f64)> {
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(MosaicError::invalid(format!(
                "longitude {} outside [-180, 180]",
                lon
            )));
        }
        if !lat.is_finite() || lat.abs() > MAX_LATITUDE {
            return Err(MosaicError::invalid(format!(
                "latitude {} outside the Web Mercator range ±{}",
                lat, MAX_LATITUDE
            )));
        }

        let x = EARTH_RADIUS * lon.to_radians();
        let y = EARTH_RADIUS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
        Ok((x, y))
    }

    /// Unproject planar meters back to lon/lat degrees.
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = (x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
        (lon, lat)
    }

    /// Project a validated geographic bbox.
    ///
    /// The transform is monotonic on both axes, so projecting the two corners
    /// is enough.
    pub fn project_bbox(&self, bbox: &GeoBoundingBox) -> MosaicResult<PlanarBoundingBox> {
        bbox.validate()?;

        let (min_x, min_y) = self.forward(bbox.min_lon, bbox.min_lat)?;
        let (max_x, max_y) = self.forward(bbox.max_lon, bbox.max_lat)?;

        PlanarBoundingBox::try_new(min_x, min_y, max_x, max_y)
    }

    /// Convert a planar bbox back to degrees, clamping to the projected square.
    pub fn unproject_bbox(&self, bbox: &PlanarBoundingBox) -> GeoBoundingBox {
        let clamp = |v: f64| v.clamp(-WEB_MERCATOR_MAX_EXTENT, WEB_MERCATOR_MAX_EXTENT);

        let (min_lon, min_lat) = self.inverse(clamp(bbox.min_x), clamp(bbox.min_y));
        let (max_lon, max_lat) = self.inverse(clamp(bbox.max_x), clamp(bbox.max_y));
        GeoBoundingBox::new(min_lon, min_lat, max_lon, max_lat)
    }
}
