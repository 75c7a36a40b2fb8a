//! Coordinate Reference System codes.
//!
//! Only the single source/target pair used by the tile service is supported:
//! geographic WGS84 input and spherical Web Mercator tiles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Web Mercator half-extent in meters (at ±85.0511° latitude).
pub const WEB_MERCATOR_MAX_EXTENT: f64 = 20037508.342789244;

/// Well-known CRS codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic (lon/lat in degrees)
    Epsg4326,
    /// Web Mercator (meters)
    Epsg3857,
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            CrsCode::Epsg4326 => "EPSG:4326",
            CrsCode::Epsg3857 => "EPSG:3857",
        };
        write!(f, "{}", code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(CrsCode::Epsg4326.to_string(), "EPSG:4326");
        assert_eq!(CrsCode::Epsg3857.to_string(), "EPSG:3857");
    }
}
