//! Common test fixtures for mosaic tests.

/// Geographic bounding boxes as (min_lon, min_lat, max_lon, max_lat).
pub mod bbox {
    /// Indian subcontinent, the usual request region
    pub const INDIA: (f64, f64, f64, f64) = (68.0, 6.0, 98.0, 36.0);

    /// A small region around Delhi
    pub const DELHI: (f64, f64, f64, f64) = (76.8, 28.4, 77.4, 28.9);

    /// Invalid bbox (min > max)
    pub const INVALID: (f64, f64, f64, f64) = (10.0, 10.0, 5.0, 5.0);

    /// Latitude beyond the Web Mercator limit
    pub const POLAR: (f64, f64, f64, f64) = (0.0, 80.0, 10.0, 89.5);
}

/// Request times in the tile service's local time.
pub mod time {
    /// Morning start on a :15 mark
    pub const START: &str = "2024-01-15 09:15";

    /// End two steps later on a :15 mark
    pub const END: &str = "2024-01-15 10:15";

    /// Not on a :15/:45 boundary
    pub const OFF_MARK: &str = "2024-01-15 09:20";
}

/// Distinct RGBA colours for identifying tiles in composed images.
pub mod colors {
    pub const RED: [u8; 4] = [255, 0, 0, 255];
    pub const GREEN: [u8; 4] = [0, 255, 0, 255];
    pub const BLUE: [u8; 4] = [0, 0, 255, 255];
    pub const WHITE: [u8; 4] = [255, 255, 255, 255];
    pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];
}
