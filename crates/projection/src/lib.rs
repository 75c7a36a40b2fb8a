//! Coordinate reference system transformations.
//!
//! Only the fixed geographic (EPSG:4326) to spherical Web Mercator
//! (EPSG:3857) pair used by the tile service is implemented.

pub mod mercator;

pub use mercator::WebMercator;
