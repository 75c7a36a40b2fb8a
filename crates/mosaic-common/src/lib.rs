//! Common types and utilities shared across the satellite mosaic services.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod tile;
pub mod time;

pub use bbox::{GeoBoundingBox, PlanarBoundingBox};
pub use crs::CrsCode;
pub use error::{MosaicError, MosaicResult};
pub use tile::{SnapMode, TileGrid, TileGridCell, TileGridPlanner, ZoomLevel};
pub use time::{FrameTime, RequestWindow, SourceTime};
