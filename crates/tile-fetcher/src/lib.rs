//! Tile retrieval from the WMS tile source.
//!
//! - [`wms`]: fixed GetMap query parameters
//! - [`source`]: URL templating and the [`TileSource`] seam over HTTP
//! - [`fetcher`]: bounded concurrent fetch with per-attempt timeout and retry
//! - [`archive`]: raw tile archival to a dated directory tree

pub mod archive;
pub mod error;
pub mod fetcher;
pub mod source;
pub mod wms;

pub use archive::{ArchiveFetcher, ArchiveJob, ArchiveReport, FULL_DISK_BBOX};
pub use error::{TileFailure, TileFetchError};
pub use fetcher::{FetchConfig, FetchReport, TileFetcher, TileImage};
pub use source::{HttpTileSource, SourceUrlTemplate, TileSource, DEFAULT_SOURCE_TEMPLATE};
pub use wms::WmsGetMapParams;
