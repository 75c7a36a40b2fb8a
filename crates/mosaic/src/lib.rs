//! Mosaic frame assembly.
//!
//! Tiles are placed by their own grid position, never by arrival order.
//! Grid rows grow northward while image rows grow downward, so row `r` of an
//! `n`-row grid lands at image row `n - 1 - r`.

pub mod assembler;
pub mod frame;
pub mod world_file;

pub use assembler::MosaicAssembler;
pub use frame::MosaicFrame;
pub use world_file::WorldFile;
