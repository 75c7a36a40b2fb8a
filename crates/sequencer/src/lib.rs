//! Temporal densification of mosaic frames into a video.
//!
//! The interpolation model and the encoder are external programs reached
//! through the [`ExternalTool`] seam, so the sequencing logic can run against
//! fakes.

pub mod encoder;
pub mod interpolator;
pub mod orchestrator;
pub mod tool;

pub use encoder::FfmpegEncoder;
pub use interpolator::RifeInterpolator;
pub use orchestrator::{FrameSequenceOrchestrator, SequenceState, VideoArtifact};
pub use tool::{CommandTool, ExternalTool, ProcessError, ToolOutput};
