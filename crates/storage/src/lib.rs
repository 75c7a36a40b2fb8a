//! Session storage for the mosaic services.
//!
//! Every mosaic-generation request gets its own disposable directory under a
//! common root. The video step later resolves the same directory by session
//! id. Directories survive normal completion and are removed on explicit
//! cleanup or at process shutdown.

pub mod layout;
pub mod session;

pub use layout::{FrameFile, SessionLayout};
pub use session::{Session, SessionId, SessionManager};
