//! Session identifiers and the process-wide session registry.

use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use mosaic_common::{MosaicError, MosaicResult};

use crate::layout::SessionLayout;

const SESSION_PREFIX: &str = "session_";
const SESSION_HEX_LEN: usize = 8;
const MAX_CREATE_ATTEMPTS: usize = 8;

/// `session_` followed by eight lowercase hex digits.
///
/// Ids double as directory names, so anything else is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(format!("{}{}", SESSION_PREFIX, &hex[..SESSION_HEX_LEN]))
    }

    /// Validate an id supplied by a caller.
    pub fn parse(s: &str) -> MosaicResult<Self> {
        let valid = s
            .strip_prefix(SESSION_PREFIX)
            .map(|hex| {
                hex.len() == SESSION_HEX_LEN
                    && hex.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
            })
            .unwrap_or(false);

        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(MosaicError::SessionNotFound(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SessionId {
    type Error = MosaicError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

/// A resolved session: its id and its directory layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub layout: SessionLayout,
}

impl Session {
    pub fn dir(&self) -> &Path {
        self.layout.root()
    }
}

/// Creates, resolves and removes session directories under one root.
///
/// Shared across request handlers behind an `Arc`; the registry of created
/// directories is what [`destroy_all`](Self::destroy_all) drains at shutdown.
pub struct SessionManager {
    root: PathBuf,
    sessions: RwLock<HashMap<SessionId, PathBuf>>,
}

impl SessionManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a fresh, exclusively owned session directory.
    pub async fn create(&self) -> MosaicResult<Session> {
        tokio::fs::create_dir_all(&self.root).await?;

        for _ in 0..MAX_CREATE_ATTEMPTS {
            let id = SessionId::generate();
            let dir = self.root.join(id.as_str());

            // create_dir fails on an existing path, which claims the id atomically
            match tokio::fs::create_dir(&dir).await {
                Ok(()) => {
                    self.sessions.write().await.insert(id.clone(), dir.clone());
                    info!(session_id = %id, dir = %dir.display(), "Session created");
                    return Ok(Session {
                        id,
                        layout: SessionLayout::new(dir),
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(MosaicError::Internal(
            "could not allocate a unique session id".to_string(),
        ))
    }

    /// Look up a session by id; its directory must exist.
    pub async fn resolve(&self, id: &str) -> MosaicResult<Session> {
        let id = SessionId::parse(id)?;
        let dir = self.root.join(id.as_str());

        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(Session {
                id,
                layout: SessionLayout::new(dir),
            }),
            _ => Err(MosaicError::SessionNotFound(id.to_string())),
        }
    }

    /// Remove one session directory.
    pub async fn destroy(&self, id: &str) -> MosaicResult<()> {
        let session = self.resolve(id).await?;
        self.sessions.write().await.remove(&session.id);
        tokio::fs::remove_dir_all(session.dir()).await?;
        info!(session_id = %session.id, "Session destroyed");
        Ok(())
    }

    /// Best-effort removal of every session created by this manager.
    ///
    /// Returns the number of directories removed.
    pub async fn destroy_all(&self) -> usize {
        let drained: Vec<(SessionId, PathBuf)> = self.sessions.write().await.drain().collect();
        let mut removed = 0;

        for (id, dir) in drained {
            match tokio::fs::remove_dir_all(&dir).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(session_id = %id, dir = %dir.display(), error = %e, "Failed to remove session")
                }
            }
        }

        info!(removed, "Session cleanup complete");
        removed
    }

    pub async fn tracked_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
