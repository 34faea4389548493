use std::fmt::Display;
use std::sync::Arc;

use tokio::sync::RwLock;

/// Opaque identifier handed out by the server over the socket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionId {
    id: String,
}

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn value(&self) -> &str {
        self.id.as_str()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Shared cell holding the last identifier received from the socket.
///
/// Clones point at the same cell. Writes are last-write-wins and are never
/// validated; readers get whatever value was committed before they acquired
/// the lock.
#[derive(Clone, Default)]
pub struct Session {
    current: Arc<RwLock<Option<SessionId>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn store(&self, id: SessionId) {
        let mut guard = self.current.write().await;
        *guard = Some(id);
    }

    pub async fn current(&self) -> Option<SessionId> {
        self.current.read().await.clone()
    }
}
