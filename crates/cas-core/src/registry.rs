//! Registry of live keepalive connections, keyed by session id.

use cas_types::ConnectionInfo;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::oneshot;
use tracing::{debug, info};

struct ConnectionEntry {
    info: ConnectionInfo,
    evict_tx: oneshot::Sender<()>,
}

/// Handed to a connection when it registers.
pub struct Registration {
    pub info: ConnectionInfo,
    /// Resolves when a newer connection takes over the same session id.
    pub evicted: oneshot::Receiver<()>,
}

/// At most one live entry per session id. A second registration under the
/// same id replaces the first and signals its eviction.
pub struct ConnectionRegistry {
    connections: DashMap<String, ConnectionEntry>,
    next_generation: AtomicU64,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            next_generation: AtomicU64::new(1),
        }
    }

    pub fn register(&self, session_id: &str) -> Registration {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let info = ConnectionInfo {
            session_id: session_id.to_string(),
            generation,
            connected_at: Utc::now(),
        };
        let (evict_tx, evicted) = oneshot::channel();
        let entry = ConnectionEntry {
            info: info.clone(),
            evict_tx,
        };

        if let Some(previous) = self.connections.insert(session_id.to_string(), entry) {
            info!(
                target: "cas::registry",
                "Session {} reconnected, superseding generation {}",
                session_id, previous.info.generation
            );
            // the old connection may already be gone
            let _ = previous.evict_tx.send(());
        } else {
            info!(target: "cas::registry", "Session {} registered", session_id);
        }

        Registration { info, evicted }
    }

    /// Remove the entry for `session_id` only if it still belongs to
    /// `generation`. Returns whether anything was removed.
    pub fn unregister(&self, session_id: &str, generation: u64) -> bool {
        let removed = self
            .connections
            .remove_if(session_id, |_, entry| entry.info.generation == generation)
            .is_some();
        if removed {
            debug!(target: "cas::registry", "Session {} unregistered", session_id);
        } else {
            debug!(
                target: "cas::registry",
                "Session {} generation {} already superseded",
                session_id, generation
            );
        }
        removed
    }

    pub fn lookup(&self, session_id: &str) -> Option<ConnectionInfo> {
        self.connections
            .get(session_id)
            .map(|entry| entry.info.clone())
    }

    /// All live connections ordered by session id.
    pub fn list(&self) -> Vec<ConnectionInfo> {
        let mut all: Vec<ConnectionInfo> = self
            .connections
            .iter()
            .map(|entry| entry.info.clone())
            .collect();
        all.sort_by(|a, b| a.session_id.cmp(&b.session_id));
        all
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
