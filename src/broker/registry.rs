use std::sync::Arc;

use dashmap::DashMap;

use crate::broker::session::SessionId;
use crate::connection::Connection;

/// The shared table of live sessions.
///
/// Maps a session id to its connection handle. The registry is the only
/// shared mutable resource in the broker: admissions insert, the reaper
/// removes, and every broadcast iterates a snapshot — all concurrently.
/// `DashMap` gives sharded locking, so snapshot reads never serialize
/// behind a table-wide lock and never observe a torn entry.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<SessionId, Arc<dyn Connection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Adds or replaces the entry for `session_id`.
    pub fn insert(&self, session_id: SessionId, conn: Arc<dyn Connection>) {
        self.connections.insert(session_id, conn);
    }

    /// Returns a point-in-time copy of all `(session_id, handle)` pairs.
    ///
    /// Shard locks are held only while the snapshot is collected, never
    /// across the fan-out send phase.
    pub fn snapshot(&self) -> Vec<(SessionId, Arc<dyn Connection>)> {
        self.connections
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Atomically removes `session_id`, reporting whether it existed.
    ///
    /// The `bool` return guards against double-removal races between
    /// concurrent reaper passes.
    pub fn remove_if_present(&self, session_id: &str) -> bool {
        self.connections.remove(session_id).is_some()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.connections.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
