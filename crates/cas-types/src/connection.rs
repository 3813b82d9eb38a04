//! Connection registry records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of one registered keepalive connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub session_id: String,
    /// Registry-wide counter stamped at registration; a reconnect under the
    /// same session id always gets a larger value.
    pub generation: u64,
    pub connected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionListResponse {
    pub connections: Vec<ConnectionInfo>,
    pub count: usize,
}
