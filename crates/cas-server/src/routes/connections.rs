//! Registry inspection.

use crate::state::AppState;
use axum::{Json, extract::State};
use cas_types::ConnectionListResponse;
use std::sync::Arc;

pub async fn list(State(state): State<Arc<AppState>>) -> Json<ConnectionListResponse> {
    let connections = state.connections.list();
    Json(ConnectionListResponse {
        count: connections.len(),
        connections,
    })
}
