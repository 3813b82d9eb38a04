//! Keepalive WebSocket upgrade.

use crate::state::AppState;
use crate::websocket::hold_connection;
use axum::{
    extract::{Path, State, ws::WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;

pub async fn upgrade(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| hold_connection(socket, state, session_id))
}
