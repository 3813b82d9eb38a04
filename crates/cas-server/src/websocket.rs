//! Keepalive connection handling.
//!
//! A connection registers under its session id and is then held open on a
//! fixed tick. Nothing is sent to the client; inbound frames are read only
//! to notice when the peer goes away.

use crate::state::AppState;
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disconnect {
    PeerClosed,
    NetworkError,
    Superseded,
}

impl fmt::Display for Disconnect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Disconnect::PeerClosed => "closed by peer",
            Disconnect::NetworkError => "network error",
            Disconnect::Superseded => "superseded by a newer connection",
        };
        f.write_str(reason)
    }
}

pub async fn hold_connection(socket: WebSocket, state: Arc<AppState>, session_id: String) {
    let registration = state.connections.register(&session_id);
    let generation = registration.info.generation;
    let mut evicted = registration.evicted;

    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut ticker = tokio::time::interval(state.config.keepalive_interval());

    let reason = loop {
        tokio::select! {
            _ = ticker.tick() => {
                trace!(target: "cas::ws::keepalive", "Session {} idle", session_id);
            }
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Close(_))) | None => break Disconnect::PeerClosed,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(target: "cas::ws", "Session {} receive error: {}", session_id, e);
                    break Disconnect::NetworkError;
                }
            },
            _ = &mut evicted => break Disconnect::Superseded,
        }
    };

    state.connections.unregister(&session_id, generation);
    info!(target: "cas::ws", "Frontend {} disconnected ({})", session_id, reason);

    // the peer may already be gone
    let _ = ws_tx.send(Message::Close(None)).await;
    let _ = ws_tx.close().await;
}
