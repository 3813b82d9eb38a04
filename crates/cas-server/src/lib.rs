//! CAS gateway server library: HTTP routes, the keepalive WebSocket and
//! application state, kept apart from main.rs for integration testing.

pub mod config;
pub mod logging;
pub mod routes;
pub mod state;
pub mod websocket;
