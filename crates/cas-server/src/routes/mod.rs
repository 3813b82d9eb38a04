//! HTTP route handlers.

pub mod algebra;
pub mod connections;
pub mod ws;

use crate::config::Config;
use crate::state::AppState;
use axum::{
    Json, Router,
    http::HeaderValue,
    routing::{get, post},
};
use cas_types::WelcomeResponse;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

pub const WELCOME_MESSAGE: &str = "CAS gateway is running";

/// All routes, without the tracing layer.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .route("/simplify", post(algebra::simplify))
        .route("/solve-system", post(algebra::solve_system))
        .route("/evaluate", post(algebra::evaluate))
        .route("/v2/simplify", post(algebra::simplify_v2))
        .route("/v2/solve-system", post(algebra::solve_system_v2))
        .route("/v2/evaluate", post(algebra::evaluate_v2))
        .route("/connections", get(connections::list))
        .route("/connect/{session_id}", get(ws::upgrade))
        .layer(cors)
        .with_state(state)
}

pub fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(target: "cas::startup", "Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

pub async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: WELCOME_MESSAGE.to_string(),
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
