//! Shared helpers for the server integration tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use cas_core::{AlgebraEngine, CasError, Result, Solution};
use cas_server::config::Config;
use cas_server::routes;
use cas_server::state::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Engine returning canned answers regardless of input.
#[derive(Clone)]
pub struct ScriptedEngine {
    pub simplify: Result<String>,
    pub solve: Result<Solution>,
    pub evaluate: Result<String>,
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self {
            simplify: Ok(String::new()),
            solve: Ok(Solution::default()),
            evaluate: Err(CasError::Unsupported("evaluate".into())),
        }
    }
}

impl AlgebraEngine for ScriptedEngine {
    fn simplify(&self, _expression: &str) -> Result<String> {
        self.simplify.clone()
    }

    fn solve(&self, _equations: &[String], _variable: &str) -> Result<Solution> {
        self.solve.clone()
    }

    fn evaluate(&self, _program: &str) -> Result<String> {
        self.evaluate.clone()
    }
}

pub fn solution(result: &str, steps: &[&str]) -> Solution {
    Solution {
        result: result.to_string(),
        steps: steps.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn app_with(engine: impl AlgebraEngine + 'static) -> Router {
    routes::router(Arc::new(AppState::with_engine(Config::default(), Arc::new(engine))))
}

/// Router over the bundled engine.
pub fn app() -> Router {
    routes::router(Arc::new(AppState::new(Config::default())))
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

/// Status and raw text body.
pub async fn post_json_text(app: Router, uri: &str, body: Value) -> (StatusCode, String) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}
