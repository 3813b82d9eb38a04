//! Simplify, solve and evaluate routes.
//!
//! Handlers classify the engine answer as an [`AlgebraOutcome`]; the legacy
//! solve and evaluate routes flatten it into their historical shapes.

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use cas_core::CasError;
use cas_types::{
    AlgebraOutcome, EvaluateRequest, EvaluateResponse, SimplifyRequest, SimplifyResponse,
    SystemSolveRequest, SystemSolveResponse,
};
use std::sync::Arc;
use tracing::{debug, warn};

fn failure(op: &str, e: CasError) -> AlgebraOutcome {
    warn!(target: "cas::api", "{} failed: {}", op, e);
    AlgebraOutcome::failure(e.kind(), e.to_string())
}

async fn simplify_outcome(state: &AppState, expression: String) -> AlgebraOutcome {
    debug!(target: "cas::api", "simplify {:?}", expression);
    match state.engine.simplify(expression).await {
        // a blank simplification is still an answer
        Ok(simplified) => AlgebraOutcome::Ok {
            result: simplified,
            steps: Vec::new(),
        },
        Err(e) => failure("simplify", e),
    }
}

async fn solve_outcome(state: &AppState, req: SystemSolveRequest) -> AlgebraOutcome {
    debug!(
        target: "cas::api",
        "solve {} equation(s) for {:?}",
        req.equations.len(),
        req.variable
    );
    match state.engine.solve(req.equations, req.variable).await {
        Ok(solution) => AlgebraOutcome::from_answer(solution.result, solution.steps),
        Err(e) => failure("solve", e),
    }
}

async fn evaluate_outcome(state: &AppState, program: String) -> AlgebraOutcome {
    match state.engine.evaluate(program).await {
        Ok(value) => AlgebraOutcome::from_answer(value, Vec::new()),
        Err(e) => failure("evaluate", e),
    }
}

/// Engine faults surface as 500 with the fault text as the body.
pub async fn simplify(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SimplifyRequest>,
) -> Result<Json<SimplifyResponse>, (StatusCode, String)> {
    debug!(target: "cas::api", "simplify {:?}", req.expression);
    // the engine's answer passes through verbatim, even when blank
    let simplified = state.engine.simplify(req.expression).await.map_err(|e| {
        warn!(target: "cas::api", "simplify failed: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(Json(SimplifyResponse { simplified }))
}

pub async fn solve_system(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SystemSolveRequest>,
) -> Json<SystemSolveResponse> {
    Json(solve_outcome(&state, req).await.into())
}

pub async fn evaluate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EvaluateRequest>,
) -> Json<EvaluateResponse> {
    Json(evaluate_outcome(&state, req.expression).await.into())
}

pub async fn simplify_v2(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SimplifyRequest>,
) -> Json<AlgebraOutcome> {
    Json(simplify_outcome(&state, req.expression).await)
}

pub async fn solve_system_v2(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SystemSolveRequest>,
) -> Json<AlgebraOutcome> {
    Json(solve_outcome(&state, req).await)
}

pub async fn evaluate_v2(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EvaluateRequest>,
) -> Json<AlgebraOutcome> {
    Json(evaluate_outcome(&state, req.expression).await)
}
