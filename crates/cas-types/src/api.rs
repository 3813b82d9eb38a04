//! Request and response records for the HTTP routes.

use serde::{Deserialize, Serialize};

use crate::AlgebraOutcome;

/// Returned in place of an empty solve result.
pub const NO_SOLUTION_MESSAGE: &str = "No solution found or system is inconsistent.";

/// Prefix for engine faults embedded in a legacy text result.
pub const ERROR_PREFIX: &str = "Error: ";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifyRequest {
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifyResponse {
    pub simplified: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSolveRequest {
    pub equations: Vec<String>,
    pub variable: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSolveResponse {
    pub result: String,
    /// Absent when the engine faulted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<String>>,
}

impl From<AlgebraOutcome> for SystemSolveResponse {
    fn from(outcome: AlgebraOutcome) -> Self {
        match outcome {
            AlgebraOutcome::Ok { result, steps } => Self {
                result,
                steps: Some(steps),
            },
            AlgebraOutcome::NoSolution { .. } => Self {
                result: NO_SOLUTION_MESSAGE.to_string(),
                steps: Some(Vec::new()),
            },
            AlgebraOutcome::Error { message, .. } => Self {
                result: format!("{ERROR_PREFIX}{message}"),
                steps: None,
            },
        }
    }
}

/// A program of assignment and expression lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub result: String,
}

impl From<AlgebraOutcome> for EvaluateResponse {
    fn from(outcome: AlgebraOutcome) -> Self {
        let result = match outcome {
            AlgebraOutcome::Ok { result, .. } => result,
            AlgebraOutcome::NoSolution { .. } => NO_SOLUTION_MESSAGE.to_string(),
            AlgebraOutcome::Error { message, .. } => format!("{ERROR_PREFIX}{message}"),
        };
        Self { result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FailureKind;
    use serde_json::json;

    #[test]
    fn test_solve_response_from_no_solution_drops_steps() {
        let outcome = AlgebraOutcome::NoSolution {
            steps: vec!["Equation 1 reduces to 1 = 0".into()],
        };
        let response = SystemSolveResponse::from(outcome);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"result": NO_SOLUTION_MESSAGE, "steps": []})
        );
    }

    #[test]
    fn test_solve_response_from_error_omits_steps() {
        let outcome = AlgebraOutcome::failure(FailureKind::Math, "division by zero");
        let response = SystemSolveResponse::from(outcome);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"result": "Error: division by zero"})
        );
    }

    #[test]
    fn test_solve_request_parses() {
        let req: SystemSolveRequest =
            serde_json::from_value(json!({"equations": ["x+1=2"], "variable": "x"})).unwrap();
        assert_eq!(req.equations, vec!["x+1=2"]);
        assert_eq!(req.variable, "x");
    }
}
