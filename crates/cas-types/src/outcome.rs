//! Structured result of an engine call.

use serde::{Deserialize, Serialize};

/// Category of an engine failure, stable for clients to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The input could not be tokenized or parsed.
    Parse,
    /// Well-formed input the engine refuses (e.g. an invalid variable name).
    InvalidInput,
    /// A mathematical fault such as division by zero.
    Math,
    /// The engine does not support this construct or operation.
    Unsupported,
    /// The engine did not answer within the configured deadline.
    Timeout,
    /// Worker pool failure or engine panic.
    Internal,
}

/// Outcome of any algebra request.
///
/// Every handler produces one of these; the legacy response shapes are
/// derived from it so both route families agree on classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AlgebraOutcome {
    Ok {
        result: String,
        #[serde(default)]
        steps: Vec<String>,
    },
    /// The engine answered with an empty result.
    NoSolution {
        #[serde(default)]
        steps: Vec<String>,
    },
    Error {
        kind: FailureKind,
        message: String,
    },
}

impl AlgebraOutcome {
    /// Classify a raw engine answer. Empty or whitespace-only results mean
    /// no solution.
    pub fn from_answer(result: String, steps: Vec<String>) -> Self {
        if result.trim().is_empty() {
            AlgebraOutcome::NoSolution { steps }
        } else {
            AlgebraOutcome::Ok { result, steps }
        }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        AlgebraOutcome::Error {
            kind,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_whitespace_answer_is_no_solution() {
        let outcome = AlgebraOutcome::from_answer("  \n".into(), vec!["step".into()]);
        assert_eq!(
            outcome,
            AlgebraOutcome::NoSolution {
                steps: vec!["step".into()]
            }
        );
    }

    #[test]
    fn test_outcome_wire_format() {
        let ok = AlgebraOutcome::from_answer("4".into(), vec![]);
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"status": "ok", "result": "4", "steps": []})
        );

        let err = AlgebraOutcome::failure(FailureKind::Math, "division by zero");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"status": "error", "kind": "math", "message": "division by zero"})
        );
    }
}
