//! Error types for the algebra engine and its plumbing.

use cas_types::FailureKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CasError {
    #[error("Unknown character '{found}' at position {position}")]
    UnknownCharacter { found: char, position: usize },

    #[error("Invalid number literal: {0}")]
    InvalidNumber(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Equation must have the form LHS = RHS: {0}")]
    NotAnEquation(String),

    #[error("Invalid variable name: '{0}'")]
    InvalidVariable(String),

    #[error("Undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Engine call timed out after {0} ms")]
    Timeout(u64),

    #[error("Engine worker pool is unavailable")]
    EngineUnavailable,

    #[error("Engine panicked: {0}")]
    EnginePanic(String),
}

impl CasError {
    /// Stable category for structured responses.
    pub fn kind(&self) -> FailureKind {
        match self {
            CasError::UnknownCharacter { .. }
            | CasError::InvalidNumber(_)
            | CasError::Parse(_) => FailureKind::Parse,
            CasError::NotAnEquation(_)
            | CasError::InvalidVariable(_)
            | CasError::UndefinedVariable(_) => FailureKind::InvalidInput,
            CasError::DivisionByZero => FailureKind::Math,
            CasError::Unsupported(_) => FailureKind::Unsupported,
            CasError::Timeout(_) => FailureKind::Timeout,
            CasError::EngineUnavailable | CasError::EnginePanic(_) => FailureKind::Internal,
        }
    }
}
