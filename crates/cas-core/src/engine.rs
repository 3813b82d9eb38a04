//! The algebra engine boundary.

use crate::evaluate::evaluate_program;
use crate::simplify::simplify;
use crate::solver::{Solution, solve_system};
use crate::{CasError, Result};

/// Operations the HTTP layer needs from an algebra engine.
///
/// Implementations are synchronous and may be CPU heavy; callers run them
/// through [`crate::EngineDispatcher`].
pub trait AlgebraEngine: Send + Sync {
    /// Simplified form of an expression or equation.
    fn simplify(&self, expression: &str) -> Result<String>;

    /// Solve a system of equations for `variable`.
    fn solve(&self, equations: &[String], variable: &str) -> Result<Solution>;

    /// Numeric value of a program of assignments ending in an expression.
    fn evaluate(&self, program: &str) -> Result<String> {
        let _ = program;
        Err(CasError::Unsupported("evaluate".to_string()))
    }
}

/// The bundled symbolic engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct Cas;

impl AlgebraEngine for Cas {
    fn simplify(&self, expression: &str) -> Result<String> {
        simplify(expression)
    }

    fn solve(&self, equations: &[String], variable: &str) -> Result<Solution> {
        solve_system(equations, variable)
    }

    fn evaluate(&self, program: &str) -> Result<String> {
        evaluate_program(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SimplifyOnly;

    impl AlgebraEngine for SimplifyOnly {
        fn simplify(&self, expression: &str) -> Result<String> {
            Ok(expression.to_string())
        }

        fn solve(&self, _equations: &[String], _variable: &str) -> Result<Solution> {
            Ok(Solution::default())
        }
    }

    #[test]
    fn test_bundled_engine() {
        let engine: &dyn AlgebraEngine = &Cas;
        assert_eq!(engine.simplify("2+2").unwrap(), "4");
        assert_eq!(engine.evaluate("a = 3\na*a").unwrap(), "9");
        let solution = engine.solve(&["x - 4 = 0".to_string()], "x").unwrap();
        assert_eq!(solution.result, "4");
    }

    #[test]
    fn test_evaluate_defaults_to_unsupported() {
        assert!(matches!(
            SimplifyOnly.evaluate("1"),
            Err(CasError::Unsupported(_))
        ));
    }
}
