//! Expression simplification.
//!
//! Polynomial subtrees are rewritten into their normal form (like terms
//! combined, products distributed, constants folded). Subtrees that are not
//! polynomial keep their shape; their children are still simplified and
//! numeric operands folded.

use crate::ast::{BinaryOp, Expr, Statement, UnaryOp};
use crate::evaluate::{apply_binary, apply_function};
use crate::parser::parse_statement;
use crate::polynomial::Polynomial;
use crate::{CasError, Result};

/// Simplify a textual expression or equation.
pub fn simplify(input: &str) -> Result<String> {
    match parse_statement(input)? {
        Statement::Expr(expr) => Ok(simplify_expr(&expr)?.to_string()),
        Statement::Equation { lhs, rhs } => Ok(Statement::Equation {
            lhs: simplify_expr(&lhs)?,
            rhs: simplify_expr(&rhs)?,
        }
        .to_string()),
    }
}

pub fn simplify_expr(expr: &Expr) -> Result<Expr> {
    if let Some(poly) = Polynomial::from_expr(expr)? {
        return Ok(poly.to_expr());
    }

    match expr {
        Expr::Unary { op, operand } => {
            let inner = simplify_expr(operand)?;
            Ok(match op {
                UnaryOp::Plus => inner,
                UnaryOp::Neg => negate(inner),
            })
        }
        Expr::Binary { op, lhs, rhs } => fold_binary(*op, simplify_expr(lhs)?, simplify_expr(rhs)?),
        Expr::Call { func, arg } => {
            let arg = simplify_expr(arg)?;
            match arg.as_number() {
                Some(value) => Ok(Expr::Number(apply_function(*func, value)?)),
                None => Ok(Expr::Call {
                    func: *func,
                    arg: Box::new(arg),
                }),
            }
        }
        Expr::Number(_) | Expr::Variable(_) => Ok(expr.clone()),
    }
}

fn negate(expr: Expr) -> Expr {
    match expr {
        Expr::Number(n) => Expr::Number(-n),
        Expr::Unary {
            op: UnaryOp::Neg,
            operand,
        } => *operand,
        other => Expr::unary(UnaryOp::Neg, other),
    }
}

fn fold_binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Result<Expr> {
    if let (Some(a), Some(b)) = (lhs.as_number(), rhs.as_number()) {
        return Ok(Expr::Number(apply_binary(op, a, b)?));
    }
    if matches!(op, BinaryOp::Div | BinaryOp::Mod) && rhs.as_number() == Some(0.0) {
        return Err(CasError::DivisionByZero);
    }

    let folded = match (op, lhs.as_number(), rhs.as_number()) {
        (BinaryOp::Add, Some(z), _) if z == 0.0 => rhs,
        (BinaryOp::Add | BinaryOp::Sub, _, Some(z)) if z == 0.0 => lhs,
        (BinaryOp::Mul, Some(one), _) if one == 1.0 => rhs,
        (BinaryOp::Mul | BinaryOp::Div, _, Some(one)) if one == 1.0 => lhs,
        (BinaryOp::Pow, _, Some(one)) if one == 1.0 => lhs,
        (BinaryOp::Pow, _, Some(z)) if z == 0.0 => Expr::Number(1.0),
        _ => Expr::binary(op, lhs, rhs),
    };
    Ok(folded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_constant_arithmetic() {
        assert_eq!(simplify("2+2").unwrap(), "4");
        assert_eq!(simplify("-(3 + -(-2)) + +4 - -(-1)").unwrap(), "-2");
        assert_eq!(simplify("1/4 + 0.5").unwrap(), "0.75");
    }

    #[test]
    fn test_distribute_and_combine() {
        assert_eq!(simplify("2 + 3 * (4 - 1)-4*(a-2)").unwrap(), "-4*a + 19");
        assert_eq!(simplify("3*(2*(x+1))").unwrap(), "6*x + 6");
        assert_eq!(simplify("(3 + x) * 3").unwrap(), "3*x + 9");
        assert_eq!(simplify("x + x + y - x").unwrap(), "x + y");
    }

    #[test]
    fn test_equation_sides_are_simplified() {
        assert_eq!(simplify("(x + (-10 + x)) - 3 = 0").unwrap(), "2*x - 13 = 0");
    }

    #[test]
    fn test_non_polynomial_parts_keep_shape() {
        assert_eq!(simplify("1/x + 1/x").unwrap(), "1/x + 1/x");
        assert_eq!(simplify("(2 + 3)/(x - x + y)").unwrap(), "5/y");
        assert_eq!(simplify("x^(1/y) * 1").unwrap(), "x^(1/y)");
        assert_eq!(simplify("sqrt(x*x)").unwrap(), "sqrt(x^2)");
    }

    #[test]
    fn test_nested_powers_stay_structural() {
        assert_eq!(
            simplify("((((((x^64)^64)^64)^64)^64)^64)").unwrap(),
            "(((((x^64)^64)^64)^64)^64)^64"
        );
    }

    #[test]
    fn test_faults() {
        assert_eq!(simplify("x/0").unwrap_err(), CasError::DivisionByZero);
        assert_eq!(simplify("1/x/0").unwrap_err(), CasError::DivisionByZero);
        assert_eq!(simplify("x^(1/y) % (2 - 2)").unwrap_err(), CasError::DivisionByZero);
        assert!(matches!(simplify("2 +"), Err(CasError::Parse(_))));
        assert!(matches!(
            simplify("2 # 3"),
            Err(CasError::UnknownCharacter { found: '#', .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_integer_sums_fold_to_their_total(values in prop::collection::vec(-1000i64..1000, 1..12)) {
            let input = values
                .iter()
                .map(|v| format!("({})", v))
                .collect::<Vec<_>>()
                .join(" + ");
            let total: i64 = values.iter().sum();
            prop_assert_eq!(simplify(&input).unwrap(), total.to_string());
        }

        #[test]
        fn prop_simplify_never_panics(input in "[0-9a-z+*/^()= .-]{0,24}") {
            let _ = simplify(&input);
        }
    }
}
