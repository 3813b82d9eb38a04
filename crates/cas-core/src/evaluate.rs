//! Numeric evaluation with variable assignments.

use crate::ast::{BinaryOp, Expr, Function, Statement, UnaryOp, format_number};
use crate::parser::parse_statement;
use crate::{CasError, Result};
use std::collections::HashMap;

/// Evaluates expressions against a set of assigned variables.
#[derive(Debug, Default, Clone)]
pub struct Evaluator {
    variables: HashMap<String, f64>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate(&self, expr: &Expr) -> Result<f64> {
        match expr {
            Expr::Number(n) => Ok(*n),
            Expr::Variable(name) => self
                .variables
                .get(name)
                .copied()
                .ok_or_else(|| CasError::UndefinedVariable(name.clone())),
            Expr::Unary { op, operand } => {
                let value = self.evaluate(operand)?;
                Ok(match op {
                    UnaryOp::Plus => value,
                    UnaryOp::Neg => -value,
                })
            }
            Expr::Binary { op, lhs, rhs } => {
                apply_binary(*op, self.evaluate(lhs)?, self.evaluate(rhs)?)
            }
            Expr::Call { func, arg } => apply_function(*func, self.evaluate(arg)?),
        }
    }

    /// Run a program of `name = expr` assignments and expressions,
    /// separated by newlines or `;`. Returns the value of the last
    /// expression line.
    pub fn run(&mut self, program: &str) -> Result<f64> {
        let mut last = None;
        for line in program.split(['\n', ';']).map(str::trim) {
            if line.is_empty() {
                continue;
            }
            match parse_statement(line)? {
                Statement::Expr(expr) => last = Some(self.evaluate(&expr)?),
                Statement::Equation {
                    lhs: Expr::Variable(name),
                    rhs,
                } => {
                    let value = self.evaluate(&rhs)?;
                    self.variables.insert(name, value);
                }
                Statement::Equation { lhs, .. } => {
                    return Err(CasError::InvalidVariable(lhs.to_string()));
                }
            }
        }
        last.ok_or_else(|| CasError::Parse("no expression to evaluate".to_string()))
    }
}

/// Evaluate a program with a fresh variable scope and format the result.
pub fn evaluate_program(program: &str) -> Result<String> {
    Evaluator::new().run(program).map(format_number)
}

pub(crate) fn apply_binary(op: BinaryOp, lhs: f64, rhs: f64) -> Result<f64> {
    let value = match op {
        BinaryOp::Add => lhs + rhs,
        BinaryOp::Sub => lhs - rhs,
        BinaryOp::Mul => lhs * rhs,
        BinaryOp::Div | BinaryOp::Mod if rhs == 0.0 => return Err(CasError::DivisionByZero),
        BinaryOp::Div => lhs / rhs,
        BinaryOp::Mod => lhs % rhs,
        BinaryOp::Pow if lhs == 0.0 && rhs < 0.0 => return Err(CasError::DivisionByZero),
        BinaryOp::Pow => lhs.powf(rhs),
    };
    finite(value)
}

pub(crate) fn apply_function(func: Function, arg: f64) -> Result<f64> {
    match func {
        Function::Sqrt if arg < 0.0 => Err(CasError::Unsupported(format!(
            "square root of negative number {}",
            format_number(arg)
        ))),
        Function::Sqrt => finite(arg.sqrt()),
    }
}

fn finite(value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CasError::Unsupported(
            "result is not a finite real number".to_string(),
        ))
    }
}
