//! Symbolic algebra engine and connection bookkeeping for the CAS gateway.

mod ast;
mod dispatch;
mod engine;
mod error;
mod evaluate;
mod lexer;
mod parser;
mod polynomial;
mod registry;
mod simplify;
mod solver;

pub use ast::{BinaryOp, Expr, Function, Statement, UnaryOp, format_number};
pub use dispatch::{DispatcherConfig, EngineDispatcher};
pub use engine::{AlgebraEngine, Cas};
pub use error::CasError;
pub use evaluate::{Evaluator, evaluate_program};
pub use lexer::{Lexer, Token, TokenKind, is_identifier};
pub use parser::{parse_equation, parse_expression, parse_statement};
pub use polynomial::Polynomial;
pub use registry::{ConnectionRegistry, Registration};
pub use simplify::{simplify, simplify_expr};
pub use solver::{Solution, solve_system};

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, CasError>;
