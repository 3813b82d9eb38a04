//! Pratt parser producing [`Statement`]s.

use crate::ast::{BinaryOp, Expr, Function, Statement, UnaryOp};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::{CasError, Result};

/// Binding power of prefix `+`/`-`: tighter than `*`, looser than `^`.
const PREFIX_BP: u8 = 35;

/// Guards the recursive descent against pathological nesting.
const MAX_DEPTH: usize = 256;

/// Tallest expression tree accepted. Every later pass recurses over the
/// tree, so long flat chains such as `x+x+...` are bounded here too.
const MAX_HEIGHT: usize = 256;

/// Longest token stream accepted for one statement.
const MAX_TOKENS: usize = 2048;

/// Parse a single line into an expression or an equation.
pub fn parse_statement(input: &str) -> Result<Statement> {
    let tokens = Lexer::new(input).tokenize()?;
    if tokens.len() > MAX_TOKENS {
        return Err(CasError::Parse("expression too long".to_string()));
    }
    let mut parser = Parser::new(tokens);
    let (lhs, _) = parser.expression(0)?;
    match parser.peek().kind {
        TokenKind::End => Ok(Statement::Expr(lhs)),
        TokenKind::Equals => {
            parser.advance();
            let (rhs, _) = parser.expression(0)?;
            parser.expect_end()?;
            Ok(Statement::Equation { lhs, rhs })
        }
        _ => Err(parser.unexpected()),
    }
}

/// Parse a line that must be a plain expression.
pub fn parse_expression(input: &str) -> Result<Expr> {
    match parse_statement(input)? {
        Statement::Expr(expr) => Ok(expr),
        Statement::Equation { .. } => Err(CasError::Parse(
            "expected an expression, found an equation".to_string(),
        )),
    }
}

/// Parse a line that must be an equation.
pub fn parse_equation(input: &str) -> Result<(Expr, Expr)> {
    match parse_statement(input)? {
        Statement::Equation { lhs, rhs } => Ok((lhs, rhs)),
        Statement::Expr(_) => Err(CasError::NotAnEquation(input.trim().to_string())),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> &Token {
        // tokenize() always terminates the stream with End
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn unexpected(&self) -> CasError {
        let token = self.peek();
        match token.kind {
            TokenKind::End => CasError::Parse("unexpected end of input".to_string()),
            ref kind => CasError::Parse(format!(
                "unexpected '{}' at position {}",
                kind, token.position
            )),
        }
    }

    fn expect_end(&self) -> Result<()> {
        if self.peek().kind == TokenKind::End {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_rparen(&mut self) -> Result<()> {
        if self.peek().kind == TokenKind::RParen {
            self.advance();
            Ok(())
        } else {
            Err(CasError::Parse(format!(
                "expected ')', found '{}'",
                self.peek().kind
            )))
        }
    }

    /// Parse an expression and report the height of its tree.
    fn expression(&mut self, min_bp: u8) -> Result<(Expr, usize)> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CasError::Parse("expression nested too deeply".to_string()));
        }
        let result = self.expression_inner(min_bp);
        self.depth -= 1;
        result
    }

    fn expression_inner(&mut self, min_bp: u8) -> Result<(Expr, usize)> {
        let (mut lhs, mut height) = self.prefix()?;

        loop {
            let (op, implicit) = match self.peek().kind {
                TokenKind::Plus => (BinaryOp::Add, false),
                TokenKind::Minus => (BinaryOp::Sub, false),
                TokenKind::Star => (BinaryOp::Mul, false),
                TokenKind::Slash => (BinaryOp::Div, false),
                TokenKind::Percent => (BinaryOp::Mod, false),
                TokenKind::Caret => (BinaryOp::Pow, false),
                // `2x`, `3(x + 1)`, `(a)(b)`
                TokenKind::Number(_) | TokenKind::Ident(_) | TokenKind::LParen => {
                    (BinaryOp::Mul, true)
                }
                TokenKind::Equals | TokenKind::RParen | TokenKind::End => break,
            };

            let (left_bp, right_bp) = infix_binding_power(op);
            if left_bp < min_bp {
                break;
            }
            if !implicit {
                self.advance();
            }
            let (rhs, rhs_height) = self.expression(right_bp)?;
            height = grow(height.max(rhs_height))?;
            lhs = Expr::binary(op, lhs, rhs);
        }

        Ok((lhs, height))
    }

    fn prefix(&mut self) -> Result<(Expr, usize)> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(n) => Ok((Expr::Number(n), 1)),
            TokenKind::Ident(name) => {
                if let Some(func) = Function::from_name(&name) {
                    if self.peek().kind == TokenKind::LParen {
                        self.advance();
                        let (arg, height) = self.expression(0)?;
                        self.expect_rparen()?;
                        let call = Expr::Call {
                            func,
                            arg: Box::new(arg),
                        };
                        return Ok((call, grow(height)?));
                    }
                }
                Ok((Expr::Variable(name), 1))
            }
            TokenKind::LParen => {
                let inner = self.expression(0)?;
                self.expect_rparen()?;
                Ok(inner)
            }
            TokenKind::Plus => {
                let (operand, height) = self.expression(PREFIX_BP)?;
                Ok((Expr::unary(UnaryOp::Plus, operand), grow(height)?))
            }
            TokenKind::Minus => {
                let (operand, height) = self.expression(PREFIX_BP)?;
                Ok((Expr::unary(UnaryOp::Neg, operand), grow(height)?))
            }
            TokenKind::End => Err(CasError::Parse("unexpected end of input".to_string())),
            kind => Err(CasError::Parse(format!(
                "unexpected '{}' at position {}",
                kind, token.position
            ))),
        }
    }
}

/// Height of a node over a child of height `child`.
fn grow(child: usize) -> Result<usize> {
    if child >= MAX_HEIGHT {
        Err(CasError::Parse("expression too long".to_string()))
    } else {
        Ok(child + 1)
    }
}

fn infix_binding_power(op: BinaryOp) -> (u8, u8) {
    match op {
        BinaryOp::Add | BinaryOp::Sub => (20, 21),
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => (30, 31),
        // right associative
        BinaryOp::Pow => (41, 40),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(input: &str) -> String {
        parse_statement(input).unwrap().to_string()
    }

    #[test]
    fn test_precedence_and_grouping() {
        assert_eq!(render("-1+2*3^2/(2-5)"), "-1 + 2*3^2/(2 - 5)");
        assert_eq!(render("(3 + 2) * 1"), "(3 + 2)*1");
        assert_eq!(render("2^3^2"), "2^3^2");
        assert_eq!(render("(2^3)^2"), "(2^3)^2");
    }

    #[test]
    fn test_prefix_minus_binds_below_power() {
        let expr = parse_expression("-x^2").unwrap();
        assert!(matches!(expr, Expr::Unary { op: UnaryOp::Neg, .. }));
        assert_eq!(expr.to_string(), "-x^2");
    }

    #[test]
    fn test_implicit_multiplication() {
        assert_eq!(render("2x"), "2*x");
        assert_eq!(render("3(x + 1)"), "3*(x + 1)");
        assert_eq!(render("2x^2"), "2*x^2");
        assert_eq!(render("(a)(b)"), "a*b");
    }

    #[test]
    fn test_equation() {
        let (lhs, rhs) = parse_equation("3+y = 2 - (x + 5)").unwrap();
        assert_eq!(lhs.to_string(), "3 + y");
        assert_eq!(rhs.to_string(), "2 - (x + 5)");
    }

    #[test]
    fn test_sqrt_call() {
        assert_eq!(render("sqrt(16) + 1"), "sqrt(16) + 1");
        // without parentheses it is an ordinary variable
        assert_eq!(render("sqrt + 1"), "sqrt + 1");
    }

    #[test]
    fn test_expression_without_equals_is_not_an_equation() {
        assert_eq!(
            parse_equation("x + 1").unwrap_err(),
            CasError::NotAnEquation("x + 1".into())
        );
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse_statement(""), Err(CasError::Parse(_))));
        assert!(matches!(parse_statement("(1 + 2"), Err(CasError::Parse(_))));
        assert!(matches!(parse_statement("1 + 2)"), Err(CasError::Parse(_))));
        assert!(matches!(parse_statement("x = 1 = 2"), Err(CasError::Parse(_))));
        assert!(matches!(parse_statement("(x = 1)"), Err(CasError::Parse(_))));
        assert!(matches!(parse_statement("* 2"), Err(CasError::Parse(_))));
    }

    #[test]
    fn test_long_flat_chains_are_rejected() {
        let huge = format!("{}1", "x+".repeat(200_000));
        assert_eq!(
            parse_statement(&huge).unwrap_err(),
            CasError::Parse("expression too long".into())
        );

        // under the token cap but taller than any later pass should recurse
        let tall = format!("{}1", "x+".repeat(300));
        assert_eq!(
            parse_statement(&tall).unwrap_err(),
            CasError::Parse("expression too long".into())
        );

        let fine = format!("{}1", "x+".repeat(100));
        assert!(parse_statement(&fine).is_ok());
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let input = format!("{}1{}", "(".repeat(1000), ")".repeat(1000));
        assert_eq!(
            parse_statement(&input).unwrap_err(),
            CasError::Parse("expression nested too deeply".into())
        );
    }
}
