//! Expression tree and its textual rendering.

use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl BinaryOp {
    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 2,
            BinaryOp::Pow => 4,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => " + ",
            BinaryOp::Sub => " - ",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "^",
        }
    }
}

/// Builtin functions callable as `name(arg)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sqrt,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sqrt" => Some(Function::Sqrt),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Sqrt => "sqrt",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        func: Function,
        arg: Box<Expr>,
    },
}

/// A parsed line: a bare expression or an equation.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expr(Expr),
    Equation { lhs: Expr, rhs: Expr },
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Expr::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// All variable names referenced by this expression.
    pub fn variables(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables(&self, names: &mut BTreeSet<String>) {
        match self {
            Expr::Number(_) => {}
            Expr::Variable(name) => {
                names.insert(name.clone());
            }
            Expr::Unary { operand, .. } => operand.collect_variables(names),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_variables(names);
                rhs.collect_variables(names);
            }
            Expr::Call { arg, .. } => arg.collect_variables(names),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Number(n) if n.is_sign_negative() && *n != 0.0 => 3,
            Expr::Number(_) | Expr::Variable(_) | Expr::Call { .. } => 5,
            Expr::Unary { .. } => 3,
            Expr::Binary { op, .. } => op.precedence(),
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, parenthesize: bool) -> fmt::Result {
    if parenthesize {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => f.write_str(&format_number(*n)),
            Expr::Variable(name) => f.write_str(name),
            Expr::Unary { op, operand } => {
                let sign = match op {
                    UnaryOp::Plus => "+",
                    UnaryOp::Neg => "-",
                };
                f.write_str(sign)?;
                write_operand(f, operand, operand.precedence() <= 3)
            }
            Expr::Binary { op, lhs, rhs } => {
                let p = op.precedence();
                let left_paren = match op {
                    BinaryOp::Pow => lhs.precedence() <= p,
                    _ => lhs.precedence() < p,
                };
                let right_paren = match op {
                    BinaryOp::Pow => rhs.precedence() < p,
                    BinaryOp::Add | BinaryOp::Mul => {
                        rhs.precedence() < p || rhs.precedence() == 3
                    }
                    BinaryOp::Sub | BinaryOp::Div | BinaryOp::Mod => {
                        rhs.precedence() <= p || rhs.precedence() == 3
                    }
                };
                write_operand(f, lhs, left_paren)?;
                f.write_str(op.symbol())?;
                write_operand(f, rhs, right_paren)
            }
            Expr::Call { func, arg } => write!(f, "{}({})", func.name(), arg),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Expr(expr) => write!(f, "{}", expr),
            Statement::Equation { lhs, rhs } => write!(f, "{} = {}", lhs, rhs),
        }
    }
}

/// Render a number without a trailing `.0`, rounded to 10 decimals so
/// binary noise like `0.30000000000000004` prints as `0.3`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() || value.abs() >= 1e15 {
        return value.to_string();
    }
    let rounded = (value * 1e10).round() / 1e10;
    if rounded == 0.0 {
        return "0".to_string();
    }
    rounded.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(-2.5), "-2.5");
        assert_eq!(format_number(0.1 + 0.2), "0.3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1e-12), "0");
    }

    #[test]
    fn test_display_minimal_parentheses() {
        // (a + b)*c
        let expr = Expr::binary(
            BinaryOp::Mul,
            Expr::binary(BinaryOp::Add, Expr::var("a"), Expr::var("b")),
            Expr::var("c"),
        );
        assert_eq!(expr.to_string(), "(a + b)*c");

        // a - (b - c)
        let expr = Expr::binary(
            BinaryOp::Sub,
            Expr::var("a"),
            Expr::binary(BinaryOp::Sub, Expr::var("b"), Expr::var("c")),
        );
        assert_eq!(expr.to_string(), "a - (b - c)");

        // (-x)^2 and -x^2
        let neg_x = Expr::unary(UnaryOp::Neg, Expr::var("x"));
        let squared = Expr::binary(BinaryOp::Pow, neg_x, Expr::Number(2.0));
        assert_eq!(squared.to_string(), "(-x)^2");
        let negated = Expr::unary(
            UnaryOp::Neg,
            Expr::binary(BinaryOp::Pow, Expr::var("x"), Expr::Number(2.0)),
        );
        assert_eq!(negated.to_string(), "-x^2");
    }

    #[test]
    fn test_power_is_right_associative_in_output() {
        let expr = Expr::binary(
            BinaryOp::Pow,
            Expr::var("a"),
            Expr::binary(BinaryOp::Pow, Expr::var("b"), Expr::var("c")),
        );
        assert_eq!(expr.to_string(), "a^b^c");
    }

    #[test]
    fn test_variables_are_collected() {
        let expr = Expr::binary(
            BinaryOp::Add,
            Expr::var("y"),
            Expr::binary(BinaryOp::Mul, Expr::var("x"), Expr::var("y")),
        );
        let names: Vec<_> = expr.variables().into_iter().collect();
        assert_eq!(names, vec!["x", "y"]);
    }
}
