//! Sparse multivariate polynomials with `f64` coefficients.
//!
//! This is the normal form the simplifier and solver work in. Conversion
//! from an [`Expr`] succeeds for sums, products, division by a constant and
//! small non-negative integer powers; anything else is reported as "not a
//! polynomial" so callers can fall back to structural rewriting.

use crate::ast::{BinaryOp, Expr, Function, UnaryOp};
use crate::{CasError, Result};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Coefficients smaller than this are treated as zero.
const EPSILON: f64 = 1e-10;

/// Largest number of terms an expansion may produce.
pub const MAX_TERMS: usize = 512;

/// Largest integer exponent expanded symbolically.
pub const MAX_EXPONENT: u32 = 64;

/// Largest total degree of a single monomial.
pub const MAX_DEGREE: u32 = 1024;

/// Product of variables raised to positive powers, e.g. `x^2*y`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Monomial(BTreeMap<String, u32>);

impl Monomial {
    pub fn one() -> Self {
        Self::default()
    }

    pub fn var(name: impl Into<String>) -> Self {
        let mut powers = BTreeMap::new();
        powers.insert(name.into(), 1);
        Self(powers)
    }

    pub fn is_constant(&self) -> bool {
        self.0.is_empty()
    }

    pub fn degree(&self) -> u32 {
        self.0.values().fold(0, |total, exp| total.saturating_add(*exp))
    }

    pub fn degree_in(&self, var: &str) -> u32 {
        self.0.get(var).copied().unwrap_or(0)
    }

    /// Product, or `None` past [`MAX_DEGREE`].
    fn mul(&self, other: &Monomial) -> Option<Monomial> {
        if self.degree().checked_add(other.degree())? > MAX_DEGREE {
            return None;
        }
        let mut powers = self.0.clone();
        for (name, exp) in &other.0 {
            let slot = powers.entry(name.clone()).or_insert(0);
            *slot = slot.checked_add(*exp)?;
        }
        Some(Monomial(powers))
    }

    fn without(&self, var: &str) -> Monomial {
        let mut powers = self.0.clone();
        powers.remove(var);
        Monomial(powers)
    }

    fn to_expr(&self) -> Option<Expr> {
        self.0
            .iter()
            .map(|(name, exp)| {
                if *exp == 1 {
                    Expr::var(name.clone())
                } else {
                    Expr::binary(BinaryOp::Pow, Expr::var(name.clone()), Expr::Number(*exp as f64))
                }
            })
            .reduce(|acc, factor| Expr::binary(BinaryOp::Mul, acc, factor))
    }

    /// Higher degree first, then by variable name, higher exponent first.
    fn display_order(&self, other: &Monomial) -> Ordering {
        other.degree().cmp(&self.degree()).then_with(|| {
            for ((a_name, a_exp), (b_name, b_exp)) in self.0.iter().zip(other.0.iter()) {
                let ord = a_name.cmp(b_name).then(b_exp.cmp(a_exp));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            other.0.len().cmp(&self.0.len())
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polynomial {
    terms: BTreeMap<Monomial, f64>,
}

impl Polynomial {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn constant(value: f64) -> Self {
        let mut poly = Self::zero();
        poly.accumulate(Monomial::one(), value);
        poly
    }

    pub fn variable(name: impl Into<String>) -> Self {
        let mut poly = Self::zero();
        poly.accumulate(Monomial::var(name), 1.0);
        poly
    }

    fn accumulate(&mut self, monomial: Monomial, coefficient: f64) {
        let entry = self.terms.entry(monomial).or_insert(0.0);
        *entry += coefficient;
        if entry.abs() < EPSILON {
            self.terms.retain(|_, c| c.abs() >= EPSILON);
        }
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The value of a polynomial without variables.
    pub fn as_constant(&self) -> Option<f64> {
        match self.terms.len() {
            0 => Some(0.0),
            1 => self.terms.get(&Monomial::one()).copied(),
            _ => None,
        }
    }

    pub fn variables(&self) -> BTreeSet<String> {
        self.terms
            .keys()
            .flat_map(|m| m.0.keys().cloned())
            .collect()
    }

    pub fn degree(&self) -> u32 {
        self.terms.keys().map(Monomial::degree).max().unwrap_or(0)
    }

    pub fn degree_in(&self, var: &str) -> u32 {
        self.terms
            .keys()
            .map(|m| m.degree_in(var))
            .max()
            .unwrap_or(0)
    }

    pub fn add(&self, other: &Polynomial) -> Polynomial {
        let mut sum = self.clone();
        for (m, c) in &other.terms {
            sum.accumulate(m.clone(), *c);
        }
        sum
    }

    pub fn sub(&self, other: &Polynomial) -> Polynomial {
        self.add(&other.neg())
    }

    pub fn neg(&self) -> Polynomial {
        self.scale(-1.0)
    }

    pub fn scale(&self, factor: f64) -> Polynomial {
        let mut scaled = Polynomial::zero();
        for (m, c) in &self.terms {
            scaled.accumulate(m.clone(), c * factor);
        }
        scaled
    }

    /// Product, or `None` when the expansion would exceed [`MAX_TERMS`] or
    /// [`MAX_DEGREE`].
    pub fn mul(&self, other: &Polynomial) -> Option<Polynomial> {
        if self.terms.len().saturating_mul(other.terms.len()) > MAX_TERMS * 8 {
            return None;
        }
        let mut product = Polynomial::zero();
        for (a_mono, a_coef) in &self.terms {
            for (b_mono, b_coef) in &other.terms {
                product.accumulate(a_mono.mul(b_mono)?, a_coef * b_coef);
            }
        }
        (product.terms.len() <= MAX_TERMS).then_some(product)
    }

    pub fn pow(&self, exponent: u32) -> Option<Polynomial> {
        if exponent > MAX_EXPONENT {
            return None;
        }
        let mut result = Polynomial::constant(1.0);
        for _ in 0..exponent {
            result = result.mul(self)?;
        }
        Some(result)
    }

    /// Replace `var` with a numeric value.
    pub fn substitute(&self, var: &str, value: f64) -> Polynomial {
        let mut result = Polynomial::zero();
        for (m, c) in &self.terms {
            let exp = m.degree_in(var);
            if exp == 0 {
                result.accumulate(m.clone(), *c);
            } else {
                result.accumulate(m.without(var), c * value.powi(exp as i32));
            }
        }
        result
    }

    /// Split into `coefficient*var + rest` when `var` appears at most
    /// linearly.
    pub fn split_linear(&self, var: &str) -> Option<(Polynomial, Polynomial)> {
        if self.degree_in(var) > 1 {
            return None;
        }
        let mut coefficient = Polynomial::zero();
        let mut rest = Polynomial::zero();
        for (m, c) in &self.terms {
            if m.degree_in(var) == 1 {
                coefficient.accumulate(m.without(var), *c);
            } else {
                rest.accumulate(m.clone(), *c);
            }
        }
        Some((coefficient, rest))
    }

    /// Coefficients of a polynomial of total degree at most one, as
    /// `(variable -> coefficient, constant)`.
    pub fn linear_form(&self) -> Option<(BTreeMap<String, f64>, f64)> {
        if self.degree() > 1 {
            return None;
        }
        let mut coefficients = BTreeMap::new();
        let mut constant = 0.0;
        for (m, c) in &self.terms {
            match m.0.keys().next() {
                Some(name) => {
                    coefficients.insert(name.clone(), *c);
                }
                None => constant = *c,
            }
        }
        Some((coefficients, constant))
    }

    /// Convert an expression tree. `Ok(None)` means the expression is valid
    /// but not polynomial.
    pub fn from_expr(expr: &Expr) -> Result<Option<Polynomial>> {
        let poly = match expr {
            Expr::Number(n) => Polynomial::constant(*n),
            Expr::Variable(name) => Polynomial::variable(name.clone()),
            Expr::Unary { op, operand } => {
                let Some(inner) = Self::from_expr(operand)? else {
                    return Ok(None);
                };
                match op {
                    UnaryOp::Plus => inner,
                    UnaryOp::Neg => inner.neg(),
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                let Some(left) = Self::from_expr(lhs)? else {
                    return Ok(None);
                };
                let Some(right) = Self::from_expr(rhs)? else {
                    return Ok(None);
                };
                match op {
                    BinaryOp::Add => left.add(&right),
                    BinaryOp::Sub => left.sub(&right),
                    BinaryOp::Mul => match left.mul(&right) {
                        Some(product) => product,
                        None => return Ok(None),
                    },
                    BinaryOp::Div => match right.as_constant() {
                        Some(divisor) if divisor == 0.0 => return Err(CasError::DivisionByZero),
                        Some(divisor) => left.scale(1.0 / divisor),
                        None => return Ok(None),
                    },
                    BinaryOp::Mod => match (left.as_constant(), right.as_constant()) {
                        (Some(_), Some(divisor)) if divisor == 0.0 => {
                            return Err(CasError::DivisionByZero);
                        }
                        (Some(dividend), Some(divisor)) => {
                            Polynomial::constant(dividend % divisor)
                        }
                        _ => return Ok(None),
                    },
                    BinaryOp::Pow => match Self::power(&left, &right)? {
                        Some(power) => power,
                        None => return Ok(None),
                    },
                }
            }
            Expr::Call { func, arg } => {
                let Some(inner) = Self::from_expr(arg)? else {
                    return Ok(None);
                };
                match (func, inner.as_constant()) {
                    (Function::Sqrt, Some(value)) if value < 0.0 => {
                        return Err(CasError::Unsupported(format!(
                            "square root of negative number {}",
                            crate::ast::format_number(value)
                        )));
                    }
                    (Function::Sqrt, Some(value)) => Polynomial::constant(value.sqrt()),
                    (Function::Sqrt, None) => return Ok(None),
                }
            }
        };
        Ok(Some(poly))
    }

    fn power(base: &Polynomial, exponent: &Polynomial) -> Result<Option<Polynomial>> {
        let Some(exp) = exponent.as_constant() else {
            return Ok(None);
        };
        if let Some(b) = base.as_constant() {
            if b == 0.0 && exp < 0.0 {
                return Err(CasError::DivisionByZero);
            }
            let value = b.powf(exp);
            return Ok(value.is_finite().then(|| Polynomial::constant(value)));
        }
        if exp >= 0.0 && exp.fract() == 0.0 && exp <= MAX_EXPONENT as f64 {
            return Ok(base.pow(exp as u32));
        }
        Ok(None)
    }

    pub fn to_expr(&self) -> Expr {
        let mut ordered: Vec<(&Monomial, f64)> = self.terms.iter().map(|(m, c)| (m, *c)).collect();
        ordered.sort_by(|(a, _), (b, _)| a.display_order(b));

        let mut iter = ordered.into_iter();
        let Some((first_mono, first_coef)) = iter.next() else {
            return Expr::Number(0.0);
        };

        let mut expr = term_expr(first_mono, first_coef);
        for (mono, coef) in iter {
            expr = if coef < 0.0 {
                Expr::binary(BinaryOp::Sub, expr, term_expr(mono, -coef))
            } else {
                Expr::binary(BinaryOp::Add, expr, term_expr(mono, coef))
            };
        }
        expr
    }
}

fn term_expr(monomial: &Monomial, coefficient: f64) -> Expr {
    match monomial.to_expr() {
        None => Expr::Number(coefficient),
        Some(factors) if (coefficient - 1.0).abs() < EPSILON => factors,
        Some(factors) if (coefficient + 1.0).abs() < EPSILON => negate_leading(factors),
        Some(factors) => Expr::binary(BinaryOp::Mul, Expr::Number(coefficient), factors),
    }
}

/// Negate the leftmost factor of a product chain: `x*y` -> `-x*y`.
fn negate_leading(expr: Expr) -> Expr {
    match expr {
        Expr::Binary {
            op: BinaryOp::Mul,
            lhs,
            rhs,
        } => Expr::Binary {
            op: BinaryOp::Mul,
            lhs: Box::new(negate_leading(*lhs)),
            rhs,
        },
        other => Expr::unary(UnaryOp::Neg, other),
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_expr())
    }
}
