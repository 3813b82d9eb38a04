//! Solving systems of polynomial equations for one variable.
//!
//! Each equation is normalized to `lhs - rhs = 0`. The solver then repeats:
//! substitute known values, drop satisfied equations, stop on a
//! contradiction, solve any equation that is linear in a single unknown,
//! and otherwise run Gaussian elimination over the linear equations. When
//! the target is still unknown it falls back to a single-variable quadratic,
//! then to isolating the target symbolically.

use crate::ast::format_number;
use crate::lexer::is_identifier;
use crate::parser::parse_equation;
use crate::polynomial::Polynomial;
use crate::{CasError, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Upper bound on substitution/elimination rounds.
const MAX_ROUNDS: usize = 1000;

/// Pivots smaller than this are treated as zero during elimination.
const PIVOT_EPSILON: f64 = 1e-10;

/// Largest residual a quadratic root may leave in another equation.
const ROOT_TOLERANCE: f64 = 1e-8;

/// Engine answer for a solve request. An empty `result` means no solution
/// was found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Solution {
    pub result: String,
    pub steps: Vec<String>,
}

impl Solution {
    fn found(result: String, steps: Vec<String>) -> Self {
        Self { result, steps }
    }

    fn none(steps: Vec<String>) -> Self {
        Self {
            result: String::new(),
            steps,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.result.trim().is_empty()
    }
}

struct Pending {
    label: usize,
    poly: Polynomial,
}

enum Elimination {
    Determined(Vec<(String, f64)>),
    Inconsistent,
    Undetermined,
}

/// Solve `equations` for `variable`.
pub fn solve_system(equations: &[String], variable: &str) -> Result<Solution> {
    let target = variable.trim();
    if !is_identifier(target) {
        return Err(CasError::InvalidVariable(variable.to_string()));
    }

    let mut steps = Vec::new();
    if equations.is_empty() {
        steps.push("No equations given".to_string());
        return Ok(Solution::none(steps));
    }

    let mut pending = Vec::with_capacity(equations.len());
    for (index, text) in equations.iter().enumerate() {
        let label = index + 1;
        let (lhs, rhs) = parse_equation(text)?;
        let (Some(left), Some(right)) = (Polynomial::from_expr(&lhs)?, Polynomial::from_expr(&rhs)?)
        else {
            return Err(CasError::Unsupported(format!(
                "equation {} is not polynomial: {}",
                label,
                text.trim()
            )));
        };
        let poly = left.sub(&right);
        steps.push(format!(
            "Equation {}: rewrite {} = {} as {} = 0",
            label, lhs, rhs, poly
        ));
        pending.push(Pending { label, poly });
    }

    let mut known: BTreeMap<String, f64> = BTreeMap::new();

    for _ in 0..MAX_ROUNDS {
        let mut remaining = Vec::with_capacity(pending.len());
        for eq in pending.drain(..) {
            match eq.poly.as_constant() {
                Some(_) if eq.poly.is_zero() => {
                    steps.push(format!("Equation {} is satisfied", eq.label));
                }
                Some(value) => {
                    steps.push(format!(
                        "Equation {} reduces to {} = 0, which is never true",
                        eq.label,
                        format_number(value)
                    ));
                    return Ok(Solution::none(steps));
                }
                None => remaining.push(eq),
            }
        }
        pending = remaining;

        if known.contains_key(target) {
            break;
        }

        if let Some(index) = pending.iter().position(|eq| single_linear_unknown(&eq.poly).is_some()) {
            let eq = pending.remove(index);
            if let Some((name, value)) = single_linear_unknown(&eq.poly) {
                steps.push(format!(
                    "From equation {}: {} = {}",
                    eq.label,
                    name,
                    format_number(value)
                ));
                learn(&mut known, &mut pending, name, value);
            }
            continue;
        }

        match eliminate(&pending) {
            Elimination::Determined(values) => {
                let labels = labels(&pending);
                let found = values
                    .iter()
                    .map(|(name, value)| format!("{} = {}", name, format_number(*value)))
                    .collect::<Vec<_>>()
                    .join(", ");
                steps.push(format!("Eliminate across equations {}: {}", labels, found));
                for (name, value) in values {
                    learn(&mut known, &mut pending, name, value);
                }
            }
            Elimination::Inconsistent => {
                steps.push(format!(
                    "Equations {} are inconsistent",
                    labels(&pending)
                ));
                return Ok(Solution::none(steps));
            }
            Elimination::Undetermined => break,
        }
    }

    if let Some(value) = known.get(target) {
        return Ok(Solution::found(format_number(*value), steps));
    }

    if let Some(eq) = pending
        .iter()
        .find(|eq| eq.poly.variables().len() == 1 && eq.poly.degree_in(target) == 2)
    {
        return Ok(solve_quadratic(eq, &pending, target, steps));
    }

    for eq in &pending {
        let Some((coefficient, rest)) = eq.poly.split_linear(target) else {
            continue;
        };
        match coefficient.as_constant() {
            Some(c) if !coefficient.is_zero() => {
                let isolated = rest.scale(-1.0 / c);
                steps.push(format!(
                    "Isolate {} in equation {}: {} = {}",
                    target, eq.label, target, isolated
                ));
                return Ok(Solution::found(isolated.to_string(), steps));
            }
            _ => continue,
        }
    }

    steps.push(format!("Could not determine {} from the given equations", target));
    Ok(Solution::none(steps))
}

/// `(name, value)` when the polynomial is `a*name + b` with `a != 0`.
fn single_linear_unknown(poly: &Polynomial) -> Option<(String, f64)> {
    let variables = poly.variables();
    if variables.len() != 1 || poly.degree() != 1 {
        return None;
    }
    let name = variables.into_iter().next()?;
    let (coefficient, rest) = poly.split_linear(&name)?;
    let a = coefficient.as_constant()?;
    let b = rest.as_constant()?;
    Some((name, -b / a))
}

fn learn(known: &mut BTreeMap<String, f64>, pending: &mut [Pending], name: String, value: f64) {
    for eq in pending.iter_mut() {
        if eq.poly.degree_in(&name) > 0 {
            eq.poly = eq.poly.substitute(&name, value);
        }
    }
    known.insert(name, value);
}

fn labels<'a>(equations: impl IntoIterator<Item = &'a Pending>) -> String {
    equations
        .into_iter()
        .map(|eq| eq.label.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Gaussian elimination with partial pivoting over the equations of total
/// degree one.
fn eliminate(pending: &[Pending]) -> Elimination {
    let rows: Vec<(BTreeMap<String, f64>, f64)> = pending
        .iter()
        .filter_map(|eq| eq.poly.linear_form())
        .collect();
    if rows.len() < 2 {
        return Elimination::Undetermined;
    }

    let columns: Vec<String> = rows
        .iter()
        .flat_map(|(coefficients, _)| coefficients.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let width = columns.len();

    // Augmented matrix for sum(c_i * x_i) = -constant.
    let mut matrix: Vec<Vec<f64>> = rows
        .iter()
        .map(|(coefficients, constant)| {
            let mut row: Vec<f64> = columns
                .iter()
                .map(|name| coefficients.get(name).copied().unwrap_or(0.0))
                .collect();
            row.push(-constant);
            row
        })
        .collect();

    let mut pivots = Vec::new();
    let mut pivot_row = 0;
    for col in 0..width {
        if pivot_row >= matrix.len() {
            break;
        }
        let Some(best) = (pivot_row..matrix.len()).max_by(|&a, &b| {
            matrix[a][col].abs().total_cmp(&matrix[b][col].abs())
        }) else {
            break;
        };
        if matrix[best][col].abs() < PIVOT_EPSILON {
            continue;
        }
        matrix.swap(pivot_row, best);

        let pivot = matrix[pivot_row][col];
        for value in matrix[pivot_row].iter_mut() {
            *value /= pivot;
        }
        for row in 0..matrix.len() {
            if row == pivot_row {
                continue;
            }
            let factor = matrix[row][col];
            if factor.abs() < PIVOT_EPSILON {
                continue;
            }
            for k in 0..=width {
                let delta = factor * matrix[pivot_row][k];
                matrix[row][k] -= delta;
            }
        }
        pivots.push((pivot_row, col));
        pivot_row += 1;
    }

    let inconsistent = matrix.iter().any(|row| {
        row[..width].iter().all(|c| c.abs() < PIVOT_EPSILON) && row[width].abs() >= PIVOT_EPSILON
    });
    if inconsistent {
        return Elimination::Inconsistent;
    }

    let determined: Vec<(String, f64)> = pivots
        .into_iter()
        .filter(|&(row, col)| {
            (0..width).all(|k| k == col || matrix[row][k].abs() < PIVOT_EPSILON)
        })
        .map(|(row, col)| (columns[col].clone(), matrix[row][width]))
        .collect();

    if determined.is_empty() {
        Elimination::Undetermined
    } else {
        Elimination::Determined(determined)
    }
}

/// Real roots of a single-variable quadratic that also satisfy every other
/// pending equation, ascending and comma separated.
fn solve_quadratic(
    eq: &Pending,
    pending: &[Pending],
    target: &str,
    mut steps: Vec<String>,
) -> Solution {
    // p(x) = a*x^2 + b*x + c, recovered from p(0), p(1) and p(-1)
    let at = |x: f64| eq.poly.substitute(target, x).as_constant().unwrap_or(0.0);
    let (p0, p1, pm1) = (at(0.0), at(1.0), at(-1.0));
    let a = (p1 + pm1) / 2.0 - p0;
    let b = (p1 - pm1) / 2.0;
    let c = p0;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < -PIVOT_EPSILON {
        steps.push(format!(
            "Equation {} is quadratic in {} with no real roots",
            eq.label, target
        ));
        return Solution::none(steps);
    }

    let sqrt = discriminant.max(0.0).sqrt();
    let mut roots = vec![(-b - sqrt) / (2.0 * a), (-b + sqrt) / (2.0 * a)];
    roots.sort_by(f64::total_cmp);
    roots.dedup_by(|r, s| format_number(*r) == format_number(*s));

    let render = |values: &[f64]| {
        values
            .iter()
            .map(|v| format_number(*v))
            .collect::<Vec<_>>()
    };
    steps.push(format!(
        "Solve quadratic equation {} for {}: {} = {}",
        eq.label,
        target,
        target,
        render(&roots).join(" or ")
    ));

    let others: Vec<&Pending> = pending.iter().filter(|p| p.label != eq.label).collect();
    if others.is_empty() {
        return Solution::found(render(&roots).join(", "), steps);
    }

    let accepted: Vec<f64> = roots
        .into_iter()
        .filter(|root| {
            others.iter().all(|other| {
                match other.poly.substitute(target, *root).as_constant() {
                    Some(residual) => residual.abs() <= ROOT_TOLERANCE,
                    // still involves other unknowns; cannot rule the root out
                    None => true,
                }
            })
        })
        .collect();

    if accepted.is_empty() {
        steps.push(format!(
            "No root of equation {} satisfies equations {}",
            eq.label,
            labels(others.iter().copied())
        ));
        return Solution::none(steps);
    }

    let rendered = render(&accepted);
    steps.push(format!(
        "Check against equations {}: {} = {}",
        labels(others.iter().copied()),
        target,
        rendered.join(" or ")
    ));
    Solution::found(rendered.join(", "), steps)
}
