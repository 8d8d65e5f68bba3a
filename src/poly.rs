//! On-demand univariate polynomial detection and operations
//!
//! Expressions that reduce to a polynomial in the integration variable get exact
//! antiderivatives, closed-form roots and the tabular integration-by-parts expansion.

use crate::evaluator::evaluate_constant;
use crate::functions::{add_opt, mul_opt};
use crate::{Expr, ExprKind};

/// Highest degree any intermediate expansion may reach when recognizing a polynomial
const MAX_EXPANDED_DEGREE: usize = 64;

/// Dense polynomial with coefficients in ascending order: `coeffs[k]` multiplies `x^k`
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coeffs: Vec<f64>,
}

impl Polynomial {
    /// Create from ascending coefficients; trailing zeros are dropped
    pub fn new(coeffs: Vec<f64>) -> Self {
        let mut poly = Polynomial { coeffs };
        poly.trim();
        poly
    }

    pub fn constant(c: f64) -> Self {
        Polynomial::new(vec![c])
    }

    /// p(x) = x
    pub fn identity() -> Self {
        Polynomial::new(vec![0.0, 1.0])
    }

    fn trim(&mut self) {
        while self.coeffs.last().is_some_and(|c| *c == 0.0) {
            self.coeffs.pop();
        }
    }

    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Degree; the zero polynomial reports 0
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub fn coeff(&self, k: usize) -> f64 {
        self.coeffs.get(k).copied().unwrap_or(0.0)
    }

    /// Horner evaluation
    pub fn eval(&self, x: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
    }

    pub fn add(&self, other: &Polynomial) -> Polynomial {
        let len = self.coeffs.len().max(other.coeffs.len());
        Polynomial::new((0..len).map(|k| self.coeff(k) + other.coeff(k)).collect())
    }

    pub fn sub(&self, other: &Polynomial) -> Polynomial {
        self.add(&other.scale(-1.0))
    }

    pub fn scale(&self, factor: f64) -> Polynomial {
        Polynomial::new(self.coeffs.iter().map(|c| c * factor).collect())
    }

    pub fn mul(&self, other: &Polynomial) -> Polynomial {
        if self.is_zero() || other.is_zero() {
            return Polynomial::new(Vec::new());
        }
        let mut out = vec![0.0; self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                out[i + j] += a * b;
            }
        }
        Polynomial::new(out)
    }

    fn powi(&self, exponent: usize) -> Polynomial {
        let mut result = Polynomial::constant(1.0);
        for _ in 0..exponent {
            result = result.mul(self);
        }
        result
    }

    pub fn derivative(&self) -> Polynomial {
        Polynomial::new(
            self.coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(k, c)| c * k as f64)
                .collect(),
        )
    }

    /// Antiderivative with zero constant term
    pub fn antiderivative(&self) -> Polynomial {
        let mut out = Vec::with_capacity(self.coeffs.len() + 1);
        out.push(0.0);
        out.extend(
            self.coeffs
                .iter()
                .enumerate()
                .map(|(k, c)| c / (k as f64 + 1.0)),
        );
        Polynomial::new(out)
    }

    /// Divide by `a*x + b`, returning quotient and remainder
    pub fn divide_linear(&self, a: f64, b: f64) -> (Polynomial, f64) {
        if self.coeffs.len() < 2 {
            return (Polynomial::new(Vec::new()), self.coeff(0));
        }
        // Synthetic division by (x - r) with r = -b/a, then scale the quotient by 1/a
        let r = -b / a;
        let n = self.coeffs.len();
        let mut quotient = vec![0.0; n - 1];
        let mut carry = 0.0;
        for k in (0..n).rev() {
            let value = self.coeffs[k] + carry * r;
            if k == 0 {
                return (Polynomial::new(quotient).scale(1.0 / a), value);
            }
            quotient[k - 1] = value;
            carry = value;
        }
        (Polynomial::new(quotient).scale(1.0 / a), 0.0)
    }

    /// `(a, b)` when the polynomial is `a*x + b` with `a != 0`
    pub fn as_linear(&self) -> Option<(f64, f64)> {
        (self.coeffs.len() == 2).then(|| (self.coeffs[1], self.coeffs[0]))
    }

    /// Real roots for degree 1 and 2, ascending. `None` for other degrees.
    pub fn closed_form_roots(&self) -> Option<Vec<f64>> {
        match self.coeffs.len() {
            // `+ 0.0` turns a -0.0 root into 0.0
            2 => Some(vec![-self.coeffs[0] / self.coeffs[1] + 0.0]),
            3 => {
                let (c, b, a) = (self.coeffs[0], self.coeffs[1], self.coeffs[2]);
                let disc = b * b - 4.0 * a * c;
                let scale = (b * b).max((4.0 * a * c).abs()).max(f64::MIN_POSITIVE);
                if disc.abs() <= 1e-14 * scale {
                    return Some(vec![-b / (2.0 * a) + 0.0]);
                }
                if disc < 0.0 {
                    return Some(Vec::new());
                }
                // Numerically stable form avoids cancellation in -b ± sqrt(disc)
                let sign = if b < 0.0 { -1.0 } else { 1.0 };
                let q = -0.5 * (b + sign * disc.sqrt());
                let mut roots = vec![q / a + 0.0, c / q + 0.0];
                roots.sort_by(f64::total_cmp);
                Some(roots)
            }
            _ => None,
        }
    }

    /// Recognize `expr` as a polynomial in `var`
    ///
    /// Variable-free subexpressions are folded to numbers; integer powers up to a fixed
    /// degree are expanded and division is only accepted by a nonzero constant.
    pub fn from_expr(expr: &Expr, var: &str) -> Option<Polynomial> {
        if !expr.contains_var(var) {
            return evaluate_constant(expr).value().map(Polynomial::constant);
        }
        match &expr.kind {
            ExprKind::Symbol(s) if s == var => Some(Polynomial::identity()),
            ExprKind::Add(l, r) => {
                Some(Polynomial::from_expr(l, var)?.add(&Polynomial::from_expr(r, var)?))
            }
            ExprKind::Sub(l, r) => {
                Some(Polynomial::from_expr(l, var)?.sub(&Polynomial::from_expr(r, var)?))
            }
            ExprKind::Mul(l, r) => {
                let (l, r) = (Polynomial::from_expr(l, var)?, Polynomial::from_expr(r, var)?);
                if l.degree() + r.degree() > MAX_EXPANDED_DEGREE {
                    return None;
                }
                Some(l.mul(&r))
            }
            ExprKind::Div(l, r) if !r.contains_var(var) => {
                let den = evaluate_constant(r).value()?;
                if den == 0.0 {
                    return None;
                }
                Some(Polynomial::from_expr(l, var)?.scale(1.0 / den))
            }
            ExprKind::Neg(inner) => Some(Polynomial::from_expr(inner, var)?.scale(-1.0)),
            ExprKind::Pow(base, exponent) if !exponent.contains_var(var) => {
                let k = evaluate_constant(exponent).value()?;
                if k < 0.0 || k.fract() != 0.0 || k > MAX_EXPANDED_DEGREE as f64 {
                    return None;
                }
                let base = Polynomial::from_expr(base, var)?;
                let k = k as usize;
                if base.degree().saturating_mul(k) > MAX_EXPANDED_DEGREE {
                    return None;
                }
                Some(base.powi(k))
            }
            _ => None,
        }
    }

    /// Build an expression `c0 + c1*x + c2*x^2 + ...`, omitting zero terms
    pub fn to_expr(&self, var: &str) -> Expr {
        let mut result = Expr::number(0.0);
        for (k, &c) in self.coeffs.iter().enumerate() {
            if c == 0.0 {
                continue;
            }
            let term = match k {
                0 => Expr::number(c),
                1 => mul_opt(Expr::number(c), Expr::symbol(var)),
                _ => mul_opt(
                    Expr::number(c),
                    Expr::pow(Expr::symbol(var), Expr::number(k as f64)),
                ),
            };
            result = add_opt(result, term);
        }
        result
    }
}
