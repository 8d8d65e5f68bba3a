//! Closed-form antiderivatives
//!
//! Rule set (applied recursively):
//! - polynomials, linearity and constant factors or divisors
//! - `f(a*x + b)` for every built-in `f`, via the per-function table
//! - `(a*x + b)^k` including `k = -1` (→ ln|a*x + b|) and `c^(a*x + b)`
//! - `p(x) / (a*x + b)` by polynomial division
//! - `p(x) * g(a*x + b)` for g ∈ {exp, sin, cos, sinh, cosh, c^u} by tabular
//!   integration by parts, and `p(x) * log(a*x + b)`
//! - `|a*x + b|`
//!
//! Anything else has no closed form here and the strategy declines.

use std::sync::Arc;

use super::Decline;
use super::strategy::{Estimate, Request, Strategy};
use crate::evaluator::{EvaluationOutcome, eval_at, evaluate_constant};
use crate::functions::{
    Function, add_opt, call_arc, definition, div_opt, mul_opt, neg, shared, sub_opt,
};
use crate::poly::Polynomial;
use crate::{Expr, ExprKind, Method};

/// Antiderivative of `expr` with respect to `var`, if one of the rules applies
///
/// The result is valid on any interval where it is continuous; the integration
/// engine only uses it on intervals without interior singular points.
///
/// # Example
/// ```
/// use symb_quad::{antiderivative, evaluate_at, parse};
///
/// let expr = parse("x*exp(x)", "x").unwrap();
/// let f = antiderivative(&expr, "x").unwrap();
/// // F(1) - F(0) = 1
/// let value = evaluate_at(&f, "x", 1.0).value().unwrap() - evaluate_at(&f, "x", 0.0).value().unwrap();
/// assert!((value - 1.0).abs() < 1e-12);
/// ```
pub fn antiderivative(expr: &Expr, var: &str) -> Option<Expr> {
    if !expr.contains_var(var) {
        return Some(mul_opt(expr.clone(), Expr::symbol(var)));
    }
    if let Some(poly) = Polynomial::from_expr(expr, var) {
        return Some(poly.antiderivative().to_expr(var));
    }

    match &expr.kind {
        ExprKind::Add(u, v) => Some(add_opt(antiderivative(u, var)?, antiderivative(v, var)?)),
        ExprKind::Sub(u, v) => Some(sub_opt(antiderivative(u, var)?, antiderivative(v, var)?)),
        ExprKind::Neg(u) => Some(neg(antiderivative(u, var)?)),

        ExprKind::Mul(u, v) => {
            if !u.contains_var(var) {
                return Some(mul_opt(shared(u), antiderivative(v, var)?));
            }
            if !v.contains_var(var) {
                return Some(mul_opt(antiderivative(u, var)?, shared(v)));
            }
            by_parts(u, v, var).or_else(|| by_parts(v, u, var))
        }

        ExprKind::Div(u, v) => {
            if !v.contains_var(var) {
                return Some(div_opt(antiderivative(u, var)?, shared(v)));
            }
            polynomial_over_linear(u, v, var).or_else(|| {
                if u.contains_var(var) {
                    return None;
                }
                Some(mul_opt(shared(u), reciprocal(v, var)?))
            })
        }

        ExprKind::Pow(base, exponent) => power(base, exponent, var),

        // ∫ f(a x + b) dx = F(a x + b) / a
        ExprKind::Call { func, arg } => {
            let (a, _) = linear(arg, var)?;
            Some(scale_by_inverse((definition(*func).antiderivative)(arg), a))
        }

        // ∫ |u| dx = u |u| / (2a)
        ExprKind::Abs(u) => {
            let (a, _) = linear(u, var)?;
            Some(Expr::div_expr(
                Expr::mul_expr(shared(u), Expr::abs(shared(u))),
                Expr::number(2.0 * a),
            ))
        }

        ExprKind::Number(_) | ExprKind::Constant(_) | ExprKind::Symbol(_) => None,
    }
}

/// `(a, b)` when `expr` is `a*x + b` with `a != 0`
fn linear(expr: &Expr, var: &str) -> Option<(f64, f64)> {
    Polynomial::from_expr(expr, var)?.as_linear()
}

fn scale_by_inverse(expr: Expr, a: f64) -> Expr {
    div_opt(expr, Expr::number(a))
}

/// ∫ u^k dx for linear u = a x + b
fn power_of_linear(base: &Arc<Expr>, k: f64, a: f64) -> Expr {
    if k == -1.0 {
        scale_by_inverse(Expr::call(Function::Log, Expr::abs(shared(base))), a)
    } else {
        Expr::div_expr(
            Expr::pow(shared(base), Expr::number(k + 1.0)),
            Expr::number(a * (k + 1.0)),
        )
    }
}

fn power(base: &Arc<Expr>, exponent: &Arc<Expr>, var: &str) -> Option<Expr> {
    if !exponent.contains_var(var) {
        let k = evaluate_constant(exponent).value()?;
        let (a, _) = linear(base, var)?;
        return Some(power_of_linear(base, k, a));
    }
    if !base.contains_var(var) {
        // c^u = exp(u ln c), so ∫ c^(a x + b) dx = c^(a x + b) / (a ln c)
        let c = evaluate_constant(base).value()?;
        if c <= 0.0 || c == 1.0 {
            return None;
        }
        let (a, _) = linear(exponent, var)?;
        return Some(Expr::div_expr(
            Expr::pow(shared(base), shared(exponent)),
            Expr::number(a * c.ln()),
        ));
    }
    None
}

/// ∫ 1 / v dx for a few shapes of v
fn reciprocal(v: &Arc<Expr>, var: &str) -> Option<Expr> {
    if let Some((a, _)) = linear(v, var) {
        return Some(power_of_linear(v, -1.0, a));
    }
    match &v.kind {
        ExprKind::Pow(base, exponent) if !exponent.contains_var(var) => {
            let k = evaluate_constant(exponent).value()?;
            let (a, _) = linear(base, var)?;
            Some(power_of_linear(base, -k, a))
        }
        ExprKind::Call {
            func: Function::Sqrt,
            arg,
        } => {
            let (a, _) = linear(arg, var)?;
            Some(power_of_linear(arg, -0.5, a))
        }
        // 1 / exp(u) = exp(-u)
        ExprKind::Call {
            func: Function::Exp,
            arg,
        } => {
            let (a, _) = linear(arg, var)?;
            Some(Expr::div_expr(
                Expr::call(Function::Exp, neg(shared(arg))),
                Expr::number(-a),
            ))
        }
        _ => None,
    }
}

/// ∫ p(x) / (a x + b) dx = ∫ q(x) dx + (r / a) ln|a x + b|
fn polynomial_over_linear(u: &Arc<Expr>, v: &Arc<Expr>, var: &str) -> Option<Expr> {
    let p = Polynomial::from_expr(u, var)?;
    let (a, b) = linear(v, var)?;
    let (quotient, remainder) = p.divide_linear(a, b);
    let log_term = if remainder == 0.0 {
        Expr::number(0.0)
    } else {
        mul_opt(Expr::number(remainder), power_of_linear(v, -1.0, a))
    };
    Some(add_opt(quotient.antiderivative().to_expr(var), log_term))
}

/// Kernels whose repeated antiderivatives cycle in closed form
#[derive(Debug, Clone, Copy, PartialEq)]
enum Kernel {
    Exp,
    Sin,
    Cos,
    Sinh,
    Cosh,
    /// c^u with ln c given
    Base(f64),
}

/// Recognize `g(a x + b)` with a tabular kernel
fn kernel(g: &Expr, var: &str) -> Option<(Kernel, Arc<Expr>, f64)> {
    match &g.kind {
        ExprKind::Call { func, arg } => {
            let kernel = match func {
                Function::Exp => Kernel::Exp,
                Function::Sin => Kernel::Sin,
                Function::Cos => Kernel::Cos,
                Function::Sinh => Kernel::Sinh,
                Function::Cosh => Kernel::Cosh,
                _ => return None,
            };
            let (a, _) = linear(arg, var)?;
            Some((kernel, Arc::clone(arg), a))
        }
        ExprKind::Pow(base, exponent) if !base.contains_var(var) => {
            let c = evaluate_constant(base).value()?;
            if c <= 0.0 || c == 1.0 {
                return None;
            }
            let (a, _) = linear(exponent, var)?;
            Some((Kernel::Base(c.ln()), Arc::clone(exponent), a))
        }
        _ => None,
    }
}

/// k-th repeated antiderivative (k ≥ 1) of the kernel in x: coefficient times an expression
fn repeated_antiderivative(
    kernel: Kernel,
    g: &Expr,
    u: &Arc<Expr>,
    a: f64,
    k: usize,
) -> (f64, Expr) {
    let scale = a.powi(k as i32).recip();
    let call = |func| call_arc(func, u);
    match kernel {
        Kernel::Exp => (scale, g.clone()),
        Kernel::Base(ln_c) => ((a * ln_c).powi(k as i32).recip(), g.clone()),
        // sin → -cos → -sin → cos → sin
        Kernel::Sin => match k % 4 {
            1 => (-scale, call(Function::Cos)),
            2 => (-scale, call(Function::Sin)),
            3 => (scale, call(Function::Cos)),
            _ => (scale, call(Function::Sin)),
        },
        // cos → sin → -cos → -sin → cos
        Kernel::Cos => match k % 4 {
            1 => (scale, call(Function::Sin)),
            2 => (-scale, call(Function::Cos)),
            3 => (-scale, call(Function::Sin)),
            _ => (scale, call(Function::Cos)),
        },
        Kernel::Sinh if k % 2 == 1 => (scale, call(Function::Cosh)),
        Kernel::Sinh => (scale, call(Function::Sinh)),
        Kernel::Cosh if k % 2 == 1 => (scale, call(Function::Sinh)),
        Kernel::Cosh => (scale, call(Function::Cosh)),
    }
}

/// ∫ p(x) g(x) dx where p is a polynomial of degree ≥ 1
fn by_parts(p_side: &Expr, g_side: &Expr, var: &str) -> Option<Expr> {
    let p = Polynomial::from_expr(p_side, var)?;

    if let ExprKind::Call {
        func: Function::Log,
        arg,
    } = &g_side.kind
    {
        return polynomial_times_log(&p, arg, var);
    }

    // ∫ p g = Σ_j (-1)^j p^(j) G_(j+1)
    let (kernel, u, a) = kernel(g_side, var)?;
    let mut result = Expr::number(0.0);
    let mut derivative = p;
    let mut sign = 1.0;
    for j in 0..=derivative.degree() {
        if derivative.is_zero() {
            break;
        }
        let (coef, g_expr) = repeated_antiderivative(kernel, g_side, &u, a, j + 1);
        let term = mul_opt(derivative.scale(sign * coef).to_expr(var), g_expr);
        result = add_opt(result, term);
        derivative = derivative.derivative();
        sign = -sign;
    }
    Some(result)
}

/// ∫ p(x) ln(a x + b) dx = P(x) ln(a x + b) - ∫ a P(x) / (a x + b) dx, with P = ∫ p
fn polynomial_times_log(p: &Polynomial, arg: &Arc<Expr>, var: &str) -> Option<Expr> {
    let (a, b) = linear(arg, var)?;
    let big_p = p.antiderivative();
    let (quotient, remainder) = big_p.scale(a).divide_linear(a, b);
    let rest = add_opt(
        quotient.antiderivative().to_expr(var),
        mul_opt(Expr::number(remainder), power_of_linear(arg, -1.0, a)),
    );
    Some(sub_opt(
        mul_opt(big_p.to_expr(var), call_arc(Function::Log, arg)),
        rest,
    ))
}

/// Closed-form strategy: F(upper) - F(lower)
pub(super) struct SymbolicClosedForm;

impl Strategy for SymbolicClosedForm {
    fn method(&self) -> Method {
        Method::SymbolicClosedForm
    }

    fn attempt(&self, request: &Request<'_>) -> Result<Estimate, Decline> {
        if let Some(point) = request.interior_singularity() {
            return Err(Decline::InteriorSingularity { point });
        }
        let f = antiderivative(request.expr, request.variable).ok_or(Decline::NoClosedForm)?;

        let at = |x: f64| match eval_at(&f, Some((request.variable, x))) {
            EvaluationOutcome::Value(v) => Ok(v),
            outcome => Err(Decline::Undefined { point: x, outcome }),
        };
        let value = at(request.upper)? - at(request.lower)?;
        if !value.is_finite() {
            return Err(Decline::NonFinite);
        }

        Ok(Estimate {
            value,
            error_estimate: None,
            justification: Some(f.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::evaluate;
    use crate::parser::parse;
    use std::f64::consts::{E, PI};

    fn definite(text: &str, a: f64, b: f64) -> Option<f64> {
        let expr = parse(text, "x").unwrap();
        let f = antiderivative(&expr, "x")?;
        Some(evaluate(&f, "x", b).value()? - evaluate(&f, "x", a).value()?)
    }

    fn assert_integral(text: &str, a: f64, b: f64, expected: f64) {
        let value = definite(text, a, b).unwrap_or_else(|| panic!("no closed form for {}", text));
        assert!(
            (value - expected).abs() < 1e-10,
            "{}: {} vs {}",
            text,
            value,
            expected
        );
    }

    #[test]
    fn test_polynomials() {
        assert_integral("x**2", 0.0, 3.0, 9.0);
        assert_integral("x^3 - 2x + 1", 1.0, 4.0, 51.75);
        assert_integral("5", 0.0, 2.0, 10.0);
        assert_integral("(x + 1)^2 / 3", 0.0, 1.0, 7.0 / 9.0);
    }

    #[test]
    fn test_functions_of_linear_arguments() {
        assert_integral("sin(x)", 0.0, PI, 2.0);
        assert_integral("cos(2x)", 0.0, PI / 4.0, 0.5);
        assert_integral("exp(3x - 1)", 0.0, 1.0, (E.powi(2) - E.powi(-1)) / 3.0);
        assert_integral("log(x)", 1.0, E, 1.0);
        assert_integral("sqrt(x)", 0.0, 4.0, 16.0 / 3.0);
        assert_integral("tan(x)", 0.0, PI / 4.0, 2f64.ln() / 2.0);
        assert_integral("atan(x)", 0.0, 1.0, PI / 4.0 - 2f64.ln() / 2.0);
        assert_integral("cosh(x)", 0.0, 1.0, 1f64.sinh());
    }

    #[test]
    fn test_powers_and_reciprocals() {
        assert_integral("1/x", 1.0, E, 1.0);
        assert_integral("1/(2x + 1)", 0.0, 1.0, 3f64.ln() / 2.0);
        assert_integral("x^-2", 1.0, 2.0, 0.5);
        assert_integral("3/(x+1)^2", 0.0, 1.0, 1.5);
        assert_integral("2^x", 0.0, 1.0, 1.0 / 2f64.ln());
        assert_integral("e^x", 0.0, 1.0, E - 1.0);
        assert_integral("1/sqrt(x)", 1.0, 4.0, 2.0);
        assert_integral("1/exp(x)", 0.0, 1.0, 1.0 - 1.0 / E);
    }

    #[test]
    fn test_polynomial_over_linear() {
        // (x^2 + 1) / (x + 1) = x - 1 + 2 / (x + 1)
        assert_integral("(x^2 + 1)/(x + 1)", 0.0, 1.0, -0.5 + 2.0 * 2f64.ln());
    }

    #[test]
    fn test_by_parts() {
        assert_integral("x*exp(x)", 0.0, 1.0, 1.0);
        assert_integral("x*sin(x)", 0.0, PI, PI);
        assert_integral("x^2*cos(x)", 0.0, PI / 2.0, PI * PI / 4.0 - 2.0);
        assert_integral("exp(x)*x", 0.0, 1.0, 1.0);
        assert_integral("x*log(x)", 1.0, E, (E * E + 1.0) / 4.0);
        assert_integral("x*sinh(x)", 0.0, 1.0, 1f64.cosh() - 1f64.sinh());
    }

    #[test]
    fn test_abs_of_linear() {
        assert_integral("abs(x)", -1.0, 2.0, 2.5);
    }

    #[test]
    fn test_no_closed_form() {
        let expr = parse("exp(x^2)", "x").unwrap();
        assert!(antiderivative(&expr, "x").is_none());
        let expr = parse("sin(x)/x", "x").unwrap();
        assert!(antiderivative(&expr, "x").is_none());
    }
}
