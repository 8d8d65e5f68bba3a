//! Singularity pre-scan
//!
//! Candidate points are the real zeros of sub-expressions that can blow up the integrand:
//! denominators, bases of negative or variable powers, logarithm arguments and the
//! cosine under `tan`. Each candidate is probed from the inside of the interval at three
//! distances; the growth of |f| between consecutive probes estimates the blow-up order α
//! in |f(p + h)| ~ h^(-α). A point is non-integrable only when both estimates reach 1,
//! up to probe noise. Anything weaker, such as `x^-0.95` at the origin, converges and is
//! left to the strategies.

use tracing::trace;

use crate::evaluator::{eval_at, evaluate_constant};
use crate::functions::{Function, call_arc};
use crate::roots::{dedup_sorted, find_roots};
use crate::{Deadline, Expr, ExprKind, IntegralError};

/// Blow-up orders at or above this are not integrable
const NON_INTEGRABLE_ORDER: f64 = 0.99;
/// Probe distances, relative to the interval width, nearest first
const PROBES: [f64; 3] = [1e-8, 1e-6, 1e-4];

/// Integrable singular points of `expr` in `[lo, hi]`, ascending
///
/// Fails with [`IntegralError::Singularity`] at the first non-integrable point.
pub(crate) fn scan(
    expr: &Expr,
    var: &str,
    lo: f64,
    hi: f64,
    deadline: &Deadline,
) -> Result<Vec<f64>, IntegralError> {
    let mut points = Vec::new();
    for candidate in candidates(expr, var) {
        points.extend(find_roots(&candidate, var, lo, hi, deadline)?);
    }
    let points = dedup_sorted(points, hi - lo);

    for &point in &points {
        deadline.check()?;
        if let Some(order) = blow_up_order(expr, var, point, lo, hi) {
            trace!(point, order, "probed candidate singular point");
            if order >= NON_INTEGRABLE_ORDER {
                return Err(IntegralError::Singularity { point });
            }
        }
    }
    Ok(points)
}

/// Sub-expressions whose zeros may be singular points of `expr`
fn candidates(expr: &Expr, var: &str) -> Vec<Expr> {
    let mut found = Vec::new();
    expr.walk(&mut |node| match &node.kind {
        ExprKind::Div(_, den) if den.contains_var(var) => found.push((**den).clone()),
        ExprKind::Pow(base, exponent) if base.contains_var(var) => {
            let negative = evaluate_constant(exponent)
                .value()
                .is_none_or(|k| k < 0.0);
            if exponent.contains_var(var) || negative {
                found.push((**base).clone());
            }
        }
        ExprKind::Call {
            func: Function::Log,
            arg,
        } if arg.contains_var(var) => found.push((**arg).clone()),
        ExprKind::Call {
            func: Function::Tan,
            arg,
        } if arg.contains_var(var) => found.push(call_arc(Function::Cos, arg)),
        _ => {}
    });
    found.dedup();
    found
}

/// Largest one-sided blow-up order at `point`, probing only inside `[lo, hi]`
///
/// Each side reports the smaller of its near and far estimates, so a single noisy
/// probe pair cannot flag a convergent singularity.
fn blow_up_order(expr: &Expr, var: &str, point: f64, lo: f64, hi: f64) -> Option<f64> {
    let width = hi - lo;
    let magnitude = |x: f64| eval_at(expr, Some((var, x))).value().map(f64::abs);
    let slope = |f_near: f64, f_far: f64, near: f64, far: f64| {
        (f_near / f_far).ln() / (far / near).ln()
    };

    let mut order: Option<f64> = None;
    for side in [-1.0, 1.0] {
        let inside = if side > 0.0 { point < hi } else { point > lo };
        if !inside {
            continue;
        }
        let [near, mid, far] = PROBES.map(|h| h * width);
        let (Some(f_near), Some(f_mid), Some(f_far)) = (
            magnitude(point + side * near),
            magnitude(point + side * mid),
            magnitude(point + side * far),
        ) else {
            continue;
        };
        if f_near == 0.0 || f_mid == 0.0 || f_far == 0.0 {
            continue;
        }
        let alpha = slope(f_near, f_mid, near, mid).min(slope(f_mid, f_far, mid, far));
        order = Some(order.map_or(alpha, |o| o.max(alpha)));
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn run(text: &str, lo: f64, hi: f64) -> Result<Vec<f64>, IntegralError> {
        let expr = parse(text, "x").unwrap();
        scan(&expr, "x", lo, hi, &Deadline::unlimited())
    }

    #[test]
    fn test_simple_pole_is_not_integrable() {
        let err = run("1/x", -1.0, 1.0).unwrap_err();
        assert_eq!(err, IntegralError::Singularity { point: 0.0 });
        assert!(run("1/x^2", 0.0, 1.0).is_err());
        assert!(run("tan(x)", 1.0, 2.0).is_err());
    }

    #[test]
    fn test_weak_singularities_are_integrable() {
        assert_eq!(run("1/sqrt(abs(x))", -1.0, 1.0).unwrap(), vec![0.0]);
        assert_eq!(run("x^-0.5", 0.0, 1.0).unwrap(), vec![0.0]);
        assert_eq!(run("log(x)", 0.0, 1.0).unwrap(), vec![0.0]);
        assert_eq!(run("x^-0.95", 0.0, 1.0).unwrap(), vec![0.0]);
    }

    #[test]
    fn test_borderline_orders() {
        // Exactly order 1 at the endpoint
        assert!(run("x^-1", 0.0, 1.0).is_err());
        assert!(run("log(x)/x", 0.0, 1.0).is_err());
        assert_eq!(
            run("1/(x - 1)", 1.0, 2.0).unwrap_err(),
            IntegralError::Singularity { point: 1.0 }
        );
    }

    #[test]
    fn test_reported_points_are_positive_zero() {
        let err = run("x^-2", 0.0, 1.0).unwrap_err();
        let IntegralError::Singularity { point } = err else {
            panic!("unexpected error {:?}", err);
        };
        assert!(point.is_sign_positive());
        let points = run("x^-0.95", 0.0, 1.0).unwrap();
        assert!(points[0].is_sign_positive());
    }

    #[test]
    fn test_removable_singularity_is_recorded() {
        assert_eq!(run("sin(x)/x", -1.0, 1.0).unwrap(), vec![0.0]);
    }

    #[test]
    fn test_no_candidates_away_from_poles() {
        assert!(run("1/x", 1.0, 2.0).unwrap().is_empty());
        assert!(run("1/(x^2 + 1)", -5.0, 5.0).unwrap().is_empty());
        assert!(run("x^2 + sin(x)", -5.0, 5.0).unwrap().is_empty());
    }

    #[test]
    fn test_candidates() {
        let expr = parse("1/x + log(x - 1) + tan(x) + x^2", "x").unwrap();
        let found = candidates(&expr, "x");
        assert_eq!(found.len(), 3);
    }
}
