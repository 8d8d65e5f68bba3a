//! Real root finding for single-variable expressions
//!
//! Polynomials of degree ≤ 2 are solved in closed form. Everything else goes through a
//! dense scan: sign changes between neighbouring samples are refined by bisection, and
//! local minima of |g| without a sign change (tangent roots) are refined by Newton's
//! method on the symbolic derivative g′.

use crate::evaluator::eval_at;
use crate::poly::Polynomial;
use crate::traits::relative_difference;
use crate::{Deadline, Expr, IntegralError};

/// Cells of the uniform scan grid
const SCAN_CELLS: usize = 2000;
/// Bisection steps; enough to shrink any cell below one ulp
const BISECTION_STEPS: usize = 200;
const NEWTON_STEPS: usize = 50;
/// |g| accepted as zero at a refined tangent root
const TANGENT_RESIDUAL: f64 = 1e-9;
/// Curves must agree this closely at an accepted intersection
pub(crate) const INTERSECTION_AGREEMENT: f64 = 1e-6;

/// Roots of `g` in `[lo, hi]`, ascending and deduplicated
pub(crate) fn find_roots(
    g: &Expr,
    var: &str,
    lo: f64,
    hi: f64,
    deadline: &Deadline,
) -> Result<Vec<f64>, IntegralError> {
    if !g.contains_var(var) {
        // Constant: either no roots or identically zero, which has no isolated roots
        return Ok(Vec::new());
    }

    if let Some(poly) = Polynomial::from_expr(g, var) {
        if poly.degree() == 0 {
            return Ok(Vec::new());
        }
        if let Some(roots) = poly.closed_form_roots() {
            return Ok(roots
                .into_iter()
                .filter(|r| (lo..=hi).contains(r))
                .collect());
        }
    }

    let finder = RootFinder {
        g,
        var,
        derivative: g.derive(var),
        deadline,
    };
    finder.scan(lo, hi)
}

/// Real solutions of `first = second` in `[lo, hi]`, ascending
///
/// Candidates are back-substituted into both curves; values must agree within a relative
/// tolerance, which rejects sign changes of the difference across a pole.
pub(crate) fn find_intersections(
    first: &Expr,
    second: &Expr,
    var: &str,
    lo: f64,
    hi: f64,
    deadline: &Deadline,
) -> Result<Vec<f64>, IntegralError> {
    let difference = Expr::sub_expr(first.clone(), second.clone());
    let candidates = find_roots(&difference, var, lo, hi, deadline)?;

    Ok(candidates
        .into_iter()
        .filter(|&r| {
            let a = eval_at(first, Some((var, r))).value();
            let b = eval_at(second, Some((var, r))).value();
            matches!((a, b), (Some(a), Some(b)) if relative_difference(a, b) <= INTERSECTION_AGREEMENT)
        })
        .collect())
}

struct RootFinder<'a> {
    g: &'a Expr,
    var: &'a str,
    derivative: Expr,
    deadline: &'a Deadline,
}

impl RootFinder<'_> {
    fn g(&self, x: f64) -> Option<f64> {
        eval_at(self.g, Some((self.var, x))).value()
    }

    fn g_prime(&self, x: f64) -> Option<f64> {
        eval_at(&self.derivative, Some((self.var, x))).value()
    }

    fn scan(&self, lo: f64, hi: f64) -> Result<Vec<f64>, IntegralError> {
        let step = (hi - lo) / SCAN_CELLS as f64;
        let xs: Vec<f64> = (0..=SCAN_CELLS)
            .map(|i| if i == SCAN_CELLS { hi } else { lo + i as f64 * step })
            .collect();
        let mut values = Vec::with_capacity(xs.len());
        for (i, &x) in xs.iter().enumerate() {
            if i % 256 == 0 {
                self.deadline.check()?;
            }
            values.push(self.g(x));
        }

        // Identically zero (e.g. sin(x) - sin(x)) has no isolated roots
        if values.iter().flatten().all(|v| *v == 0.0) {
            return Ok(Vec::new());
        }

        let mut roots = Vec::new();
        for i in 0..xs.len() {
            let Some(gi) = values[i] else { continue };

            if gi == 0.0 {
                roots.push(xs[i]);
                continue;
            }

            // Sign change across the cell to the right
            if let Some(Some(gj)) = values.get(i + 1)
                && *gj != 0.0
                && gi.signum() != gj.signum()
                && let Some(root) = self.bisect(xs[i], xs[i + 1], gi)
            {
                roots.push(root);
            }

            // Local minimum of |g| without sign change: possible tangent root
            if i > 0
                && let (Some(Some(gl)), Some(Some(gr))) = (values.get(i - 1), values.get(i + 1))
                && gl.signum() == gi.signum()
                && gr.signum() == gi.signum()
                && gi.abs() <= gl.abs()
                && gi.abs() <= gr.abs()
                && let Some(root) = self.tangent_root(xs[i - 1], xs[i + 1], xs[i])
            {
                roots.push(root);
            }
        }

        Ok(dedup_sorted(roots, hi - lo))
    }

    /// Bisection on a bracketing cell; rejects poles where |g| blows up
    fn bisect(&self, mut a: f64, mut b: f64, mut ga: f64) -> Option<f64> {
        let bracket_scale = ga.abs().max(self.g(b)?.abs());
        for _ in 0..BISECTION_STEPS {
            let mid = 0.5 * (a + b);
            if mid <= a || mid >= b {
                break;
            }
            let gm = self.g(mid)?;
            if gm == 0.0 {
                return Some(mid);
            }
            if gm.signum() == ga.signum() {
                a = mid;
                ga = gm;
            } else {
                b = mid;
            }
        }
        let root = 0.5 * (a + b);
        let residual = self.g(root)?.abs();
        // A continuous sign change ends with a tiny residual; a pole ends with a huge one
        (residual <= bracket_scale).then_some(root)
    }

    /// Newton on g′ inside `[a, b]` starting from `x0`; accepted when g is ~0 there
    fn tangent_root(&self, a: f64, b: f64, x0: f64) -> Option<f64> {
        let mut x = x0;
        for _ in 0..NEWTON_STEPS {
            let d = self.g_prime(x)?;
            if d == 0.0 {
                break;
            }
            // Second derivative by central difference of g′
            let h = 1e-6 * (b - a).max(f64::EPSILON);
            let curvature = (self.g_prime(x + h)? - self.g_prime(x - h)?) / (2.0 * h);
            if curvature == 0.0 || !curvature.is_finite() {
                return None;
            }
            let next = x - d / curvature;
            if !(a..=b).contains(&next) {
                return None;
            }
            if (next - x).abs() <= 1e-15 * x.abs().max(1.0) {
                x = next;
                break;
            }
            x = next;
        }
        let scale = self.g(a)?.abs().max(self.g(b)?.abs()).max(1.0);
        (self.g(x)?.abs() <= TANGENT_RESIDUAL * scale).then_some(x)
    }
}

/// Sort and merge roots closer than a width-relative tolerance
pub(crate) fn dedup_sorted(mut roots: Vec<f64>, width: f64) -> Vec<f64> {
    roots.sort_by(f64::total_cmp);
    let tolerance = 1e-9 * width.max(1.0);
    let mut merged: Vec<f64> = Vec::with_capacity(roots.len());
    for r in roots {
        let r = r + 0.0;
        match merged.last() {
            Some(&last) if (r - last).abs() <= tolerance => {}
            _ => merged.push(r),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn roots(text: &str, lo: f64, hi: f64) -> Vec<f64> {
        let g = parse(text, "x").unwrap();
        find_roots(&g, "x", lo, hi, &Deadline::unlimited()).unwrap()
    }

    fn intersections(a: &str, b: &str, lo: f64, hi: f64) -> Vec<f64> {
        let a = parse(a, "x").unwrap();
        let b = parse(b, "x").unwrap();
        find_intersections(&a, &b, "x", lo, hi, &Deadline::unlimited()).unwrap()
    }

    #[test]
    fn test_quadratic_closed_form() {
        let r = intersections("x**2", "4 - x**2", -3.0, 3.0);
        assert_eq!(r.len(), 2);
        assert!((r[0] + 2f64.sqrt()).abs() < 1e-12);
        assert!((r[1] - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_domain_filter() {
        let r = intersections("x**2", "4 - x**2", 0.0, 3.0);
        assert_eq!(r.len(), 1);
        assert!(intersections("x**2", "x", 2.0, 3.0).is_empty());
    }

    #[test]
    fn test_transcendental_sign_changes() {
        let r = roots("sin(x)", 1.0, 10.0);
        assert_eq!(r.len(), 3);
        for (k, root) in r.iter().enumerate() {
            assert!((root - (k as f64 + 1.0) * std::f64::consts::PI).abs() < 1e-10);
        }
    }

    #[test]
    fn test_cubic_by_scan() {
        let r = roots("x^3 - x", -2.0, 2.0);
        assert_eq!(r.len(), 3);
        assert!((r[0] + 1.0).abs() < 1e-10);
        assert!(r[1].abs() < 1e-10);
        assert!((r[2] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_tangent_root_is_found() {
        // (x - 0.3)^2 * (x + 2) touches zero at 0.3 without changing sign
        let r = roots("(x - 0.3)^2 * (x + 2)", -1.0, 1.0);
        assert_eq!(r.len(), 1, "{:?}", r);
        assert!((r[0] - 0.3).abs() < 1e-6);

        let r = intersections("cos(x)", "1", -1.0, 1.0);
        assert_eq!(r.len(), 1);
        assert!(r[0].abs() < 1e-6);
    }

    #[test]
    fn test_poles_are_rejected() {
        // tan changes sign at pi/2 but never equals zero there
        let r = roots("tan(x)", 1.0, 2.0);
        assert!(r.is_empty(), "{:?}", r);
        let r = intersections("1/x", "0", -1.0, 1.0);
        assert!(r.is_empty());
    }

    #[test]
    fn test_coinciding_curves_have_no_isolated_roots() {
        assert!(intersections("x", "x", 0.0, 1.0).is_empty());
        assert!(intersections("sin(x)", "sin(x)", 0.0, 1.0).is_empty());
    }

    #[test]
    fn test_no_roots() {
        assert!(roots("exp(x)", -5.0, 5.0).is_empty());
        assert!(roots("3", -5.0, 5.0).is_empty());
    }
}
