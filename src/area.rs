//! Area enclosed between two curves
//!
//! The interval is split at the interior intersections of the curves. On each segment
//! the upper curve is chosen by a majority vote over five interior samples, and the
//! segment area is |∫ (upper - lower)| computed by the integration engine.

use tracing::debug;

use crate::evaluator::eval_at;
use crate::integrate::{Method, integrate_checked};
use crate::roots::find_intersections;
use crate::{Deadline, Expr, IntegralError, Integrator};

/// Samples per segment for the upper-curve vote
const VOTE_SAMPLES: usize = 5;

/// Which of the two input curves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Curve {
    First,
    Second,
}

/// One piece of the domain between consecutive intersections
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Segment {
    pub lower: f64,
    pub upper: f64,
    pub upper_curve: Curve,
    /// The upper curve, rendered
    pub upper_label: String,
    pub area: f64,
    pub method: Method,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AreaBetween {
    /// Sum of the segment areas
    pub area: f64,
    pub segments: Vec<Segment>,
}

pub(crate) fn area_between(
    config: &Integrator,
    first: &Expr,
    second: &Expr,
    lower: f64,
    upper: f64,
    deadline: &Deadline,
) -> Result<AreaBetween, IntegralError> {
    let var = config.variable_name();
    let crossings = find_intersections(first, second, var, lower, upper, deadline)?;

    let mut edges = vec![lower];
    edges.extend(crossings.into_iter().filter(|&x| x > lower && x < upper));
    edges.push(upper);

    let mut segments = Vec::with_capacity(edges.len() - 1);
    for w in edges.windows(2) {
        let (a, b) = (w[0], w[1]);
        let curve = upper_curve(first, second, var, a, b);
        let (top, bottom) = match curve {
            Curve::First => (first, second),
            Curve::Second => (second, first),
        };

        let difference = Expr::sub_expr(top.clone(), bottom.clone());
        let result = integrate_checked(config, &difference, a, b, deadline)?;
        debug!(lower = a, upper = b, ?curve, area = result.value.abs(), "area segment");

        segments.push(Segment {
            lower: a,
            upper: b,
            upper_curve: curve,
            upper_label: top.to_string(),
            area: result.value.abs(),
            method: result.method,
        });
    }

    Ok(AreaBetween {
        area: segments.iter().map(|s| s.area).sum(),
        segments,
    })
}

/// Majority vote of sign(first - second) at interior points; ties and failures pick `First`
fn upper_curve(first: &Expr, second: &Expr, var: &str, a: f64, b: f64) -> Curve {
    let step = (b - a) / (VOTE_SAMPLES + 1) as f64;
    let (mut above, mut below) = (0, 0);
    for k in 1..=VOTE_SAMPLES {
        let x = a + k as f64 * step;
        let f = eval_at(first, Some((var, x))).value();
        let g = eval_at(second, Some((var, x))).value();
        if let (Some(f), Some(g)) = (f, g) {
            if f > g {
                above += 1;
            } else if f < g {
                below += 1;
            }
        }
    }
    if below > above { Curve::Second } else { Curve::First }
}
