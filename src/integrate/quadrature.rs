//! Adaptive Gauss-Kronrod quadrature
//!
//! The G7K15 pair evaluates 15 points per panel; the Kronrod value is the estimate and
//! |Kronrod - Gauss| the error. Panels are bisected largest-error first until the
//! summed error meets the tolerance. Integrable singular points found by the pre-scan
//! become panel boundaries, so no node ever lands on them.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::trace;

use super::Decline;
use super::strategy::{Estimate, Request};
use crate::Deadline;
use crate::evaluator::EvaluationOutcome;

const ABS_TOLERANCE: f64 = 1e-10;
const REL_TOLERANCE: f64 = 1e-10;
const MAX_SUBDIVISIONS: usize = 2000;

/// Kronrod nodes on [0, 1]; the negative half is symmetric
const KRONROD_NODES: [f64; 8] = [
    0.0,
    0.207_784_955_007_898_467_600_689_403_773_245,
    0.405_845_151_377_397_166_906_606_412_076_961,
    0.586_087_235_467_691_130_294_144_838_258_730,
    0.741_531_185_599_394_439_863_864_773_280_788,
    0.864_864_423_359_769_072_789_712_788_640_926,
    0.949_107_912_342_758_524_526_189_684_047_851,
    0.991_455_371_120_812_639_206_854_697_526_329,
];

const KRONROD_WEIGHTS: [f64; 8] = [
    0.209_482_141_084_727_828_012_999_174_891_714,
    0.204_432_940_075_298_892_414_161_999_234_649,
    0.190_350_578_064_785_409_913_256_402_421_014,
    0.169_004_726_639_267_902_826_583_426_598_550,
    0.140_653_259_715_525_918_745_189_590_510_238,
    0.104_790_010_322_250_183_839_876_322_541_518,
    0.063_092_092_629_978_553_290_700_663_189_204,
    0.022_935_322_010_529_224_963_732_008_058_970,
];

/// Gauss weights for Kronrod indices 0, 2, 4, 6
const GAUSS_WEIGHTS: [f64; 4] = [
    0.417_959_183_673_469_387_755_102_040_816_327,
    0.381_830_050_505_118_944_950_369_775_488_975,
    0.279_705_391_489_276_667_901_467_771_423_780,
    0.129_484_966_168_869_693_270_611_432_679_082,
];

/// A panel with its contribution and error estimate
#[derive(Clone, Debug)]
struct Panel {
    a: f64,
    b: f64,
    value: f64,
    error: f64,
}

impl PartialEq for Panel {
    fn eq(&self, other: &Self) -> bool {
        self.error == other.error
    }
}

impl Eq for Panel {}

impl PartialOrd for Panel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Panel {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap by error (largest error first)
        self.error.total_cmp(&other.error)
    }
}

/// Result of adaptive integration over one or more pieces
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct AdaptiveResult {
    pub value: f64,
    pub error: f64,
    pub panels: usize,
    pub converged: bool,
}

/// Apply the G7K15 pair to `[a, b]`
fn gauss_kronrod<F>(f: &F, a: f64, b: f64) -> Result<Panel, Decline>
where
    F: Fn(f64) -> Result<f64, Decline>,
{
    let mid = 0.5 * (a + b);
    let half_length = 0.5 * (b - a);

    let f_center = f(mid)?;
    let mut kronrod_sum = KRONROD_WEIGHTS[0] * f_center;
    let mut gauss_sum = GAUSS_WEIGHTS[0] * f_center;

    for i in 1..KRONROD_NODES.len() {
        let offset = half_length * KRONROD_NODES[i];
        let f_sum = f(mid - offset)? + f(mid + offset)?;
        kronrod_sum += KRONROD_WEIGHTS[i] * f_sum;
        if i % 2 == 0 {
            gauss_sum += GAUSS_WEIGHTS[i / 2] * f_sum;
        }
    }

    let value = half_length * kronrod_sum;
    let gauss_value = half_length * gauss_sum;
    Ok(Panel {
        a,
        b,
        value,
        error: (value - gauss_value).abs(),
    })
}

fn tolerance(value: f64) -> f64 {
    ABS_TOLERANCE.max(REL_TOLERANCE * value.abs())
}

/// Adaptive bisection on a single piece
pub(crate) fn adaptive_integrate<F>(
    f: &F,
    a: f64,
    b: f64,
    max_subdivisions: usize,
    deadline: &Deadline,
) -> Result<AdaptiveResult, Decline>
where
    F: Fn(f64) -> Result<f64, Decline>,
{
    let initial = gauss_kronrod(f, a, b)?;
    let mut total_value = initial.value;
    let mut total_error = initial.error;

    // Priority queue ordered by error (largest first)
    let mut heap = BinaryHeap::new();
    heap.push(initial);

    let mut subdivisions = 0;
    while total_error > tolerance(total_value) && subdivisions < max_subdivisions {
        deadline.check().map_err(Decline::from_error)?;
        subdivisions += 1;

        let Some(panel) = heap.pop() else { break };
        let mid = 0.5 * (panel.a + panel.b);
        if mid <= panel.a || mid >= panel.b {
            // Cannot split further in floating point
            heap.push(panel);
            break;
        }

        let left = gauss_kronrod(f, panel.a, mid)?;
        let right = gauss_kronrod(f, mid, panel.b)?;

        total_value += left.value + right.value - panel.value;
        total_error += left.error + right.error - panel.error;
        heap.push(left);
        heap.push(right);
    }

    // Re-sum to shed the drift of incremental updates
    let value: f64 = heap.iter().map(|p| p.value).sum();
    let error: f64 = heap.iter().map(|p| p.error).sum();
    Ok(AdaptiveResult {
        value,
        error,
        panels: heap.len(),
        converged: error <= tolerance(value),
    })
}

/// Adaptive integration with the given break points as panel boundaries
pub(crate) fn adaptive_integrate_with_breaks<F>(
    f: &F,
    a: f64,
    b: f64,
    breaks: &[f64],
    deadline: &Deadline,
) -> Result<AdaptiveResult, Decline>
where
    F: Fn(f64) -> Result<f64, Decline>,
{
    let mut points = vec![a];
    points.extend(breaks.iter().copied().filter(|&p| p > a && p < b));
    points.push(b);

    let pieces = points.len() - 1;
    let per_piece = (MAX_SUBDIVISIONS / pieces).max(50);

    let mut result = AdaptiveResult {
        value: 0.0,
        error: 0.0,
        panels: 0,
        converged: true,
    };
    for w in points.windows(2) {
        let piece = adaptive_integrate(f, w[0], w[1], per_piece, deadline)?;
        result.value += piece.value;
        result.error += piece.error;
        result.panels += piece.panels;
        result.converged &= piece.converged;
    }
    Ok(result)
}

pub(super) fn attempt(request: &Request<'_>) -> Result<Estimate, Decline> {
    let f = |x: f64| match request.eval(x) {
        EvaluationOutcome::Value(v) => Ok(v),
        outcome => Err(Decline::Undefined { point: x, outcome }),
    };

    let result = adaptive_integrate_with_breaks(
        &f,
        request.lower,
        request.upper,
        request.singular_points,
        request.deadline,
    )?;
    trace!(
        value = result.value,
        error = result.error,
        panels = result.panels,
        "adaptive quadrature finished"
    );

    if !result.value.is_finite() {
        return Err(Decline::NonFinite);
    }
    if !result.converged {
        return Err(Decline::NotConverged {
            error_estimate: result.error,
        });
    }
    Ok(Estimate::new(result.value, Some(result.error)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn integrate<F: Fn(f64) -> f64>(f: F, a: f64, b: f64) -> AdaptiveResult {
        let wrapped = |x: f64| Ok(f(x));
        adaptive_integrate(&wrapped, a, b, MAX_SUBDIVISIONS, &Deadline::unlimited()).unwrap()
    }

    #[test]
    fn test_single_panel_is_exact_for_smooth_functions() {
        let result = integrate(|x| x * x, 0.0, 1.0);
        assert!((result.value - 1.0 / 3.0).abs() < 1e-14);
        assert!(result.converged);

        let result = integrate(f64::sin, 0.0, PI);
        assert!((result.value - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_endpoint_singularity_converges() {
        // ∫₀¹ 1/√x dx = 2
        let result = integrate(|x| 1.0 / x.sqrt(), 0.0, 1.0);
        assert!(result.converged, "{:?}", result);
        assert!((result.value - 2.0).abs() < 1e-8);
    }

    #[test]
    fn test_breaks_split_at_interior_points() {
        // ∫₋₁¹ 1/√|x| dx = 4
        let f = |x: f64| Ok(1.0 / x.abs().sqrt());
        let result =
            adaptive_integrate_with_breaks(&f, -1.0, 1.0, &[0.0], &Deadline::unlimited()).unwrap();
        assert!(result.converged);
        assert!((result.value - 4.0).abs() < 1e-7);
    }

    #[test]
    fn test_failing_node_declines() {
        let f = |x: f64| {
            if x > 0.5 {
                Err(Decline::NonFinite)
            } else {
                Ok(x)
            }
        };
        let err = adaptive_integrate(&f, 0.0, 1.0, 10, &Deadline::unlimited()).unwrap_err();
        assert_eq!(err, Decline::NonFinite);
    }

    #[test]
    fn test_budget_exhaustion_is_not_converged() {
        // Strong oscillation with a tiny budget
        let result = integrate_with_budget(|x| (200.0 * x).sin() * x.exp(), 0.0, 10.0, 1);
        assert!(!result.converged);
    }

    fn integrate_with_budget<F: Fn(f64) -> f64>(
        f: F,
        a: f64,
        b: f64,
        budget: usize,
    ) -> AdaptiveResult {
        let wrapped = |x: f64| Ok(f(x));
        adaptive_integrate(&wrapped, a, b, budget, &Deadline::unlimited()).unwrap()
    }
}
