//! Riemann sums over a uniform partition
//!
//! Two explicit entry points exist. The strict one aborts on the first sample that does
//! not evaluate to a finite real value and names the point. The best-effort one counts
//! such samples as zero, reports them in `substituted_points` and logs a warning; it
//! is meant for plotting and is never used by the integration engine.

use std::fmt;

use tracing::warn;

use crate::bounds::validate_interval;
use crate::evaluator::EvaluationOutcome;
use crate::sampling::evaluate_points;
use crate::validation::validate_subdivisions;
use crate::{Deadline, Expr, IntegralError, Limits};

/// Where each subinterval is sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SamplingPolicy {
    Left,
    Right,
    Midpoint,
    /// Weights 1, 4, 2, ..., 4, 1 times Δ/3; odd counts are rounded up by one
    CompositeSimpson,
}

impl SamplingPolicy {
    pub const ALL: [SamplingPolicy; 4] = [
        SamplingPolicy::Left,
        SamplingPolicy::Right,
        SamplingPolicy::Midpoint,
        SamplingPolicy::CompositeSimpson,
    ];

    /// Subdivision count actually used for a requested `n`
    pub fn effective_subdivisions(self, n: usize) -> usize {
        match self {
            SamplingPolicy::CompositeSimpson if n % 2 == 1 => n + 1,
            _ => n,
        }
    }
}

impl fmt::Display for SamplingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SamplingPolicy::Left => "left",
            SamplingPolicy::Right => "right",
            SamplingPolicy::Midpoint => "midpoint",
            SamplingPolicy::CompositeSimpson => "simpson",
        };
        f.write_str(name)
    }
}

/// Result of a Riemann sum
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RiemannSum {
    pub total: f64,
    /// One area per subinterval, or per parabolic panel (two subintervals) for Simpson
    pub per_interval: Vec<f64>,
    pub policy: SamplingPolicy,
    /// Subdivision count after Simpson rounding
    pub subdivisions: usize,
    pub step: f64,
    /// Points whose value was replaced by zero (best-effort sums only)
    pub substituted_points: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RiemannMode {
    Strict,
    BestEffort,
}

/// A Riemann sum over an already parsed expression
#[derive(Debug, Clone)]
pub struct RiemannRequest<'a> {
    expr: &'a Expr,
    variable: &'a str,
    lower: f64,
    upper: f64,
    n: usize,
    policy: SamplingPolicy,
    limits: Limits,
}

impl<'a> RiemannRequest<'a> {
    pub fn new(
        expr: &'a Expr,
        variable: &'a str,
        lower: f64,
        upper: f64,
        n: usize,
        policy: SamplingPolicy,
    ) -> Self {
        RiemannRequest {
            expr,
            variable,
            lower,
            upper,
            n,
            policy,
            limits: Limits::default(),
        }
    }

    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Strict sum: the first failing sample aborts with an error naming the point
    pub fn sum(&self) -> Result<RiemannSum, IntegralError> {
        self.compute(RiemannMode::Strict, &Deadline::unlimited())
    }

    /// Best-effort sum: failing samples count as zero and are reported
    pub fn sum_best_effort(&self) -> Result<RiemannSum, IntegralError> {
        self.compute(RiemannMode::BestEffort, &Deadline::unlimited())
    }

    pub(crate) fn compute(
        &self,
        mode: RiemannMode,
        deadline: &Deadline,
    ) -> Result<RiemannSum, IntegralError> {
        validate_subdivisions(self.n, &self.limits)?;
        validate_interval(self.lower, self.upper, &self.limits)?;

        let n = self.policy.effective_subdivisions(self.n);
        let step = (self.upper - self.lower) / n as f64;
        let points = self.sample_points(n, step);
        let outcomes = evaluate_points(self.expr, self.variable, &points, deadline)?;

        let mut substituted_points = Vec::new();
        let mut values = Vec::with_capacity(outcomes.len());
        for (&point, outcome) in points.iter().zip(&outcomes) {
            match (outcome, mode) {
                (EvaluationOutcome::Value(v), _) => values.push(*v),
                (_, RiemannMode::Strict) => {
                    outcome.into_result(point)?;
                }
                (_, RiemannMode::BestEffort) => {
                    substituted_points.push(point);
                    values.push(0.0);
                }
            }
        }

        if !substituted_points.is_empty() {
            warn!(
                count = substituted_points.len(),
                first = substituted_points[0],
                "best-effort Riemann sum substituted zero at undefined samples"
            );
        }

        let (total, per_interval) = match self.policy {
            SamplingPolicy::CompositeSimpson => {
                let panels: Vec<f64> = values
                    .windows(3)
                    .step_by(2)
                    .map(|w| step / 3.0 * (w[0] + 4.0 * w[1] + w[2]))
                    .collect();
                (panels.iter().sum(), panels)
            }
            _ => {
                let total = step * values.iter().sum::<f64>();
                (total, values.iter().map(|v| step * v).collect())
            }
        };

        Ok(RiemannSum {
            total,
            per_interval,
            policy: self.policy,
            subdivisions: n,
            step,
            substituted_points,
        })
    }

    fn sample_points(&self, n: usize, step: f64) -> Vec<f64> {
        // Endpoint indices map to the exact bounds, not lower + n * step
        let at = |position: f64| {
            if position >= n as f64 {
                self.upper
            } else {
                self.lower + position * step
            }
        };
        match self.policy {
            SamplingPolicy::Left => (0..n).map(|i| at(i as f64)).collect(),
            SamplingPolicy::Right => (1..=n).map(|i| at(i as f64)).collect(),
            SamplingPolicy::Midpoint => (0..n).map(|i| at(i as f64 + 0.5)).collect(),
            SamplingPolicy::CompositeSimpson => (0..=n).map(|i| at(i as f64)).collect(),
        }
    }
}
