use super::{Decline, Method};
use crate::evaluator::{EvaluationOutcome, eval_at};
use crate::{Deadline, Expr, Integrator};

/// Everything a strategy needs to attempt one definite integral
pub(crate) struct Request<'a> {
    pub expr: &'a Expr,
    pub variable: &'a str,
    pub lower: f64,
    pub upper: f64,
    /// Integrable singular points in `[lower, upper]`, ascending
    pub singular_points: &'a [f64],
    pub deadline: &'a Deadline,
    pub config: &'a Integrator,
}

impl Request<'_> {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    #[inline]
    pub fn eval(&self, x: f64) -> EvaluationOutcome {
        eval_at(self.expr, Some((self.variable, x)))
    }

    /// First singular point strictly inside the interval
    pub fn interior_singularity(&self) -> Option<f64> {
        self.singular_points
            .iter()
            .copied()
            .find(|&p| p > self.lower && p < self.upper)
    }

    pub fn check_deadline(&self) -> Result<(), Decline> {
        self.deadline.check().map_err(Decline::from_error)
    }
}

/// A value produced by a strategy
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Estimate {
    pub value: f64,
    pub error_estimate: Option<f64>,
    /// Human-readable justification, e.g. the antiderivative used
    pub justification: Option<String>,
}

impl Estimate {
    pub fn new(value: f64, error_estimate: Option<f64>) -> Self {
        Estimate {
            value,
            error_estimate,
            justification: None,
        }
    }
}

/// One link of the integration chain
pub(crate) trait Strategy {
    fn method(&self) -> Method;

    /// Whether the strategy can run at all in this build and configuration
    fn available(&self, _config: &Integrator) -> bool {
        true
    }

    fn attempt(&self, request: &Request<'_>) -> Result<Estimate, Decline>;
}

/// The fixed chain, in order
pub(crate) fn chain() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(super::symbolic::SymbolicClosedForm),
        Box::new(AdaptiveQuadratureSlot),
        Box::new(super::discrete::DiscreteSummation),
        Box::new(super::stochastic::StochasticSampling),
    ]
}

/// Adaptive quadrature link; declines as unavailable when the feature is compiled out
struct AdaptiveQuadratureSlot;

impl Strategy for AdaptiveQuadratureSlot {
    fn method(&self) -> Method {
        Method::AdaptiveQuadrature
    }

    fn available(&self, config: &Integrator) -> bool {
        config.quadrature_available()
    }

    #[cfg(feature = "quadrature")]
    fn attempt(&self, request: &Request<'_>) -> Result<Estimate, Decline> {
        super::quadrature::attempt(request)
    }

    #[cfg(not(feature = "quadrature"))]
    fn attempt(&self, _request: &Request<'_>) -> Result<Estimate, Decline> {
        Err(Decline::Unavailable)
    }
}
