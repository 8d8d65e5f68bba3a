use super::Decline;
use super::strategy::{Estimate, Request, Strategy};
use crate::Method;
use crate::riemann::{RiemannMode, RiemannRequest, SamplingPolicy};

/// Strict composite Simpson on a fine uniform grid
///
/// Any sample that does not evaluate to a finite real value makes the strategy decline;
/// nothing is ever substituted. The error estimate is the Richardson difference against
/// the half-resolution sum, |S(n) - S(n/2)| / 15.
pub(super) struct DiscreteSummation;

impl DiscreteSummation {
    fn simpson(request: &Request<'_>, n: usize) -> Result<f64, Decline> {
        let sum = RiemannRequest::new(
            request.expr,
            request.variable,
            request.lower,
            request.upper,
            n,
            SamplingPolicy::CompositeSimpson,
        )
        .limits(request.config.limits)
        .compute(RiemannMode::Strict, request.deadline)
        .map_err(Decline::from_error)?;
        Ok(sum.total)
    }
}

impl Strategy for DiscreteSummation {
    fn method(&self) -> Method {
        Method::DiscreteSummationFallback
    }

    fn attempt(&self, request: &Request<'_>) -> Result<Estimate, Decline> {
        if let Some(point) = request.interior_singularity() {
            return Err(Decline::InteriorSingularity { point });
        }

        let n = request.config.discrete_subdivisions;
        let fine = Self::simpson(request, n)?;
        if !fine.is_finite() {
            return Err(Decline::NonFinite);
        }
        let coarse = Self::simpson(request, (n / 2).max(2))?;

        Ok(Estimate::new(fine, Some((fine - coarse).abs() / 15.0)))
    }
}
