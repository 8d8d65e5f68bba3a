//! Seeded uniform sampling
//!
//! Points are drawn from a ChaCha8 stream seeded with the configured seed, so the same
//! request always yields the same bits. Non-finite samples are skipped; when too many
//! are skipped the integrand is not meaningfully real on the interval and the strategy
//! declines.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::Decline;
use super::strategy::{Estimate, Request, Strategy};
use crate::Method;
use crate::evaluator::EvaluationOutcome;
use crate::sampling::evaluate_points;

/// Reported error, relative to the value
const RELATIVE_ERROR: f64 = 0.02;
/// Fraction of samples that must evaluate to a finite value
const MIN_FINITE_FRACTION: f64 = 0.99;

pub(super) struct StochasticSampling;

impl Strategy for StochasticSampling {
    fn method(&self) -> Method {
        Method::StochasticFallback
    }

    fn attempt(&self, request: &Request<'_>) -> Result<Estimate, Decline> {
        let total = request.config.stochastic_samples;
        let mut rng = ChaCha8Rng::seed_from_u64(request.config.stochastic_seed);
        let points: Vec<f64> = (0..total)
            .map(|_| rng.gen_range(request.lower..request.upper))
            .collect();

        let outcomes = evaluate_points(request.expr, request.variable, &points, request.deadline)
            .map_err(Decline::from_error)?;

        // Summed in sample order so parallel evaluation cannot change the bits
        let mut sum = 0.0;
        let mut finite = 0usize;
        for outcome in outcomes {
            if let EvaluationOutcome::Value(v) = outcome {
                sum += v;
                finite += 1;
            }
        }
        if finite == 0 || (finite as f64) < MIN_FINITE_FRACTION * total as f64 {
            return Err(Decline::InsufficientSamples { finite, total });
        }

        let value = sum / finite as f64 * request.width();
        if !value.is_finite() {
            return Err(Decline::NonFinite);
        }
        Ok(Estimate::new(value, Some(RELATIVE_ERROR * value.abs())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::{Deadline, Integrator};

    fn attempt(text: &str, lo: f64, hi: f64, config: &Integrator) -> Result<Estimate, Decline> {
        let expr = parse(text, "x").unwrap();
        let deadline = Deadline::unlimited();
        let request = Request {
            expr: &expr,
            variable: "x",
            lower: lo,
            upper: hi,
            singular_points: &[],
            deadline: &deadline,
            config,
        };
        StochasticSampling.attempt(&request)
    }

    #[test]
    fn test_estimate_is_close() {
        let estimate = attempt("x^2", 0.0, 3.0, &Integrator::new()).unwrap();
        assert!((estimate.value - 9.0).abs() < 0.2, "{}", estimate.value);
        assert!((estimate.error_estimate.unwrap() - 0.02 * estimate.value).abs() < 1e-12);
    }

    #[test]
    fn test_same_seed_same_bits() {
        let config = Integrator::new().stochastic_samples(5000);
        let a = attempt("sin(x) * exp(x)", 0.0, 2.0, &config).unwrap();
        let b = attempt("sin(x) * exp(x)", 0.0, 2.0, &config).unwrap();
        assert_eq!(a.value.to_bits(), b.value.to_bits());

        let other = attempt("sin(x) * exp(x)", 0.0, 2.0, &config.clone().stochastic_seed(7))
            .unwrap();
        assert_ne!(a.value.to_bits(), other.value.to_bits());
    }

    #[test]
    fn test_mostly_non_real_declines() {
        let err = attempt("sqrt(x)", -1.0, 1.0, &Integrator::new().stochastic_samples(1000))
            .unwrap_err();
        assert!(matches!(err, Decline::InsufficientSamples { total: 1000, .. }));
    }
}
