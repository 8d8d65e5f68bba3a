//! Builder pattern API for integration requests
//!
//! Provides a fluent interface for configuring limits, deadlines and the strategy chain.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use symb_quad::{Integrator, Limits, SamplingPolicy};
//!
//! let integrator = Integrator::new()
//!     .variable("t")
//!     .timeout(Duration::from_secs(2))
//!     .limits(Limits {
//!         max_interval_width: 100.0,
//!         ..Limits::default()
//!     });
//!
//! let sum = integrator
//!     .riemann_sum("t", 0.0, 1.0, 10, SamplingPolicy::Midpoint)
//!     .unwrap();
//! assert!((sum.total - 0.5).abs() < 1e-12);
//! ```

use std::time::{Duration, Instant};

use rustc_hash::FxHashSet;

use crate::bounds::validate_interval;
use crate::integrate::{self, Diagnostics};
use crate::riemann::RiemannMode;
use crate::validation::{validate_single_variable, validate_variable_name};
use crate::{
    AreaBetween, Bound, DEFAULT_CROSS_VALIDATION_TOLERANCE, DEFAULT_DISCRETE_SUBDIVISIONS,
    DEFAULT_MAX_BOUND_MAGNITUDE, DEFAULT_MAX_DEPTH, DEFAULT_MAX_INTERVAL_WIDTH,
    DEFAULT_MAX_NODES, DEFAULT_MAX_SUBDIVISIONS, DEFAULT_STOCHASTIC_SAMPLES,
    DEFAULT_STOCHASTIC_SEED, Deadline, Expr, IntegralError, IntegrationReport, Method,
    RiemannRequest, RiemannSum, SamplingPolicy, area, parser, roots,
};

/// Resource limits applied before any numeric work
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Limits {
    /// Maximum AST depth
    pub max_depth: usize,
    /// Maximum AST node count
    pub max_nodes: usize,
    pub max_bound_magnitude: f64,
    pub max_interval_width: f64,
    /// Largest accepted Riemann subdivision count
    pub max_subdivisions: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
            max_bound_magnitude: DEFAULT_MAX_BOUND_MAGNITUDE,
            max_interval_width: DEFAULT_MAX_INTERVAL_WIDTH,
            max_subdivisions: DEFAULT_MAX_SUBDIVISIONS,
        }
    }
}

/// Builder for integration, Riemann sum and area requests
#[derive(Debug, Clone)]
pub struct Integrator {
    pub(crate) variable: String,
    pub(crate) limits: Limits,
    pub(crate) timeout: Option<Duration>,
    pub(crate) cross_validation_tolerance: f64,
    pub(crate) discrete_subdivisions: usize,
    pub(crate) stochastic_samples: usize,
    pub(crate) stochastic_seed: u64,
    pub(crate) quadrature: bool,
    pub(crate) disabled: FxHashSet<Method>,
}

impl Default for Integrator {
    fn default() -> Self {
        Integrator {
            variable: "x".to_string(),
            limits: Limits::default(),
            timeout: None,
            cross_validation_tolerance: DEFAULT_CROSS_VALIDATION_TOLERANCE,
            discrete_subdivisions: DEFAULT_DISCRETE_SUBDIVISIONS,
            stochastic_samples: DEFAULT_STOCHASTIC_SAMPLES,
            stochastic_seed: DEFAULT_STOCHASTIC_SEED,
            quadrature: true,
            disabled: FxHashSet::default(),
        }
    }
}

impl Integrator {
    /// Create a new builder with default settings (variable `x`, no timeout)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the integration variable
    pub fn variable(mut self, name: impl Into<String>) -> Self {
        self.variable = name.into();
        self
    }

    /// Set all resource limits at once
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Wall-clock budget for a whole request; expiry yields `IntegralError::Timeout`
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Relative disagreement accepted between the result and its validation partner
    pub fn cross_validation_tolerance(mut self, tolerance: f64) -> Self {
        self.cross_validation_tolerance = tolerance;
        self
    }

    /// Subdivision count of the discrete summation fallback (rounded up to even)
    pub fn discrete_subdivisions(mut self, n: usize) -> Self {
        self.discrete_subdivisions = n.max(2);
        self
    }

    /// Sample count of the stochastic fallback
    pub fn stochastic_samples(mut self, n: usize) -> Self {
        self.stochastic_samples = n.max(1);
        self
    }

    /// Seed of the stochastic fallback
    pub fn stochastic_seed(mut self, seed: u64) -> Self {
        self.stochastic_seed = seed;
        self
    }

    /// Enable or disable the adaptive quadrature subsystem at runtime
    ///
    /// Has no effect when the crate was built without the `quadrature` feature.
    pub fn quadrature(mut self, enabled: bool) -> Self {
        self.quadrature = enabled;
        self
    }

    /// Remove a strategy from the chain. The order of the remaining ones is fixed.
    pub fn disable(mut self, method: Method) -> Self {
        self.disabled.insert(method);
        self
    }

    /// Get the configured variable name
    pub fn variable_name(&self) -> &str {
        &self.variable
    }

    /// Whether adaptive quadrature is both compiled in and enabled
    pub fn quadrature_available(&self) -> bool {
        crate::QUADRATURE_AVAILABLE && self.quadrature
    }

    pub(crate) fn is_enabled(&self, method: Method) -> bool {
        !self.disabled.contains(&method)
    }

    pub(crate) fn deadline(&self) -> Deadline {
        Deadline::new(self.timeout)
    }

    /// Parse a formula and check that it only uses the configured variable
    pub fn parse(&self, text: &str) -> Result<Expr, IntegralError> {
        validate_variable_name(&self.variable)?;
        let expr = parser::parse_with_limits(
            text,
            &self.variable,
            self.limits.max_depth,
            self.limits.max_nodes,
        )?;
        validate_single_variable(&expr, &self.variable)?;
        Ok(expr)
    }

    /// Resolve and validate a pair of bounds
    pub fn resolve_bounds(
        &self,
        lower: impl Into<Bound>,
        upper: impl Into<Bound>,
    ) -> Result<(f64, f64), IntegralError> {
        let lower = lower.into().resolve(&self.variable, &self.limits)?;
        let upper = upper.into().resolve(&self.variable, &self.limits)?;
        validate_interval(lower, upper, &self.limits)?;
        Ok((lower, upper))
    }

    /// Parse a formula and integrate it over `[lower, upper]`
    ///
    /// Never panics and always returns diagnostics; failures are carried in
    /// `IntegrationReport::outcome`.
    pub fn integrate(
        &self,
        expr_text: &str,
        lower: impl Into<Bound>,
        upper: impl Into<Bound>,
    ) -> IntegrationReport {
        let started = Instant::now();
        let prepared = self
            .parse(expr_text)
            .and_then(|expr| Ok((expr, self.resolve_bounds(lower, upper)?)));

        match prepared {
            Ok((expr, (lo, hi))) => integrate::run(self, &expr, lo, hi, &self.deadline()),
            Err(err) => IntegrationReport {
                outcome: Err(err),
                diagnostics: Diagnostics::empty(self, started.elapsed()),
            },
        }
    }

    /// Integrate an already parsed expression
    pub fn integrate_expr(&self, expr: &Expr, lower: f64, upper: f64) -> IntegrationReport {
        let started = Instant::now();
        let checked = validate_variable_name(&self.variable)
            .and_then(|_| validate_single_variable(expr, &self.variable))
            .and_then(|_| Ok(validate_interval(lower, upper, &self.limits)?));

        match checked {
            Ok(()) => integrate::run(self, expr, lower, upper, &self.deadline()),
            Err(err) => IntegrationReport {
                outcome: Err(err),
                diagnostics: Diagnostics::empty(self, started.elapsed()),
            },
        }
    }

    /// Strict Riemann sum
    pub fn riemann_sum(
        &self,
        expr_text: &str,
        lower: impl Into<Bound>,
        upper: impl Into<Bound>,
        n: usize,
        policy: SamplingPolicy,
    ) -> Result<RiemannSum, IntegralError> {
        self.riemann(expr_text, lower, upper, n, policy, RiemannMode::Strict)
    }

    /// Riemann sum that substitutes zero at failing samples and reports them
    pub fn riemann_sum_best_effort(
        &self,
        expr_text: &str,
        lower: impl Into<Bound>,
        upper: impl Into<Bound>,
        n: usize,
        policy: SamplingPolicy,
    ) -> Result<RiemannSum, IntegralError> {
        self.riemann(expr_text, lower, upper, n, policy, RiemannMode::BestEffort)
    }

    fn riemann(
        &self,
        expr_text: &str,
        lower: impl Into<Bound>,
        upper: impl Into<Bound>,
        n: usize,
        policy: SamplingPolicy,
        mode: RiemannMode,
    ) -> Result<RiemannSum, IntegralError> {
        let expr = self.parse(expr_text)?;
        let (lo, hi) = self.resolve_bounds(lower, upper)?;
        RiemannRequest::new(&expr, &self.variable, lo, hi, n, policy)
            .limits(self.limits)
            .compute(mode, &self.deadline())
    }

    /// Real solutions of `expr1 = expr2` inside `domain`, ascending
    pub fn find_intersections(
        &self,
        expr1_text: &str,
        expr2_text: &str,
        domain: (f64, f64),
    ) -> Result<Vec<f64>, IntegralError> {
        let first = self.parse(expr1_text)?;
        let second = self.parse(expr2_text)?;
        let (lo, hi) = self.resolve_bounds(domain.0, domain.1)?;
        roots::find_intersections(&first, &second, &self.variable, lo, hi, &self.deadline())
    }

    /// Area enclosed between two curves over `[lower, upper]`
    pub fn area_between(
        &self,
        expr1_text: &str,
        expr2_text: &str,
        lower: impl Into<Bound>,
        upper: impl Into<Bound>,
    ) -> Result<AreaBetween, IntegralError> {
        let first = self.parse(expr1_text)?;
        let second = self.parse(expr2_text)?;
        let (lo, hi) = self.resolve_bounds(lower, upper)?;
        area::area_between(self, &first, &second, lo, hi, &self.deadline())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_defaults() {
        let integrator = Integrator::new();
        assert_eq!(integrator.variable_name(), "x");
        assert_eq!(integrator.limits, Limits::default());
        assert!(integrator.is_enabled(Method::StochasticFallback));
        assert_eq!(
            integrator.quadrature_available(),
            crate::QUADRATURE_AVAILABLE
        );
    }

    #[test]
    fn test_disable_and_quadrature_toggle() {
        let integrator = Integrator::new()
            .disable(Method::SymbolicClosedForm)
            .quadrature(false);
        assert!(!integrator.is_enabled(Method::SymbolicClosedForm));
        assert!(!integrator.quadrature_available());
    }

    #[test]
    fn test_invalid_variable_is_rejected_before_parsing() {
        let err = Integrator::new().variable("sin").parse("x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VariableMismatch);
    }

    #[test]
    fn test_limits_are_applied_when_parsing() {
        let integrator = Integrator::new().limits(Limits {
            max_nodes: 5,
            ..Limits::default()
        });
        let err = integrator.parse("x + x + x + x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_resolve_bounds() {
        let integrator = Integrator::new();
        let (lo, hi) = integrator.resolve_bounds(0, "pi").unwrap();
        assert_eq!(lo, 0.0);
        assert_eq!(hi, std::f64::consts::PI);
        let err = integrator.resolve_bounds(2.0, 1.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Bounds);
    }

    #[test]
    fn test_integrate_expr_checks_variable() {
        let expr = parser::parse("y^2", "y").unwrap();
        let report = Integrator::new().integrate_expr(&expr, 0.0, 1.0);
        assert_eq!(
            report.outcome.unwrap_err().kind(),
            ErrorKind::VariableMismatch
        );
        let report = Integrator::new().variable("y").integrate_expr(&expr, 0.0, 3.0);
        assert!((report.outcome.unwrap().value - 9.0).abs() < 1e-9);
    }
}
