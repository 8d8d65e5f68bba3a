//! Expression Parsing and Robust Definite Integration
//!
//! Turns free-form single-variable formulas into checked expression trees and computes
//! definite integrals, Riemann sums, curve intersections and areas between curves.
//!
//! # Features
//! - Forgiving parser: `**` or `^`, implicit multiplication (`2x`, `3sin(x)`),
//!   case-insensitive function names, aliases (`ln`, `arcsin`) and common misspellings
//! - Safe pointwise evaluation that classifies every failure instead of returning NaN
//! - Layered integration: closed form, adaptive Gauss-Kronrod, composite Simpson and a
//!   seeded Monte Carlo fallback, with cross-validation and a full attempt log
//! - Strict and best-effort Riemann sums
//! - **Builder pattern API** (`Integrator`) for limits, deadlines and strategy selection
//!
//! # Usage Examples
//!
//! ## String-based API
//! ```
//! use symb_quad::integrate;
//!
//! let report = integrate("x**2", 0.0, 3.0, "x");
//! assert!(report.success());
//! let result = report.outcome.unwrap();
//! assert!((result.value - 9.0).abs() < 1e-9);
//! ```
//!
//! ## Builder API
//! ```
//! use std::time::Duration;
//! use symb_quad::{Integrator, Method};
//!
//! let report = Integrator::new()
//!     .variable("t")
//!     .timeout(Duration::from_secs(5))
//!     .disable(Method::SymbolicClosedForm)
//!     .integrate("sin(t)", 0.0, "pi");
//! let result = report.outcome.unwrap();
//! assert!((result.value - 2.0).abs() < 1e-8);
//! ```

mod area;
mod ast;
mod bounds;
mod builder;
mod deadline;
mod differentiation;
mod display;
mod error;
mod evaluator;
pub mod functions;
mod integrate;
mod parser;
mod poly;
mod riemann;
mod roots;
mod sampling;
pub mod traits;
mod validation;

#[cfg(test)]
mod tests;

use num_traits::ToPrimitive;

// Re-export key types for easier usage
pub use area::{AreaBetween, Curve, Segment};
pub use ast::{Expr, ExprKind};
pub use bounds::Bound;
pub use builder::{Integrator, Limits};
pub use deadline::Deadline;
pub use error::{BoundsError, DeclinedStrategy, ErrorKind, IntegralError, ParseError, Span};
pub use evaluator::{
    EvaluationOutcome, UndefinedReason, evaluate, evaluate_constant, normalize_scalar,
};
pub use functions::{Function, NamedConstant};
pub use integrate::{
    Attempt, AttemptOutcome, AttemptRole, Decline, Diagnostics, IntegrationReport,
    IntegrationResult, Method, Validation, ValidationStatus, antiderivative,
};
pub use parser::parse;
pub use poly::Polynomial;
pub use riemann::{RiemannRequest, RiemannSum, SamplingPolicy};
pub use traits::relative_difference;

/// Default maximum AST depth
pub const DEFAULT_MAX_DEPTH: usize = 100;
/// Default maximum AST node count
pub const DEFAULT_MAX_NODES: usize = 10_000;
/// Default cap on |bound|
pub const DEFAULT_MAX_BOUND_MAGNITUDE: f64 = 1e10;
/// Default cap on upper - lower
pub const DEFAULT_MAX_INTERVAL_WIDTH: f64 = 1e6;
/// Default cap on Riemann subdivisions
pub const DEFAULT_MAX_SUBDIVISIONS: usize = 10_000_000;
/// Relative disagreement tolerated between the accepted value and its validation partner
pub const DEFAULT_CROSS_VALIDATION_TOLERANCE: f64 = 1e-6;
/// Subdivisions used by the discrete summation fallback
pub const DEFAULT_DISCRETE_SUBDIVISIONS: usize = 10_000;
/// Sample count of the stochastic fallback
pub const DEFAULT_STOCHASTIC_SAMPLES: usize = 100_000;
/// Seed of the stochastic fallback; fixed so repeated runs are bit-identical
pub const DEFAULT_STOCHASTIC_SEED: u64 = 0x5eed_2024;

/// Whether the adaptive quadrature subsystem was compiled in
pub const QUADRATURE_AVAILABLE: bool = cfg!(feature = "quadrature");

/// Parse a formula and check that it only uses `variable`
///
/// # Example
/// ```
/// use symb_quad::{ErrorKind, parse_expression};
///
/// assert!(parse_expression("2x + 3sin(x)", "x").is_ok());
/// let err = parse_expression("x + y", "x").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::VariableMismatch);
/// ```
pub fn parse_expression(text: &str, variable: &str) -> Result<Expr, IntegralError> {
    Integrator::new().variable(variable).parse(text)
}

/// Evaluate an expression at a point, classifying failures
///
/// Accepts any numeric type convertible through `ToPrimitive`; the point is normalized
/// to `f64` once on the way in.
pub fn evaluate_at<T: ToPrimitive>(expr: &Expr, variable: &str, point: T) -> EvaluationOutcome {
    evaluate(expr, variable, point)
}

/// Main API function for definite integration
///
/// # Arguments
/// * `expr_text` - Formula to integrate (e.g., "x**2 + sin(x)")
/// * `lower`, `upper` - Bounds: numbers or constant formulas such as `"pi/2"`
/// * `variable` - Integration variable (e.g., "x")
///
/// # Returns
/// An `IntegrationReport` carrying the result or error together with diagnostics.
///
/// # Note
/// For more control (timeouts, limits, strategy selection), use the `Integrator` builder:
/// ```
/// use symb_quad::Integrator;
/// let report = Integrator::new().stochastic_seed(7).integrate("exp(x)", 0.0, 1.0);
/// assert!(report.success());
/// ```
pub fn integrate(
    expr_text: &str,
    lower: impl Into<Bound>,
    upper: impl Into<Bound>,
    variable: &str,
) -> IntegrationReport {
    Integrator::new()
        .variable(variable)
        .integrate(expr_text, lower, upper)
}

/// Strict Riemann sum: any sample that fails to evaluate aborts with an error
///
/// # Example
/// ```
/// use symb_quad::{SamplingPolicy, riemann_sum};
///
/// let sum = riemann_sum("x**2", 0.0, 2.0, 4, SamplingPolicy::Left, "x").unwrap();
/// assert!((sum.total - 1.75).abs() < 1e-12);
/// ```
pub fn riemann_sum(
    expr_text: &str,
    lower: impl Into<Bound>,
    upper: impl Into<Bound>,
    n: usize,
    policy: SamplingPolicy,
    variable: &str,
) -> Result<RiemannSum, IntegralError> {
    Integrator::new()
        .variable(variable)
        .riemann_sum(expr_text, lower, upper, n, policy)
}

/// Best-effort Riemann sum: failing samples count as zero and are reported
///
/// Intended for visualization; the integration engine never uses it.
pub fn riemann_sum_best_effort(
    expr_text: &str,
    lower: impl Into<Bound>,
    upper: impl Into<Bound>,
    n: usize,
    policy: SamplingPolicy,
    variable: &str,
) -> Result<RiemannSum, IntegralError> {
    Integrator::new()
        .variable(variable)
        .riemann_sum_best_effort(expr_text, lower, upper, n, policy)
}

/// Real solutions of `expr1 = expr2` inside `domain`, ascending
///
/// # Example
/// ```
/// use symb_quad::find_intersections;
///
/// let roots = find_intersections("x**2", "4 - x**2", "x", (-3.0, 3.0)).unwrap();
/// assert_eq!(roots.len(), 2);
/// assert!((roots[1] - 2f64.sqrt()).abs() < 1e-9);
/// ```
pub fn find_intersections(
    expr1_text: &str,
    expr2_text: &str,
    variable: &str,
    domain: (f64, f64),
) -> Result<Vec<f64>, IntegralError> {
    Integrator::new()
        .variable(variable)
        .find_intersections(expr1_text, expr2_text, domain)
}

/// Area enclosed between two curves over `[lower, upper]`
///
/// # Example
/// ```
/// use symb_quad::area_between;
///
/// let area = area_between("x**2", "x", 0.0, 1.0, "x").unwrap();
/// assert!((area.area - 1.0 / 6.0).abs() < 1e-9);
/// ```
pub fn area_between(
    expr1_text: &str,
    expr2_text: &str,
    lower: impl Into<Bound>,
    upper: impl Into<Bound>,
    variable: &str,
) -> Result<AreaBetween, IntegralError> {
    Integrator::new()
        .variable(variable)
        .area_between(expr1_text, expr2_text, lower, upper)
}
