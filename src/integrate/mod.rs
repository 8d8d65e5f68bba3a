//! Layered definite integration
//!
//! A fixed chain of strategies is tried in order; the first one that produces a finite
//! real value wins. The next non-stochastic strategy in the chain then runs once as a
//! validation partner, and every attempt is recorded in the diagnostics.
//!
//! Chain:
//! 1. `SymbolicClosedForm` - antiderivative evaluated at both bounds
//! 2. `AdaptiveQuadrature` - Gauss-Kronrod G7K15 with adaptive bisection
//!    (cargo feature `quadrature`)
//! 3. `DiscreteSummationFallback` - strict composite Simpson
//! 4. `StochasticFallback` - seeded uniform Monte Carlo

mod discrete;
mod engine;
#[cfg(feature = "quadrature")]
mod quadrature;
mod singularity;
mod stochastic;
mod strategy;
mod symbolic;

use std::fmt;
use std::time::Duration;

use crate::{EvaluationOutcome, IntegralError, Integrator};

pub(crate) use engine::{integrate_checked, run};
pub use symbolic::antiderivative;

/// Integration strategies, in chain order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Method {
    SymbolicClosedForm,
    AdaptiveQuadrature,
    DiscreteSummationFallback,
    StochasticFallback,
}

impl Method {
    pub const ALL: [Method; 4] = [
        Method::SymbolicClosedForm,
        Method::AdaptiveQuadrature,
        Method::DiscreteSummationFallback,
        Method::StochasticFallback,
    ];

    /// Whether the method's value is exact up to rounding
    pub fn is_exact(self) -> bool {
        matches!(self, Method::SymbolicClosedForm)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::SymbolicClosedForm => "symbolic_closed_form",
            Method::AdaptiveQuadrature => "adaptive_quadrature",
            Method::DiscreteSummationFallback => "discrete_summation_fallback",
            Method::StochasticFallback => "stochastic_fallback",
        };
        f.write_str(name)
    }
}

/// Why a strategy did not produce a value
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Decline {
    /// No antiderivative rule matched
    NoClosedForm,
    /// A required evaluation failed
    Undefined {
        point: f64,
        outcome: EvaluationOutcome,
    },
    /// The computed value was NaN or infinite
    NonFinite,
    /// Subdivision budget exhausted before the error estimate met the tolerance
    NotConverged { error_estimate: f64 },
    /// An integrable singular point lies strictly inside the interval
    InteriorSingularity { point: f64 },
    /// Too few samples evaluated to a finite value
    InsufficientSamples { finite: usize, total: usize },
    /// The subsystem was not compiled in or is switched off
    Unavailable,
    /// Removed from the chain by configuration
    Disabled,
    /// The request deadline passed during the attempt
    Timeout { elapsed: Duration },
}

impl Decline {
    /// Map an evaluation-level error raised inside a strategy to a decline
    pub(crate) fn from_error(err: IntegralError) -> Decline {
        match err {
            IntegralError::Domain { point, reason } => Decline::Undefined {
                point,
                outcome: EvaluationOutcome::Undefined(reason),
            },
            IntegralError::Overflow { point } => Decline::Undefined {
                point,
                outcome: EvaluationOutcome::Overflow,
            },
            IntegralError::NonReal { point } => Decline::Undefined {
                point,
                outcome: EvaluationOutcome::NonReal,
            },
            IntegralError::Timeout { elapsed } => Decline::Timeout { elapsed },
            _ => Decline::NonFinite,
        }
    }
}

impl fmt::Display for Decline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decline::NoClosedForm => f.write_str("no closed-form antiderivative"),
            Decline::Undefined { point, outcome } => write!(f, "{} at {}", outcome, point),
            Decline::NonFinite => f.write_str("result is not finite"),
            Decline::NotConverged { error_estimate } => {
                write!(f, "did not converge (error estimate {:e})", error_estimate)
            }
            Decline::InteriorSingularity { point } => {
                write!(f, "singular point {} inside the interval", point)
            }
            Decline::InsufficientSamples { finite, total } => {
                write!(f, "only {} of {} samples were finite", finite, total)
            }
            Decline::Unavailable => f.write_str("subsystem unavailable"),
            Decline::Disabled => f.write_str("disabled by configuration"),
            Decline::Timeout { elapsed } => {
                write!(f, "deadline passed after {:.3}s", elapsed.as_secs_f64())
            }
        }
    }
}

/// Outcome of cross-validating the accepted value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ValidationStatus {
    Agreed,
    /// The values differ by more than the tolerance; the result is flagged unvalidated
    Disagreed,
    /// No partner strategy was available or it declined
    NotPerformed,
}

/// Cross-validation report
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Validation {
    pub status: ValidationStatus,
    pub partner: Option<Method>,
    pub partner_value: Option<f64>,
    /// Relative difference between the two values
    pub discrepancy: Option<f64>,
}

impl Validation {
    pub fn not_performed() -> Self {
        Validation {
            status: ValidationStatus::NotPerformed,
            partner: None,
            partner_value: None,
            discrepancy: None,
        }
    }

    pub fn agreed(&self) -> bool {
        self.status == ValidationStatus::Agreed
    }
}

/// A successful definite integral
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IntegrationResult {
    pub value: f64,
    pub method: Method,
    /// `None` for exact closed forms
    pub error_estimate: Option<f64>,
    pub validation: Validation,
    /// Antiderivative used by the closed-form strategy
    pub antiderivative: Option<String>,
}

/// Whether an attempt produced the result or only checked it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AttemptRole {
    Primary,
    Validation,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AttemptOutcome {
    Succeeded {
        value: f64,
        error_estimate: Option<f64>,
    },
    Declined(Decline),
}

/// One entry of the step-level justification log
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Attempt {
    pub method: Method,
    pub role: AttemptRole,
    pub outcome: AttemptOutcome,
}

/// Everything known about how a request was handled
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Diagnostics {
    pub method_used: Option<Method>,
    pub computation_time_seconds: f64,
    pub approximation_error: Option<f64>,
    pub validation: Validation,
    pub quadrature_subsystem_available: bool,
    pub attempts: Vec<Attempt>,
    /// Integrable singular points found by the pre-scan
    pub singular_points: Vec<f64>,
}

impl Diagnostics {
    pub(crate) fn empty(config: &Integrator, elapsed: Duration) -> Self {
        Diagnostics {
            method_used: None,
            computation_time_seconds: elapsed.as_secs_f64(),
            approximation_error: None,
            validation: Validation::not_performed(),
            quadrature_subsystem_available: config.quadrature_available(),
            attempts: Vec::new(),
            singular_points: Vec::new(),
        }
    }
}

/// Result of an integration request plus diagnostics, produced even on failure
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationReport {
    pub outcome: Result<IntegrationResult, IntegralError>,
    pub diagnostics: Diagnostics,
}

impl IntegrationReport {
    pub fn success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The value, if integration succeeded
    pub fn value(&self) -> Option<f64> {
        self.outcome.as_ref().ok().map(|r| r.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UndefinedReason;

    #[test]
    fn test_method_names() {
        assert_eq!(Method::SymbolicClosedForm.to_string(), "symbolic_closed_form");
        assert_eq!(Method::StochasticFallback.to_string(), "stochastic_fallback");
        assert!(Method::SymbolicClosedForm.is_exact());
        assert!(!Method::AdaptiveQuadrature.is_exact());
    }

    #[test]
    fn test_decline_from_error() {
        let decline = Decline::from_error(IntegralError::Domain {
            point: 0.0,
            reason: UndefinedReason::DivisionByZero,
        });
        assert_eq!(
            decline,
            Decline::Undefined {
                point: 0.0,
                outcome: EvaluationOutcome::Undefined(UndefinedReason::DivisionByZero)
            }
        );
        assert_eq!(
            decline.to_string(),
            "undefined (division by zero) at 0"
        );
    }
}
