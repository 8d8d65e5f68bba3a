use tracing::{debug, info, warn};

use super::singularity;
use super::strategy::{self, Estimate, Request, Strategy};
use super::{
    Attempt, AttemptOutcome, AttemptRole, Decline, Diagnostics, IntegrationReport,
    IntegrationResult, Method, Validation, ValidationStatus,
};
use crate::error::DeclinedStrategy;
use crate::traits::{approx_eq, relative_difference};
use crate::{Deadline, Expr, IntegralError, Integrator};

/// Run the strategy chain on a parsed, validated integrand over `[lower, upper]`
///
/// Bounds must already be resolved and checked. The report carries diagnostics whether
/// or not a value was produced.
pub(crate) fn run(
    config: &Integrator,
    expr: &Expr,
    lower: f64,
    upper: f64,
    deadline: &Deadline,
) -> IntegrationReport {
    let mut diagnostics = Diagnostics::empty(config, deadline.elapsed());
    let outcome = Engine {
        config,
        expr,
        lower,
        upper,
        deadline,
    }
    .integrate(&mut diagnostics);

    diagnostics.computation_time_seconds = deadline.elapsed().as_secs_f64();
    if let Ok(result) = &outcome {
        diagnostics.method_used = Some(result.method);
        diagnostics.approximation_error = result.error_estimate;
        diagnostics.validation = result.validation.clone();
    }
    IntegrationReport {
        outcome,
        diagnostics,
    }
}

/// Integrate, keeping only the outcome
pub(crate) fn integrate_checked(
    config: &Integrator,
    expr: &Expr,
    lower: f64,
    upper: f64,
    deadline: &Deadline,
) -> Result<IntegrationResult, IntegralError> {
    run(config, expr, lower, upper, deadline).outcome
}

struct Engine<'a> {
    config: &'a Integrator,
    expr: &'a Expr,
    lower: f64,
    upper: f64,
    deadline: &'a Deadline,
}

impl Engine<'_> {
    fn integrate(&self, diagnostics: &mut Diagnostics) -> Result<IntegrationResult, IntegralError> {
        let variable = self.config.variable_name();
        diagnostics.singular_points =
            singularity::scan(self.expr, variable, self.lower, self.upper, self.deadline)?;

        let request = Request {
            expr: self.expr,
            variable,
            lower: self.lower,
            upper: self.upper,
            singular_points: &diagnostics.singular_points,
            deadline: self.deadline,
            config: self.config,
        };

        let chain = strategy::chain();
        let mut attempts = Vec::new();
        let mut winner = None;
        for (index, link) in chain.iter().enumerate() {
            let outcome = self.try_link(link.as_ref(), &request);
            debug!(method = %link.method(), outcome = ?outcome, "integration attempt");
            match outcome {
                Ok(estimate) => {
                    attempts.push(Attempt {
                        method: link.method(),
                        role: AttemptRole::Primary,
                        outcome: AttemptOutcome::Succeeded {
                            value: estimate.value,
                            error_estimate: estimate.error_estimate,
                        },
                    });
                    winner = Some((index, link.method(), estimate));
                    break;
                }
                Err(Decline::Timeout { elapsed }) => {
                    diagnostics.attempts = attempts;
                    return Err(IntegralError::Timeout { elapsed });
                }
                Err(reason) => attempts.push(Attempt {
                    method: link.method(),
                    role: AttemptRole::Primary,
                    outcome: AttemptOutcome::Declined(reason),
                }),
            }
        }

        let Some((index, method, estimate)) = winner else {
            let declined = attempts
                .iter()
                .filter_map(|attempt| match &attempt.outcome {
                    AttemptOutcome::Declined(reason) => Some(DeclinedStrategy {
                        method: attempt.method,
                        reason: reason.clone(),
                    }),
                    AttemptOutcome::Succeeded { .. } => None,
                })
                .collect();
            diagnostics.attempts = attempts;
            return Err(IntegralError::IntegrationFailure { attempts: declined });
        };
        info!(%method, value = estimate.value, "integral accepted");

        let validation = match self.cross_validate(&chain[index + 1..], &request, &estimate) {
            Ok(Some((attempt, validation))) => {
                attempts.push(attempt);
                validation
            }
            Ok(None) => Validation::not_performed(),
            Err(elapsed) => {
                diagnostics.attempts = attempts;
                return Err(IntegralError::Timeout { elapsed });
            }
        };
        diagnostics.attempts = attempts;

        Ok(IntegrationResult {
            value: estimate.value,
            method,
            error_estimate: estimate.error_estimate,
            validation,
            antiderivative: estimate.justification,
        })
    }

    fn try_link(&self, link: &dyn Strategy, request: &Request<'_>) -> Result<Estimate, Decline> {
        if !self.config.is_enabled(link.method()) {
            return Err(Decline::Disabled);
        }
        if !link.available(self.config) {
            return Err(Decline::Unavailable);
        }
        request.check_deadline()?;
        link.attempt(request)
    }

    /// Run the next usable non-stochastic strategy once against the accepted estimate
    fn cross_validate(
        &self,
        rest: &[Box<dyn Strategy>],
        request: &Request<'_>,
        accepted: &Estimate,
    ) -> Result<Option<(Attempt, Validation)>, std::time::Duration> {
        let Some(partner) = rest.iter().find(|link| {
            link.method() != Method::StochasticFallback
                && self.config.is_enabled(link.method())
                && link.available(self.config)
        }) else {
            return Ok(None);
        };
        let method = partner.method();

        let estimate = match self.try_link(partner.as_ref(), request) {
            Ok(estimate) => estimate,
            Err(Decline::Timeout { elapsed }) => return Err(elapsed),
            Err(reason) => {
                debug!(%method, %reason, "validation partner declined");
                let attempt = Attempt {
                    method,
                    role: AttemptRole::Validation,
                    outcome: AttemptOutcome::Declined(reason),
                };
                let validation = Validation {
                    partner: Some(method),
                    ..Validation::not_performed()
                };
                return Ok(Some((attempt, validation)));
            }
        };

        let discrepancy = relative_difference(accepted.value, estimate.value);
        let tolerance = self.config.cross_validation_tolerance;
        let status = if approx_eq(accepted.value, estimate.value, tolerance) {
            ValidationStatus::Agreed
        } else {
            warn!(
                partner = %method,
                accepted = accepted.value,
                partner_value = estimate.value,
                discrepancy,
                "cross-validation disagreement; result is unvalidated"
            );
            ValidationStatus::Disagreed
        };

        let attempt = Attempt {
            method,
            role: AttemptRole::Validation,
            outcome: AttemptOutcome::Succeeded {
                value: estimate.value,
                error_estimate: estimate.error_estimate,
            },
        };
        let validation = Validation {
            status,
            partner: Some(method),
            partner_value: Some(estimate.value),
            discrepancy: Some(discrepancy),
        };
        Ok(Some((attempt, validation)))
    }
}
