//! Request validation that runs before any numeric work

use crate::functions::registry::is_reserved_name;
use crate::{Expr, IntegralError, Limits};

/// Check that `name` can serve as the integration variable
pub(crate) fn validate_variable_name(name: &str) -> Result<(), IntegralError> {
    let invalid = |reason: &str| {
        Err(IntegralError::InvalidVariable {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };

    if name.is_empty() {
        return invalid("the name is empty");
    }
    if !name.chars().all(|c| c.is_alphabetic() || c == '_') {
        return invalid("only letters and underscores are allowed");
    }
    if is_reserved_name(name) {
        return invalid("the name is reserved for a function or constant");
    }
    Ok(())
}

/// Reject expressions that mention any symbol other than `variable`
pub(crate) fn validate_single_variable(expr: &Expr, variable: &str) -> Result<(), IntegralError> {
    let mut foreign: Vec<String> = expr
        .variables()
        .into_iter()
        .filter(|name| name != variable)
        .collect();

    if foreign.is_empty() {
        return Ok(());
    }
    foreign.sort();
    Err(IntegralError::VariableMismatch {
        expected: variable.to_string(),
        found: foreign,
    })
}

/// Subdivision count must be positive and below the configured cap
pub(crate) fn validate_subdivisions(n: usize, limits: &Limits) -> Result<(), IntegralError> {
    if n == 0 || n > limits.max_subdivisions {
        return Err(IntegralError::Subdivision {
            n,
            limit: limits.max_subdivisions,
        });
    }
    Ok(())
}
