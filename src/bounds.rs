//! Integration bounds: numeric literals or constant formulas such as `"pi/2"`

use std::fmt;

use num_traits::ToPrimitive;

use crate::error::BoundsError;
use crate::evaluator::{EvaluationOutcome, evaluate_constant, normalize_scalar};
use crate::{Limits, parser};

/// An interval endpoint as supplied by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Literal(f64),
    /// Constant expression text, resolved through the parser and evaluator
    Symbolic(String),
}

impl Bound {
    /// Literal bound from any numeric type; non-finite values are rejected at resolution
    pub fn literal<T: ToPrimitive>(value: T) -> Self {
        Bound::Literal(value.to_f64().unwrap_or(f64::NAN))
    }

    /// Resolve to a finite number
    ///
    /// Symbolic bounds must be constant: they may use numbers, `pi`, `e` and the
    /// built-in functions, but no variable.
    pub fn resolve(&self, variable: &str, limits: &Limits) -> Result<f64, BoundsError> {
        let value = match self {
            Bound::Literal(v) => {
                normalize_scalar(*v).map_err(|_| BoundsError::NotFinite { value: *v })?
            }
            Bound::Symbolic(text) => resolve_symbolic(text, variable, limits)?,
        };

        if value.abs() > limits.max_bound_magnitude {
            return Err(BoundsError::MagnitudeExceeded {
                value,
                limit: limits.max_bound_magnitude,
            });
        }
        Ok(value)
    }
}

fn resolve_symbolic(text: &str, variable: &str, limits: &Limits) -> Result<f64, BoundsError> {
    let not_numeric = |reason: String| BoundsError::NotNumeric {
        text: text.to_string(),
        reason,
    };

    let expr = parser::parse_with_limits(text, variable, limits.max_depth, limits.max_nodes)
        .map_err(|e| not_numeric(e.to_string()))?;

    let mut symbols: Vec<String> = expr.variables().into_iter().collect();
    if !symbols.is_empty() {
        symbols.sort();
        return Err(not_numeric(format!("contains {}", symbols.join(", "))));
    }

    match evaluate_constant(&expr) {
        EvaluationOutcome::Value(v) => Ok(v),
        EvaluationOutcome::Overflow => Err(BoundsError::NotFinite {
            value: f64::INFINITY,
        }),
        other => Err(not_numeric(other.to_string())),
    }
}

/// Check the ordering and size of a resolved interval
pub(crate) fn validate_interval(lower: f64, upper: f64, limits: &Limits) -> Result<(), BoundsError> {
    for value in [lower, upper] {
        if !value.is_finite() {
            return Err(BoundsError::NotFinite { value });
        }
        if value.abs() > limits.max_bound_magnitude {
            return Err(BoundsError::MagnitudeExceeded {
                value,
                limit: limits.max_bound_magnitude,
            });
        }
    }
    if lower >= upper {
        return Err(BoundsError::Reversed { lower, upper });
    }
    let width = upper - lower;
    if width > limits.max_interval_width {
        return Err(BoundsError::WidthExceeded {
            width,
            limit: limits.max_interval_width,
        });
    }
    Ok(())
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Literal(v) => write!(f, "{}", v),
            Bound::Symbolic(text) => f.write_str(text),
        }
    }
}

macro_rules! impl_numeric_bound {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Bound {
                fn from(value: $t) -> Self {
                    Bound::literal(value)
                }
            }
        )*
    };
}

impl_numeric_bound!(f64, f32, i32, i64, u32, u64, usize);

impl From<&str> for Bound {
    fn from(text: &str) -> Self {
        Bound::Symbolic(text.to_string())
    }
}

impl From<String> for Bound {
    fn from(text: String) -> Self {
        Bound::Symbolic(text)
    }
}

impl From<&String> for Bound {
    fn from(text: &String) -> Self {
        Bound::Symbolic(text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn resolve(bound: impl Into<Bound>) -> Result<f64, BoundsError> {
        bound.into().resolve("x", &Limits::default())
    }

    #[test]
    fn test_literal_and_symbolic() {
        assert_eq!(resolve(2), Ok(2.0));
        assert_eq!(resolve(0.5_f32), Ok(0.5));
        assert_eq!(resolve("pi"), Ok(PI));
        assert!((resolve("pi/2").unwrap() - PI / 2.0).abs() < 1e-15);
        assert!((resolve("2e").unwrap() - 2.0 * std::f64::consts::E).abs() < 1e-15);
        assert!((resolve("sqrt(2)").unwrap() - 2f64.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn test_symbolic_bound_must_be_constant() {
        assert!(matches!(resolve("x + 1"), Err(BoundsError::NotNumeric { .. })));
        assert!(matches!(resolve("abc"), Err(BoundsError::NotNumeric { .. })));
        assert!(matches!(resolve("1/0"), Err(BoundsError::NotNumeric { .. })));
        assert!(matches!(resolve("(1"), Err(BoundsError::NotNumeric { .. })));
    }

    #[test]
    fn test_non_finite_literal() {
        assert!(matches!(
            resolve(f64::INFINITY),
            Err(BoundsError::NotFinite { .. })
        ));
        assert!(matches!(resolve(f64::NAN), Err(BoundsError::NotFinite { .. })));
    }

    #[test]
    fn test_magnitude_cap() {
        assert!(matches!(
            resolve(1e12),
            Err(BoundsError::MagnitudeExceeded { .. })
        ));
    }

    #[test]
    fn test_interval_checks() {
        let limits = Limits::default();
        assert!(validate_interval(0.0, 1.0, &limits).is_ok());
        assert_eq!(
            validate_interval(1.0, 1.0, &limits),
            Err(BoundsError::Reversed {
                lower: 1.0,
                upper: 1.0
            })
        );
        assert!(matches!(
            validate_interval(-1e6, 1e6, &limits),
            Err(BoundsError::WidthExceeded { .. })
        ));
    }
}
