//! Safe pointwise evaluation
//!
//! Substitutes a point for the declared variable and reduces the tree to an `f64`,
//! classifying every failure instead of letting NaN or infinities leak into sums.
//!
//! # Example
//! ```
//! use symb_quad::{EvaluationOutcome, evaluate_at, parse_expression};
//!
//! let expr = parse_expression("1/x", "x").unwrap();
//! assert_eq!(evaluate_at(&expr, "x", 4), EvaluationOutcome::Value(0.25));
//! assert!(matches!(evaluate_at(&expr, "x", 0.0), EvaluationOutcome::Undefined(_)));
//! ```

use std::fmt;

use num_traits::ToPrimitive;

use crate::functions::definition;
use crate::functions::definitions::{NEGLIGIBLE_IMAGINARY, checked};
use crate::{Expr, ExprKind};

/// Why a value is undefined at a point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum UndefinedReason {
    DivisionByZero,
    LogOfZero,
    /// NaN produced by the arithmetic itself (e.g. inf - inf)
    Indeterminate,
    /// A numeric input was NaN or infinite
    NonFiniteInput,
    /// A symbol other than the evaluation variable was encountered
    UnboundSymbol,
}

impl fmt::Display for UndefinedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UndefinedReason::DivisionByZero => "division by zero",
            UndefinedReason::LogOfZero => "logarithm of zero",
            UndefinedReason::Indeterminate => "indeterminate form",
            UndefinedReason::NonFiniteInput => "non-finite input",
            UndefinedReason::UnboundSymbol => "unbound symbol",
        };
        f.write_str(text)
    }
}

/// Result of evaluating an expression at a point. Never a panic.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum EvaluationOutcome {
    Value(f64),
    Undefined(UndefinedReason),
    Overflow,
    NonReal,
}

impl EvaluationOutcome {
    pub fn value(self) -> Option<f64> {
        match self {
            EvaluationOutcome::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_value(self) -> bool {
        matches!(self, EvaluationOutcome::Value(_))
    }

    /// Turn a failed outcome into the matching error, naming the point
    pub fn into_result(self, point: f64) -> Result<f64, crate::IntegralError> {
        match self {
            EvaluationOutcome::Value(v) => Ok(v),
            EvaluationOutcome::Undefined(reason) => {
                Err(crate::IntegralError::Domain { point, reason })
            }
            EvaluationOutcome::Overflow => Err(crate::IntegralError::Overflow { point }),
            EvaluationOutcome::NonReal => Err(crate::IntegralError::NonReal { point }),
        }
    }
}

impl fmt::Display for EvaluationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationOutcome::Value(v) => write!(f, "{}", v),
            EvaluationOutcome::Undefined(reason) => write!(f, "undefined ({})", reason),
            EvaluationOutcome::Overflow => f.write_str("overflow"),
            EvaluationOutcome::NonReal => f.write_str("non-real result"),
        }
    }
}

/// Internal failure type threaded through the recursive evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Fault {
    Undefined(UndefinedReason),
    Overflow,
    NonReal,
}

impl From<Fault> for EvaluationOutcome {
    fn from(fault: Fault) -> Self {
        match fault {
            Fault::Undefined(reason) => EvaluationOutcome::Undefined(reason),
            Fault::Overflow => EvaluationOutcome::Overflow,
            Fault::NonReal => EvaluationOutcome::NonReal,
        }
    }
}

/// Convert any external numeric value to the canonical scalar type.
///
/// Every number entering the core passes through here before comparison or
/// arithmetic: integers, `f32`, and foreign scalar types implementing `ToPrimitive`
/// all come out as a finite `f64` or a classified failure.
pub fn normalize_scalar<T: ToPrimitive>(value: T) -> Result<f64, UndefinedReason> {
    match value.to_f64() {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(UndefinedReason::NonFiniteInput),
    }
}

/// Evaluate `expr` with `variable` bound to `point`
pub fn evaluate<T: ToPrimitive>(expr: &Expr, variable: &str, point: T) -> EvaluationOutcome {
    match normalize_scalar(point) {
        Ok(x) => eval_at(expr, Some((variable, x))),
        Err(reason) => EvaluationOutcome::Undefined(reason),
    }
}

/// Evaluate an expression that must not contain any symbol
pub fn evaluate_constant(expr: &Expr) -> EvaluationOutcome {
    eval_at(expr, None)
}

/// Hot-path evaluation for already normalized points
#[inline]
pub(crate) fn eval_at(expr: &Expr, binding: Option<(&str, f64)>) -> EvaluationOutcome {
    let evaluator = Evaluator { binding };
    match evaluator.eval(expr) {
        Ok(v) => EvaluationOutcome::Value(v),
        Err(fault) => fault.into(),
    }
}

struct Evaluator<'a> {
    binding: Option<(&'a str, f64)>,
}

impl Evaluator<'_> {
    fn eval(&self, expr: &Expr) -> Result<f64, Fault> {
        match &expr.kind {
            ExprKind::Number(n) => normalize_scalar(*n).map_err(Fault::Undefined),
            ExprKind::Constant(c) => Ok(c.value()),
            ExprKind::Symbol(name) => match self.binding {
                Some((var, x)) if var == name => Ok(x),
                _ => Err(Fault::Undefined(UndefinedReason::UnboundSymbol)),
            },
            ExprKind::Add(l, r) => checked(self.eval(l)? + self.eval(r)?),
            ExprKind::Sub(l, r) => checked(self.eval(l)? - self.eval(r)?),
            ExprKind::Mul(l, r) => checked(self.eval(l)? * self.eval(r)?),
            ExprKind::Div(l, r) => {
                let num = self.eval(l)?;
                let den = self.eval(r)?;
                if den == 0.0 {
                    return Err(Fault::Undefined(UndefinedReason::DivisionByZero));
                }
                checked(num / den)
            }
            ExprKind::Pow(base, exponent) => power(self.eval(base)?, self.eval(exponent)?),
            ExprKind::Neg(inner) => Ok(-self.eval(inner)?),
            ExprKind::Abs(inner) => Ok(self.eval(inner)?.abs()),
            ExprKind::Call { func, arg } => (definition(*func).eval)(self.eval(arg)?),
        }
    }
}

/// Real power with principal-branch semantics
fn power(base: f64, exponent: f64) -> Result<f64, Fault> {
    if base == 0.0 && exponent < 0.0 {
        return Err(Fault::Undefined(UndefinedReason::DivisionByZero));
    }
    if base < 0.0 && exponent.fract() != 0.0 {
        // Principal value: |b|^p (cos πp + i sin πp)
        let imaginary = base.abs().powf(exponent) * (std::f64::consts::PI * exponent).sin();
        if imaginary.abs() > NEGLIGIBLE_IMAGINARY {
            return Err(Fault::NonReal);
        }
        let real = base.abs().powf(exponent) * (std::f64::consts::PI * exponent).cos();
        return checked(real);
    }
    checked(base.powf(exponent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn eval_str(text: &str, x: f64) -> EvaluationOutcome {
        let expr = parse(text, "x").unwrap();
        evaluate(&expr, "x", x)
    }

    #[test]
    fn test_basic_values() {
        assert_eq!(eval_str("x^2 + 1", 3.0), EvaluationOutcome::Value(10.0));
        assert_eq!(eval_str("-x^2", 3.0), EvaluationOutcome::Value(-9.0));
        assert_eq!(eval_str("abs(x - 5)", 3.0), EvaluationOutcome::Value(2.0));
        let v = eval_str("sin(pi/2) + e", 0.0).value().unwrap();
        assert!((v - (1.0 + std::f64::consts::E)).abs() < 1e-12);
    }

    #[test]
    fn test_failures_are_distinct() {
        assert_eq!(
            eval_str("1/x", 0.0),
            EvaluationOutcome::Undefined(UndefinedReason::DivisionByZero)
        );
        assert_eq!(
            eval_str("log(x)", 0.0),
            EvaluationOutcome::Undefined(UndefinedReason::LogOfZero)
        );
        assert_eq!(eval_str("log(x)", -2.0), EvaluationOutcome::NonReal);
        assert_eq!(eval_str("sqrt(x)", -2.0), EvaluationOutcome::NonReal);
        assert_eq!(eval_str("exp(x)", 1000.0), EvaluationOutcome::Overflow);
        assert_eq!(eval_str("x^0.5", -4.0), EvaluationOutcome::NonReal);
        assert_eq!(
            eval_str("x^-1", 0.0),
            EvaluationOutcome::Undefined(UndefinedReason::DivisionByZero)
        );
    }

    #[test]
    fn test_negative_base_integer_exponent_is_real() {
        assert_eq!(eval_str("x^3", -2.0), EvaluationOutcome::Value(-8.0));
    }

    #[test]
    fn test_overflow_from_arithmetic() {
        assert_eq!(eval_str("x * x", 1e200), EvaluationOutcome::Overflow);
    }

    #[test]
    fn test_normalization_of_foreign_scalars() {
        let expr = parse("x + 1", "x").unwrap();
        assert_eq!(evaluate(&expr, "x", 2_i32), EvaluationOutcome::Value(3.0));
        assert_eq!(evaluate(&expr, "x", 0.5_f32), EvaluationOutcome::Value(1.5));
        assert_eq!(evaluate(&expr, "x", 7_u64), EvaluationOutcome::Value(8.0));
        assert_eq!(
            evaluate(&expr, "x", f64::NAN),
            EvaluationOutcome::Undefined(UndefinedReason::NonFiniteInput)
        );
    }

    #[test]
    fn test_unbound_symbol() {
        let expr = parse("x + y", "x").unwrap();
        assert_eq!(
            evaluate(&expr, "x", 1.0),
            EvaluationOutcome::Undefined(UndefinedReason::UnboundSymbol)
        );
        assert_eq!(
            evaluate_constant(&parse("2*pi", "x").unwrap()),
            EvaluationOutcome::Value(2.0 * std::f64::consts::PI)
        );
    }

    #[test]
    fn test_into_result_names_point() {
        let err = EvaluationOutcome::NonReal.into_result(-1.0).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NonRealResult);
    }
}
