//! Per-function evaluation, derivative and antiderivative rules
//!
//! Derivatives and antiderivatives are given with respect to the function argument `u`;
//! callers apply the chain rule (derivatives) or the linear-substitution factor
//! (antiderivatives) themselves.
//!
//! # References
//! - Trigonometric and hyperbolic: DLMF §4.21-4.28, §4.35-4.37
//! - Inverse trigonometric antiderivatives: DLMF §4.26(vi)

use std::sync::Arc;

use super::{Function, call_arc, mul_opt, neg, shared};
use crate::Expr;
use crate::evaluator::{Fault, UndefinedReason};

/// Imaginary parts at or below this magnitude are treated as rounding noise
pub(crate) const NEGLIGIBLE_IMAGINARY: f64 = 1e-12;

/// Evaluation and calculus rules of a built-in function
pub(crate) struct FunctionDefinition {
    pub func: Function,

    /// Pointwise evaluation with domain classification (input is always finite)
    pub eval: fn(f64) -> Result<f64, Fault>,

    /// f'(u) as an expression in the argument
    pub derivative: fn(&Arc<Expr>) -> Expr,

    /// ∫ f(u) du as an expression in the argument
    pub antiderivative: fn(&Arc<Expr>) -> Expr,
}

/// Classify a raw f64 result produced from finite inputs
#[inline]
pub(crate) fn checked(value: f64) -> Result<f64, Fault> {
    if value.is_nan() {
        Err(Fault::Undefined(UndefinedReason::Indeterminate))
    } else if value.is_infinite() {
        Err(Fault::Overflow)
    } else {
        Ok(value)
    }
}

/// Clamp arguments of asin/acos that leave [-1, 1] only by rounding noise
fn unit_interval(u: f64) -> Result<f64, Fault> {
    if u.abs() <= 1.0 {
        Ok(u)
    } else if u.abs() - 1.0 <= NEGLIGIBLE_IMAGINARY {
        Ok(u.signum())
    } else {
        Err(Fault::NonReal)
    }
}

fn n(value: f64) -> Expr {
    Expr::number(value)
}

static DEFINITIONS: [FunctionDefinition; 12] = [
    FunctionDefinition {
        func: Function::Sin,
        eval: |u| checked(u.sin()),
        derivative: |u| call_arc(Function::Cos, u),
        antiderivative: |u| neg(call_arc(Function::Cos, u)),
    },
    FunctionDefinition {
        func: Function::Cos,
        eval: |u| checked(u.cos()),
        derivative: |u| neg(call_arc(Function::Sin, u)),
        antiderivative: |u| call_arc(Function::Sin, u),
    },
    FunctionDefinition {
        func: Function::Tan,
        eval: |u| checked(u.tan()),
        // 1 / cos(u)^2
        derivative: |u| Expr::div_expr(n(1.0), Expr::pow(call_arc(Function::Cos, u), n(2.0))),
        // -ln|cos(u)|
        antiderivative: |u| neg(Expr::call(Function::Log, Expr::abs(call_arc(Function::Cos, u)))),
    },
    FunctionDefinition {
        func: Function::Exp,
        eval: |u| checked(u.exp()),
        derivative: |u| call_arc(Function::Exp, u),
        antiderivative: |u| call_arc(Function::Exp, u),
    },
    FunctionDefinition {
        func: Function::Log,
        eval: |u| {
            if u == 0.0 {
                Err(Fault::Undefined(UndefinedReason::LogOfZero))
            } else if u < 0.0 {
                // ln(u) = ln|u| + iπ for u < 0
                Err(Fault::NonReal)
            } else {
                checked(u.ln())
            }
        },
        derivative: |u| Expr::div_expr(n(1.0), shared(u)),
        // u ln(u) - u
        antiderivative: |u| {
            Expr::sub_expr(mul_opt(shared(u), call_arc(Function::Log, u)), shared(u))
        },
    },
    FunctionDefinition {
        func: Function::Sqrt,
        eval: |u| {
            if u >= 0.0 {
                checked(u.sqrt())
            } else if (-u).sqrt() <= NEGLIGIBLE_IMAGINARY {
                Ok(0.0)
            } else {
                Err(Fault::NonReal)
            }
        },
        derivative: |u| Expr::div_expr(n(1.0), Expr::mul_expr(n(2.0), call_arc(Function::Sqrt, u))),
        // (2/3) u sqrt(u)
        antiderivative: |u| {
            Expr::mul_expr(
                n(2.0 / 3.0),
                Expr::mul_expr(shared(u), call_arc(Function::Sqrt, u)),
            )
        },
    },
    FunctionDefinition {
        func: Function::Asin,
        eval: |u| checked(unit_interval(u)?.asin()),
        derivative: |u| Expr::div_expr(n(1.0), one_minus_square_root(u)),
        // u asin(u) + sqrt(1 - u^2)
        antiderivative: |u| {
            Expr::add_expr(
                Expr::mul_expr(shared(u), call_arc(Function::Asin, u)),
                one_minus_square_root(u),
            )
        },
    },
    FunctionDefinition {
        func: Function::Acos,
        eval: |u| checked(unit_interval(u)?.acos()),
        derivative: |u| neg(Expr::div_expr(n(1.0), one_minus_square_root(u))),
        // u acos(u) - sqrt(1 - u^2)
        antiderivative: |u| {
            Expr::sub_expr(
                Expr::mul_expr(shared(u), call_arc(Function::Acos, u)),
                one_minus_square_root(u),
            )
        },
    },
    FunctionDefinition {
        func: Function::Atan,
        eval: |u| checked(u.atan()),
        derivative: |u| Expr::div_expr(n(1.0), one_plus_square(u)),
        // u atan(u) - ln(1 + u^2) / 2
        antiderivative: |u| {
            Expr::sub_expr(
                Expr::mul_expr(shared(u), call_arc(Function::Atan, u)),
                Expr::div_expr(Expr::call(Function::Log, one_plus_square(u)), n(2.0)),
            )
        },
    },
    FunctionDefinition {
        func: Function::Sinh,
        eval: |u| checked(u.sinh()),
        derivative: |u| call_arc(Function::Cosh, u),
        antiderivative: |u| call_arc(Function::Cosh, u),
    },
    FunctionDefinition {
        func: Function::Cosh,
        eval: |u| checked(u.cosh()),
        derivative: |u| call_arc(Function::Sinh, u),
        antiderivative: |u| call_arc(Function::Sinh, u),
    },
    FunctionDefinition {
        func: Function::Tanh,
        eval: |u| checked(u.tanh()),
        derivative: |u| Expr::div_expr(n(1.0), Expr::pow(call_arc(Function::Cosh, u), n(2.0))),
        antiderivative: |u| Expr::call(Function::Log, call_arc(Function::Cosh, u)),
    },
];

fn one_minus_square_root(u: &Arc<Expr>) -> Expr {
    Expr::call(
        Function::Sqrt,
        Expr::sub_expr(n(1.0), Expr::pow(shared(u), n(2.0))),
    )
}

fn one_plus_square(u: &Arc<Expr>) -> Expr {
    Expr::add_expr(n(1.0), Expr::pow(shared(u), n(2.0)))
}

/// Definition lookup - O(1), the table is ordered like `Function::ALL`
pub(crate) fn definition(func: Function) -> &'static FunctionDefinition {
    let index = match func {
        Function::Sin => 0,
        Function::Cos => 1,
        Function::Tan => 2,
        Function::Exp => 3,
        Function::Log => 4,
        Function::Sqrt => 5,
        Function::Asin => 6,
        Function::Acos => 7,
        Function::Atan => 8,
        Function::Sinh => 9,
        Function::Cosh => 10,
        Function::Tanh => 11,
    };
    &DEFINITIONS[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_enum_order() {
        for func in Function::ALL {
            assert_eq!(definition(func).func, func);
        }
    }

    #[test]
    fn test_domain_classification() {
        let log = definition(Function::Log).eval;
        assert_eq!(
            log(0.0),
            Err(Fault::Undefined(UndefinedReason::LogOfZero))
        );
        assert_eq!(log(-1.0), Err(Fault::NonReal));

        let sqrt = definition(Function::Sqrt).eval;
        assert_eq!(sqrt(-4.0), Err(Fault::NonReal));
        assert_eq!(sqrt(-1e-30), Ok(0.0));

        let asin = definition(Function::Asin).eval;
        assert_eq!(asin(1.5), Err(Fault::NonReal));
        assert!(asin(1.0 + 1e-15).is_ok());

        let exp = definition(Function::Exp).eval;
        assert_eq!(exp(1000.0), Err(Fault::Overflow));
    }
}
