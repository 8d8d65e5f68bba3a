//! Fixed function and constant vocabulary
//!
//! This module is the single source of truth for the built-in functions: their
//! canonical names, accepted spellings, pointwise evaluation with domain
//! classification, derivatives, and antiderivatives of `f(u)` with respect to `u`.

use std::fmt;
use std::sync::Arc;

use crate::{Expr, ExprKind};

pub(crate) mod definitions;
pub(crate) mod registry;

pub(crate) use definitions::definition;

/// Built-in single-argument functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Exp,
    Log,
    Sqrt,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
}

impl Function {
    pub const ALL: [Function; 12] = [
        Function::Sin,
        Function::Cos,
        Function::Tan,
        Function::Exp,
        Function::Log,
        Function::Sqrt,
        Function::Asin,
        Function::Acos,
        Function::Atan,
        Function::Sinh,
        Function::Cosh,
        Function::Tanh,
    ];

    /// Canonical lowercase name
    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Exp => "exp",
            Function::Log => "log",
            Function::Sqrt => "sqrt",
            Function::Asin => "asin",
            Function::Acos => "acos",
            Function::Atan => "atan",
            Function::Sinh => "sinh",
            Function::Cosh => "cosh",
            Function::Tanh => "tanh",
        }
    }

    /// Resolve any accepted spelling (case-insensitive, aliases, known misspellings)
    pub fn from_name(name: &str) -> Option<Function> {
        registry::lookup_function(name)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named mathematical constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum NamedConstant {
    Pi,
    E,
}

impl NamedConstant {
    pub fn value(self) -> f64 {
        match self {
            NamedConstant::Pi => std::f64::consts::PI,
            NamedConstant::E => std::f64::consts::E,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NamedConstant::Pi => "pi",
            NamedConstant::E => "e",
        }
    }

    pub fn from_name(name: &str) -> Option<NamedConstant> {
        registry::lookup_constant(name)
    }
}

// ===== Helper functions for building derived expressions =====

pub(crate) fn call_arc(func: Function, arg: &Arc<Expr>) -> Expr {
    Expr::call_arc(func, Arc::clone(arg))
}

pub(crate) fn shared(arg: &Arc<Expr>) -> Expr {
    (**arg).clone()
}

/// Multiply, optimizing for common cases (0 and 1)
pub(crate) fn mul_opt(a: Expr, b: Expr) -> Expr {
    match (&a.kind, &b.kind) {
        (ExprKind::Number(x), _) if *x == 0.0 => Expr::number(0.0),
        (_, ExprKind::Number(x)) if *x == 0.0 => Expr::number(0.0),
        (ExprKind::Number(x), _) if *x == 1.0 => b,
        (_, ExprKind::Number(x)) if *x == 1.0 => a,
        _ => Expr::mul_expr(a, b),
    }
}

/// Add, dropping literal zeros
pub(crate) fn add_opt(a: Expr, b: Expr) -> Expr {
    if a.is_zero_num() {
        b
    } else if b.is_zero_num() {
        a
    } else {
        Expr::add_expr(a, b)
    }
}

/// Subtract, dropping literal zeros
pub(crate) fn sub_opt(a: Expr, b: Expr) -> Expr {
    if b.is_zero_num() {
        a
    } else if a.is_zero_num() {
        neg(b)
    } else {
        Expr::sub_expr(a, b)
    }
}

/// Divide, dropping a literal one in the denominator
pub(crate) fn div_opt(a: Expr, b: Expr) -> Expr {
    if b.is_one_num() {
        a
    } else {
        Expr::div_expr(a, b)
    }
}

/// Negate an expression, folding literal numbers
pub(crate) fn neg(e: Expr) -> Expr {
    match e.kind {
        ExprKind::Number(n) => Expr::number(-n),
        ExprKind::Neg(inner) => shared(&inner),
        _ => Expr::neg(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for func in Function::ALL {
            assert_eq!(Function::from_name(func.name()), Some(func));
        }
    }

    #[test]
    fn test_constants() {
        assert_eq!(NamedConstant::from_name("pi"), Some(NamedConstant::Pi));
        assert_eq!(NamedConstant::from_name("PI"), Some(NamedConstant::Pi));
        assert_eq!(NamedConstant::from_name("e"), Some(NamedConstant::E));
        assert_eq!(NamedConstant::from_name("x"), None);
    }

    #[test]
    fn test_builders_fold() {
        let x = Expr::symbol("x");
        assert_eq!(mul_opt(Expr::number(1.0), x.clone()), x);
        assert_eq!(add_opt(Expr::number(0.0), x.clone()), x);
        assert_eq!(neg(Expr::number(2.0)), Expr::number(-2.0));
        assert_eq!(neg(neg(x.clone())), x);
    }
}
