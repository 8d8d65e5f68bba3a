//! Abstract Syntax Tree for mathematical expressions

use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashSet;

use crate::functions::{Function, NamedConstant};

/// Global counter for expression IDs
static EXPR_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_id() -> u64 {
    EXPR_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
pub struct Expr {
    /// Unique ID for debugging (not used in equality comparisons)
    pub id: u64,
    pub kind: ExprKind,
}

impl Deref for Expr {
    type Target = ExprKind;

    fn deref(&self) -> &Self::Target {
        &self.kind
    }
}

// Equality is structural: two trees built from different inputs compare equal
// when their kinds match, whatever their ids.
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Constant number (e.g., 3.14, 1e10)
    Number(f64),

    /// Named mathematical constant (pi, e)
    Constant(NamedConstant),

    /// Variable symbol. Only the declared integration variable survives validation.
    Symbol(String),

    /// Built-in single-argument function call
    Call { func: Function, arg: Arc<Expr> },

    // Binary operations
    Add(Arc<Expr>, Arc<Expr>),
    Sub(Arc<Expr>, Arc<Expr>),
    Mul(Arc<Expr>, Arc<Expr>),
    Div(Arc<Expr>, Arc<Expr>),
    Pow(Arc<Expr>, Arc<Expr>),

    // Unary operations
    Neg(Arc<Expr>),
    Abs(Arc<Expr>),
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Expr {
            id: next_id(),
            kind,
        }
    }

    // Accessor methods

    /// Return the value if this node is a literal number
    pub fn as_number(&self) -> Option<f64> {
        match &self.kind {
            ExprKind::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Exactly the literal 0; tiny coefficients must survive folding
    #[inline]
    pub fn is_zero_num(&self) -> bool {
        self.as_number() == Some(0.0)
    }

    #[inline]
    pub fn is_one_num(&self) -> bool {
        self.as_number() == Some(1.0)
    }

    // Convenience constructors

    pub fn number(n: f64) -> Self {
        Expr::new(ExprKind::Number(n))
    }

    pub fn constant(c: NamedConstant) -> Self {
        Expr::new(ExprKind::Constant(c))
    }

    pub fn symbol(s: impl Into<String>) -> Self {
        Expr::new(ExprKind::Symbol(s.into()))
    }

    pub fn add_expr(left: Expr, right: Expr) -> Self {
        Expr::new(ExprKind::Add(Arc::new(left), Arc::new(right)))
    }

    pub fn sub_expr(left: Expr, right: Expr) -> Self {
        Expr::new(ExprKind::Sub(Arc::new(left), Arc::new(right)))
    }

    pub fn mul_expr(left: Expr, right: Expr) -> Self {
        Expr::new(ExprKind::Mul(Arc::new(left), Arc::new(right)))
    }

    pub fn div_expr(left: Expr, right: Expr) -> Self {
        Expr::new(ExprKind::Div(Arc::new(left), Arc::new(right)))
    }

    pub fn pow(base: Expr, exponent: Expr) -> Self {
        Expr::new(ExprKind::Pow(Arc::new(base), Arc::new(exponent)))
    }

    pub fn neg(inner: Expr) -> Self {
        Expr::new(ExprKind::Neg(Arc::new(inner)))
    }

    pub fn abs(inner: Expr) -> Self {
        Expr::new(ExprKind::Abs(Arc::new(inner)))
    }

    /// Create a function call expression
    pub fn call(func: Function, arg: Expr) -> Self {
        Expr::new(ExprKind::Call {
            func,
            arg: Arc::new(arg),
        })
    }

    /// Create a function call from an already shared argument - cheap, avoids deep clone
    pub(crate) fn call_arc(func: Function, arg: Arc<Expr>) -> Self {
        Expr::new(ExprKind::Call { func, arg })
    }

    // Analysis methods

    /// Count the total number of nodes in the AST
    pub fn node_count(&self) -> usize {
        match &self.kind {
            ExprKind::Number(_) | ExprKind::Constant(_) | ExprKind::Symbol(_) => 1,
            ExprKind::Call { arg, .. } | ExprKind::Neg(arg) | ExprKind::Abs(arg) => {
                1 + arg.node_count()
            }
            ExprKind::Add(l, r)
            | ExprKind::Sub(l, r)
            | ExprKind::Mul(l, r)
            | ExprKind::Div(l, r)
            | ExprKind::Pow(l, r) => 1 + l.node_count() + r.node_count(),
        }
    }

    /// Get the maximum nesting depth of the AST
    pub fn max_depth(&self) -> usize {
        match &self.kind {
            ExprKind::Number(_) | ExprKind::Constant(_) | ExprKind::Symbol(_) => 1,
            ExprKind::Call { arg, .. } | ExprKind::Neg(arg) | ExprKind::Abs(arg) => {
                1 + arg.max_depth()
            }
            ExprKind::Add(l, r)
            | ExprKind::Sub(l, r)
            | ExprKind::Mul(l, r)
            | ExprKind::Div(l, r)
            | ExprKind::Pow(l, r) => 1 + l.max_depth().max(r.max_depth()),
        }
    }

    /// Check if the expression contains a specific variable
    pub fn contains_var(&self, var: &str) -> bool {
        match &self.kind {
            ExprKind::Number(_) | ExprKind::Constant(_) => false,
            ExprKind::Symbol(s) => s == var,
            ExprKind::Call { arg, .. } | ExprKind::Neg(arg) | ExprKind::Abs(arg) => {
                arg.contains_var(var)
            }
            ExprKind::Add(l, r)
            | ExprKind::Sub(l, r)
            | ExprKind::Mul(l, r)
            | ExprKind::Div(l, r)
            | ExprKind::Pow(l, r) => l.contains_var(var) || r.contains_var(var),
        }
    }

    /// Collect all symbol names in the expression
    pub fn variables(&self) -> FxHashSet<String> {
        let mut vars = FxHashSet::default();
        self.collect_variables(&mut vars);
        vars
    }

    fn collect_variables(&self, vars: &mut FxHashSet<String>) {
        match &self.kind {
            ExprKind::Symbol(s) => {
                vars.insert(s.clone());
            }
            ExprKind::Call { arg, .. } | ExprKind::Neg(arg) | ExprKind::Abs(arg) => {
                arg.collect_variables(vars);
            }
            ExprKind::Add(l, r)
            | ExprKind::Sub(l, r)
            | ExprKind::Mul(l, r)
            | ExprKind::Div(l, r)
            | ExprKind::Pow(l, r) => {
                l.collect_variables(vars);
                r.collect_variables(vars);
            }
            ExprKind::Number(_) | ExprKind::Constant(_) => {}
        }
    }

    /// Visit every node in pre-order (parent before children)
    pub fn walk<F: FnMut(&Expr)>(&self, f: &mut F) {
        f(self);
        match &self.kind {
            ExprKind::Call { arg, .. } | ExprKind::Neg(arg) | ExprKind::Abs(arg) => arg.walk(f),
            ExprKind::Add(l, r)
            | ExprKind::Sub(l, r)
            | ExprKind::Mul(l, r)
            | ExprKind::Div(l, r)
            | ExprKind::Pow(l, r) => {
                l.walk(f);
                r.walk(f);
            }
            ExprKind::Number(_) | ExprKind::Constant(_) | ExprKind::Symbol(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality_ignores_id() {
        let a = Expr::add_expr(Expr::symbol("x"), Expr::number(1.0));
        let b = Expr::add_expr(Expr::symbol("x"), Expr::number(1.0));
        assert_ne!(a.id, b.id);
        assert_eq!(a, b);
    }

    #[test]
    fn test_node_count_and_depth() {
        // sin(x) + 2 * x
        let expr = Expr::add_expr(
            Expr::call(Function::Sin, Expr::symbol("x")),
            Expr::mul_expr(Expr::number(2.0), Expr::symbol("x")),
        );
        assert_eq!(expr.node_count(), 6);
        assert_eq!(expr.max_depth(), 3);
    }

    #[test]
    fn test_variables() {
        let expr = Expr::mul_expr(
            Expr::symbol("x"),
            Expr::abs(Expr::sub_expr(Expr::symbol("y"), Expr::constant(NamedConstant::Pi))),
        );
        let vars = expr.variables();
        assert_eq!(vars.len(), 2);
        assert!(vars.contains("x") && vars.contains("y"));
        assert!(expr.contains_var("y"));
        assert!(!expr.contains_var("t"));
    }
}
