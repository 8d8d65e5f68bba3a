// Differentiation engine - applies calculus rules
//
// Inline folding (0 + x → x, 1 * x → x) keeps derivative trees small. The root
// finder differentiates once per request to polish tangent roots with Newton steps,
// so the result is evaluated numerically and never displayed.

use crate::functions::{add_opt, definition, mul_opt, neg, shared, sub_opt};
use crate::{Expr, ExprKind};

impl Expr {
    /// Differentiate this expression with respect to `var`
    ///
    /// # Example
    /// ```
    /// use symb_quad::{EvaluationOutcome, evaluate_at, parse};
    ///
    /// let expr = parse("x^3 + sin(x)", "x").unwrap();
    /// let derivative = expr.derive("x");
    /// assert_eq!(evaluate_at(&derivative, "x", 0.0), EvaluationOutcome::Value(1.0));
    /// ```
    pub fn derive(&self, var: &str) -> Expr {
        match &self.kind {
            // Base cases
            ExprKind::Number(_) | ExprKind::Constant(_) => Expr::number(0.0),

            ExprKind::Symbol(name) => {
                if name == var {
                    Expr::number(1.0)
                } else {
                    Expr::number(0.0)
                }
            }

            // Chain rule: f(u)' = f'(u) * u'
            ExprKind::Call { func, arg } => {
                let u_prime = arg.derive(var);
                if u_prime.is_zero_num() {
                    return Expr::number(0.0);
                }
                mul_opt((definition(*func).derivative)(arg), u_prime)
            }

            // Sum rule: (u + v)' = u' + v'
            ExprKind::Add(u, v) => add_opt(u.derive(var), v.derive(var)),

            // Subtraction rule: (u - v)' = u' - v'
            ExprKind::Sub(u, v) => sub_opt(u.derive(var), v.derive(var)),

            ExprKind::Neg(u) => {
                let u_prime = u.derive(var);
                if u_prime.is_zero_num() {
                    u_prime
                } else {
                    neg(u_prime)
                }
            }

            // |u|' = u' * u / |u|, undefined where u = 0
            ExprKind::Abs(u) => {
                let u_prime = u.derive(var);
                if u_prime.is_zero_num() {
                    return Expr::number(0.0);
                }
                let sign = Expr::div_expr(shared(u), Expr::abs(shared(u)));
                mul_opt(u_prime, sign)
            }

            // Product rule: (u * v)' = u' * v + u * v'
            ExprKind::Mul(u, v) => {
                let term1 = mul_opt(u.derive(var), shared(v));
                let term2 = mul_opt(shared(u), v.derive(var));
                add_opt(term1, term2)
            }

            // Quotient rule: (u / v)' = (u' * v - u * v') / v^2
            ExprKind::Div(u, v) => {
                let u_prime = u.derive(var);
                let v_prime = v.derive(var);

                if v_prime.is_zero_num() {
                    // Constant denominator: u' / v
                    if u_prime.is_zero_num() {
                        return Expr::number(0.0);
                    }
                    return Expr::div_expr(u_prime, shared(v));
                }

                let numerator = sub_opt(
                    mul_opt(u_prime, shared(v)),
                    mul_opt(shared(u), v_prime),
                );
                Expr::div_expr(numerator, Expr::pow(shared(v), Expr::number(2.0)))
            }

            ExprKind::Pow(u, v) => {
                if !v.contains_var(var) {
                    // Constant exponent - power rule: (u^n)' = n * u^(n-1) * u'
                    let u_prime = u.derive(var);
                    if u_prime.is_zero_num() {
                        return Expr::number(0.0);
                    }
                    let n_minus_1 = match v.as_number() {
                        Some(n) => Expr::number(n - 1.0),
                        None => Expr::sub_expr(shared(v), Expr::number(1.0)),
                    };
                    let u_pow = if n_minus_1.is_zero_num() {
                        Expr::number(1.0)
                    } else {
                        Expr::pow(shared(u), n_minus_1)
                    };
                    mul_opt(shared(v), mul_opt(u_pow, u_prime))
                } else {
                    // Variable exponent - logarithmic differentiation:
                    // d/dx[u^v] = u^v * (v' * ln(u) + v * u'/u)
                    let u_prime = u.derive(var);
                    let v_prime = v.derive(var);

                    let ln_u = match &u.kind {
                        ExprKind::Constant(crate::NamedConstant::E) => Expr::number(1.0),
                        _ => Expr::call(crate::Function::Log, shared(u)),
                    };
                    let term1 = mul_opt(v_prime, ln_u);
                    let term2 = if u_prime.is_zero_num() {
                        Expr::number(0.0)
                    } else {
                        mul_opt(shared(v), Expr::div_expr(u_prime, shared(u)))
                    };
                    mul_opt(self.clone(), add_opt(term1, term2))
                }
            }
        }
    }
}
