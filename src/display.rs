// Display formatting for AST
use crate::{Expr, ExprKind};
use std::fmt;

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Number(n) => format_number(f, *n),

            ExprKind::Constant(c) => f.write_str(c.name()),

            ExprKind::Symbol(s) => write!(f, "{}", s),

            ExprKind::Call { func, arg } => write!(f, "{}({})", func, arg),

            ExprKind::Abs(inner) => write!(f, "abs({})", inner),

            ExprKind::Neg(inner) => match &inner.kind {
                ExprKind::Add(_, _)
                | ExprKind::Sub(_, _)
                | ExprKind::Mul(_, _)
                | ExprKind::Div(_, _) => write!(f, "-({})", inner),
                _ => write!(f, "-{}", inner),
            },

            ExprKind::Add(u, v) => {
                // Display a negated right operand as subtraction
                if let ExprKind::Neg(inner) = &v.kind {
                    write!(f, "{} - {}", u, format_mul_operand(inner))
                } else {
                    write!(f, "{} + {}", u, v)
                }
            }

            ExprKind::Sub(u, v) => {
                // Parenthesize RHS when it's an addition or subtraction to preserve
                // the intended grouping: `a - (b + c)` instead of `a - b + c`.
                let right_str = match &v.kind {
                    ExprKind::Add(_, _) | ExprKind::Sub(_, _) | ExprKind::Neg(_) => {
                        format!("({})", v)
                    }
                    _ => format!("{}", v),
                };
                write!(f, "{} - {}", u, right_str)
            }

            ExprKind::Mul(u, v) => {
                write!(f, "{} * {}", format_mul_operand(u), format_mul_operand(v))
            }

            ExprKind::Div(u, v) => {
                // Add parentheses around numerator if it's addition or subtraction
                let formatted_num = match &u.kind {
                    ExprKind::Add(_, _) | ExprKind::Sub(_, _) => format!("({})", u),
                    _ => format!("{}", u),
                };
                // Parenthesize the denominator unless it is atomic, a power or a call
                let formatted_denom = match &v.kind {
                    ExprKind::Symbol(_)
                    | ExprKind::Number(_)
                    | ExprKind::Constant(_)
                    | ExprKind::Pow(_, _)
                    | ExprKind::Call { .. }
                    | ExprKind::Abs(_) => format!("{}", v),
                    _ => format!("({})", v),
                };
                write!(f, "{} / {}", formatted_num, formatted_denom)
            }

            ExprKind::Pow(u, v) => {
                // Mul and Div bases MUST be parenthesized: (C * R)^2 is not C * R^2
                let formatted_base = match &u.kind {
                    ExprKind::Add(_, _)
                    | ExprKind::Sub(_, _)
                    | ExprKind::Mul(_, _)
                    | ExprKind::Div(_, _)
                    | ExprKind::Neg(_)
                    | ExprKind::Pow(_, _) => format!("({})", u),
                    ExprKind::Number(n) if *n < 0.0 => format!("({})", u),
                    _ => format!("{}", u),
                };

                let formatted_exp = match &v.kind {
                    ExprKind::Number(n) if *n >= 0.0 => format!("{}", v),
                    ExprKind::Symbol(_) | ExprKind::Constant(_) => format!("{}", v),
                    _ => format!("({})", v),
                };

                write!(f, "{}^{}", formatted_base, formatted_exp)
            }
        }
    }
}

fn format_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_nan() {
        write!(f, "NaN")
    } else if n.is_infinite() {
        if n > 0.0 {
            write!(f, "Infinity")
        } else {
            write!(f, "-Infinity")
        }
    } else if n.fract() == 0.0 && n.abs() < 1e10 {
        // Display as integer if no fractional part
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{}", n)
    }
}

/// Format operand for multiplication to minimize parentheses
fn format_mul_operand(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Add(_, _) | ExprKind::Sub(_, _) | ExprKind::Div(_, _) => format!("({})", expr),
        ExprKind::Number(n) if *n < 0.0 => format!("({})", expr),
        _ => format!("{}", expr),
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;

    fn show(text: &str) -> String {
        parse(text, "x").unwrap().to_string()
    }

    #[test]
    fn test_display_number() {
        assert_eq!(show("3"), "3");
        assert!(show("3.14").starts_with("3.14"));
    }

    #[test]
    fn test_display_operators() {
        assert_eq!(show("2x + 3sin(x)"), "2 * x + 3 * sin(x)");
        assert_eq!(show("x**2 - (x - 1)"), "x^2 - (x - 1)");
        assert_eq!(show("(x + 1) / (x - 1)"), "(x + 1) / (x - 1)");
        assert_eq!(show("(2x)^2"), "(2 * x)^2");
        assert_eq!(show("x^(-1)"), "x^(-1)");
        assert_eq!(show("-(x + 1)"), "-(x + 1)");
        assert_eq!(show("abs(x) + pi"), "abs(x) + pi");
    }

    #[test]
    fn test_display_reparses_to_same_tree() {
        for text in ["x^2 - 6*x + 11", "sin(2x)/cos(x)", "-x^2", "e^(x/2)"] {
            let first = parse(text, "x").unwrap();
            let second = parse(&first.to_string(), "x").unwrap();
            assert_eq!(first, second, "{}", text);
        }
    }
}
