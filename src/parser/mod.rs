//! Parser module - converts strings to AST
mod implicit_mul;
mod lexer;
mod pratt;
mod tokens;

use crate::error::ParseError;
use crate::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES, Expr};

/// Parse a formula string into an expression AST
///
/// Surface syntax is normalized on the way in: `**` and `^` both mean power,
/// function names are case-insensitive with a few aliases (`ln`, `arcsin`, ...)
/// and misspellings (`sine`, `sqroot`, ...), and implicit multiplication is
/// made explicit (`2x`, `3sin(x)`, `(x+1)(x-1)`).
///
/// Identifiers other than `variable`, the constants and the function names are
/// kept as symbols here; the single-variable rule is enforced by validation so
/// that syntax errors and wrong-variable errors stay distinct.
///
/// # Example
/// ```
/// use symb_quad::parse;
///
/// let implicit = parse("2x + 3sin(x)", "x").unwrap();
/// let explicit = parse("2*x + 3*sin(x)", "x").unwrap();
/// assert_eq!(implicit, explicit);
/// ```
///
/// # Errors
/// Returns `ParseError` if:
/// - The input is empty
/// - Parentheses are unbalanced
/// - The input contains unknown characters or invalid numbers
/// - The token sequence is not a valid expression (dangling operators, etc.)
pub fn parse(input: &str, variable: &str) -> Result<Expr, ParseError> {
    parse_with_limits(input, variable, DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES)
}

pub(crate) fn parse_with_limits(
    input: &str,
    variable: &str,
    max_depth: usize,
    max_nodes: usize,
) -> Result<Expr, ParseError> {
    // Pipeline: validate -> balance check -> lex -> implicit_mul -> parse -> limits

    if input.trim().is_empty() {
        return Err(ParseError::EmptyFormula);
    }

    lexer::check_parentheses(input)?;

    let tokens = lexer::lex(input, variable)?;

    let tokens_with_mul = implicit_mul::insert_implicit_multiplication(tokens);

    let expr = pratt::parse_expression(&tokens_with_mul, max_depth)?;

    if expr.max_depth() > max_depth {
        return Err(ParseError::MaxDepthExceeded);
    }
    if expr.node_count() > max_nodes {
        return Err(ParseError::MaxNodesExceeded);
    }

    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExprKind;
    use crate::functions::Function;

    #[test]
    fn test_implicit_and_explicit_agree() {
        let pairs = [
            ("2x + 3sin(x)", "2*x + 3*sin(x)"),
            ("x**2", "x^2"),
            ("(x+1)(x-1)", "(x+1)*(x-1)"),
            ("2pi x", "2*pi*x"),
            ("xcos(x)", "x*cos(x)"),
            ("Sine(x)", "sin(x)"),
            ("ln(x)", "log(x)"),
        ];
        for (implicit, explicit) in pairs {
            assert_eq!(
                parse(implicit, "x").unwrap(),
                parse(explicit, "x").unwrap(),
                "{} vs {}",
                implicit,
                explicit
            );
        }
    }

    #[test]
    fn test_other_variable() {
        let expr = parse("t^2", "t").unwrap();
        assert!(expr.contains_var("t"));
        let expr = parse("tan(t)", "t").unwrap();
        assert!(matches!(
            expr.kind,
            ExprKind::Call {
                func: Function::Tan,
                ..
            }
        ));
    }

    #[test]
    fn test_second_variable_is_not_a_parse_error() {
        let expr = parse("x + y", "x").unwrap();
        assert!(expr.contains_var("y"));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse("   ", "x"), Err(ParseError::EmptyFormula));
        assert!(matches!(
            parse("sin(x", "x"),
            Err(ParseError::UnbalancedParentheses { .. })
        ));
        assert!(matches!(
            parse("x +", "x"),
            Err(ParseError::UnexpectedEndOfInput)
        ));
        assert!(matches!(
            parse("x # 2", "x"),
            Err(ParseError::InvalidToken { .. })
        ));
        assert!(parse("* x", "x").is_err());
    }

    #[test]
    fn test_node_limit() {
        let long = vec!["x"; 50].join(" + ");
        assert_eq!(
            parse_with_limits(&long, "x", 200, 20),
            Err(ParseError::MaxNodesExceeded)
        );
    }
}
