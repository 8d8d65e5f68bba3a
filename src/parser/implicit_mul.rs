//! Implicit multiplication insertion for natural notation
//!
//! Inserts `*` operators between tokens where multiplication is implied, e.g. `2x` → `2 * x`.

use crate::parser::tokens::{Operator, Token};

/// Check if implicit multiplication should be inserted between two tokens
fn should_insert_mul(current: &Token, next: &Token) -> bool {
    match (current, next) {
        // Number/Identifier/Constant/) * Function operator: 4 sin(x) → 4 * sin(x)
        (
            Token::Number(_) | Token::Identifier(_) | Token::Constant(_) | Token::RightParen,
            Token::Operator(op),
        ) if op.is_function() => true,

        // Coalesced arms for standard multiplication cases:
        // Number * Identifier/Constant: 2x, 2pi
        // Identifier * Identifier: x pi
        // Number/Identifier * (: 2(x), x(x + 1)
        // ) * Identifier/Number/(: (a)x, (a)2, (a)(b)
        (
            Token::Number(_) | Token::Identifier(_) | Token::Constant(_) | Token::RightParen,
            Token::Identifier(_) | Token::Constant(_) | Token::LeftParen,
        )
        | (Token::Identifier(_) | Token::Constant(_) | Token::RightParen, Token::Number(_)) => {
            true
        }

        // Function operator * ( is NOT multiplication (it's function call)
        _ => false,
    }
}

/// Insert implicit multiplication operators between appropriate tokens
///
/// Rules:
/// - Number * Identifier: `2 x` → `2 * x`
/// - Identifier * Function: `x sin` → `x * sin`
/// - ) * Identifier/Number/(: `(a) x` → `(a) * x`
/// - Identifier/Number * (: `x (y)` → `x * (y)`
///
/// Exception: Function followed by ( is NOT multiplication
pub(crate) fn insert_implicit_multiplication(tokens: Vec<Token>) -> Vec<Token> {
    if tokens.is_empty() {
        return tokens;
    }

    // Check if any insertion is needed before allocating new vector
    let needs_insertion = tokens.windows(2).any(|w| should_insert_mul(&w[0], &w[1]));

    if !needs_insertion {
        return tokens;
    }

    let mut result = Vec::with_capacity(tokens.len() * 3 / 2);
    let mut it = tokens.into_iter().peekable();

    while let Some(current) = it.next() {
        let needs_mul = it
            .peek()
            .is_some_and(|next| should_insert_mul(&current, next));

        result.push(current);
        if needs_mul {
            result.push(Token::Operator(Operator::Mul));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::{Function, NamedConstant};

    #[test]
    fn test_number_identifier() {
        let tokens = vec![Token::Number(2.0), Token::Identifier("x".into())];
        let result = insert_implicit_multiplication(tokens);
        assert_eq!(result.len(), 3);
        assert!(matches!(result[1], Token::Operator(Operator::Mul)));
    }

    #[test]
    fn test_paren_identifier() {
        let tokens = vec![Token::RightParen, Token::Identifier("x".into())];
        let result = insert_implicit_multiplication(tokens);
        assert_eq!(result.len(), 3);
        assert!(matches!(result[1], Token::Operator(Operator::Mul)));
    }

    #[test]
    fn test_paren_paren() {
        let tokens = vec![Token::RightParen, Token::LeftParen];
        let result = insert_implicit_multiplication(tokens);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_function_no_multiplication() {
        let tokens = vec![Token::Operator(Operator::Func(Function::Sin)), Token::LeftParen];
        let result = insert_implicit_multiplication(tokens);
        assert_eq!(result.len(), 2); // No multiplication inserted
    }

    #[test]
    fn test_number_function() {
        let tokens = vec![Token::Number(3.0), Token::Operator(Operator::Func(Function::Sin))];
        let result = insert_implicit_multiplication(tokens);
        assert_eq!(result.len(), 3);
        assert!(matches!(result[1], Token::Operator(Operator::Mul)));
    }

    #[test]
    fn test_constant_number() {
        let tokens = vec![Token::Constant(NamedConstant::Pi), Token::Number(2.0)];
        let result = insert_implicit_multiplication(tokens);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_number_number_untouched() {
        let tokens = vec![Token::Number(2.0), Token::Number(3.0)];
        let result = insert_implicit_multiplication(tokens);
        assert_eq!(result.len(), 2);
    }
}
