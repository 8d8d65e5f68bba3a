use crate::Expr;
use crate::error::ParseError;
use crate::parser::tokens::{Operator, Token};

/// Binding power of unary minus: between Mul (20) and Pow (30), so -x^2 is -(x^2)
const UNARY_PRECEDENCE: u8 = 25;

/// Parse tokens into an AST using Pratt parsing algorithm
pub(crate) fn parse_expression(tokens: &[Token], max_depth: usize) -> Result<Expr, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::UnexpectedEndOfInput);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        max_depth,
    };

    let expr = parser.parse_expr(0)?;

    // Everything must be consumed: "2 3" or "x)" are not expressions
    if let Some(token) = parser.current() {
        return Err(ParseError::unexpected(
            "end of input",
            token.to_user_string(),
        ));
    }

    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn describe_current(&self) -> String {
        self.current()
            .map_or_else(|| "end of input".to_string(), Token::to_user_string)
    }

    fn expect_right_paren(&mut self) -> Result<(), ParseError> {
        if let Some(Token::RightParen) = self.current() {
            self.advance(); // consume )
            Ok(())
        } else {
            Err(ParseError::unexpected(")", self.describe_current()))
        }
    }

    fn parse_expr(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        // Recursion guard: nesting beyond the AST limit is rejected before it can
        // exhaust the stack
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::MaxDepthExceeded);
        }

        // Parse left side (prefix)
        let mut left = self.parse_prefix()?;

        // Parse operators and right side (infix)
        while let Some(token) = self.current() {
            let precedence = match token {
                Token::Operator(op) if !op.is_function() => op.precedence(),
                _ => break,
            };

            if precedence < min_precedence {
                break;
            }

            left = self.parse_infix(left, precedence)?;
        }

        self.depth -= 1;
        Ok(left)
    }

    /// Parse a parenthesized function argument: `( expr )`
    fn parse_argument(&mut self, name: &str) -> Result<Expr, ParseError> {
        if let Some(Token::LeftParen) = self.current() {
            self.advance(); // consume (
            let arg = self.parse_expr(0)?;
            self.expect_right_paren()?;
            Ok(arg)
        } else {
            Err(ParseError::unexpected(
                format!("( after {}", name),
                self.describe_current(),
            ))
        }
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        // Borrow from the underlying slice 'a, not from self, so advance() stays usable
        let token = self
            .tokens
            .get(self.pos)
            .ok_or(ParseError::UnexpectedEndOfInput)?;

        match token {
            Token::Number(n) => {
                self.advance();
                Ok(Expr::number(*n))
            }

            Token::Identifier(name) => {
                self.advance();
                Ok(Expr::symbol(name.clone()))
            }

            Token::Constant(c) => {
                self.advance();
                Ok(Expr::constant(*c))
            }

            Token::Operator(Operator::Func(func)) => {
                self.advance();
                let arg = self.parse_argument(func.name())?;
                Ok(Expr::call(*func, arg))
            }

            Token::Operator(Operator::Abs) => {
                self.advance();
                let arg = self.parse_argument("abs")?;
                Ok(Expr::abs(arg))
            }

            Token::Operator(Operator::Sub) => {
                self.advance();
                let expr = self.parse_expr(UNARY_PRECEDENCE)?;
                Ok(Expr::neg(expr))
            }

            // Unary plus: same precedence as unary minus, just returns the expression
            Token::Operator(Operator::Add) => {
                self.advance();
                self.parse_expr(UNARY_PRECEDENCE)
            }

            Token::LeftParen => {
                self.advance(); // consume (
                let expr = self.parse_expr(0)?;
                self.expect_right_paren()?;
                Ok(expr)
            }

            _ => Err(ParseError::invalid_token(token.to_user_string())),
        }
    }

    fn parse_infix(&mut self, left: Expr, precedence: u8) -> Result<Expr, ParseError> {
        let token = self
            .tokens
            .get(self.pos)
            .ok_or(ParseError::UnexpectedEndOfInput)?;

        match token {
            Token::Operator(op) => {
                self.advance();

                // Right associative for power, left for others
                let next_precedence = if matches!(op, Operator::Pow) {
                    precedence
                } else {
                    precedence + 1
                };

                let right = self.parse_expr(next_precedence)?;

                let result = match op {
                    Operator::Add => Expr::add_expr(left, right),
                    Operator::Sub => Expr::sub_expr(left, right),
                    Operator::Mul => Expr::mul_expr(left, right),
                    Operator::Div => Expr::div_expr(left, right),
                    Operator::Pow => Expr::pow(left, right),
                    Operator::Func(_) | Operator::Abs => {
                        return Err(ParseError::invalid_token(format!(
                            "operator '{}'",
                            op.to_name()
                        )));
                    }
                };

                Ok(result)
            }

            _ => Err(ParseError::invalid_token(token.to_user_string())),
        }
    }
}
