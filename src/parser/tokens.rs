use crate::functions::{Function, NamedConstant};

/// Operators, including function names, which parse as prefix operators
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Func(Function),
    Abs,
}

impl Operator {
    pub(crate) fn is_function(&self) -> bool {
        matches!(self, Operator::Func(_) | Operator::Abs)
    }

    /// Binding power for infix use
    pub(crate) fn precedence(&self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 10,
            Operator::Mul | Operator::Div => 20,
            Operator::Pow => 30,
            Operator::Func(_) | Operator::Abs => 40,
        }
    }

    pub(crate) fn to_name(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Pow => "^",
            Operator::Func(f) => f.name(),
            Operator::Abs => "abs",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Identifier(String),
    Constant(NamedConstant),
    Operator(Operator),
    LeftParen,
    RightParen,
}

impl Token {
    /// Render the token the way a user would have typed it
    pub(crate) fn to_user_string(&self) -> String {
        match self {
            Token::Number(n) => n.to_string(),
            Token::Identifier(name) => name.clone(),
            Token::Constant(c) => c.name().to_string(),
            Token::Operator(op) => op.to_name().to_string(),
            Token::LeftParen => "(".to_string(),
            Token::RightParen => ")".to_string(),
        }
    }
}
