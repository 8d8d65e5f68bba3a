use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::evaluator::UndefinedReason;
use crate::integrate::{Decline, Method};

/// Source location span for error reporting
/// Represents a range of characters in the input string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Span {
    /// Start position (0-indexed byte offset)
    pub start: usize,
    /// End position (exclusive, 0-indexed byte offset)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Create a span for a single position
    pub fn at(pos: usize) -> Self {
        Span {
            start: pos,
            end: pos + 1,
        }
    }

    /// Check if this span has valid location info
    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    /// Format the span for display (1-indexed for users)
    pub fn display(&self) -> String {
        if !self.is_valid() {
            String::new()
        } else if self.end - self.start == 1 {
            format!(" at position {}", self.start + 1)
        } else {
            format!(" at positions {}-{}", self.start + 1, self.end)
        }
    }
}

fn span_suffix(span: &Option<Span>) -> String {
    span.map_or(String::new(), |s| s.display())
}

/// Malformed expression text
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Formula cannot be empty")]
    EmptyFormula,

    #[error("Invalid number format: '{value}'{}", span_suffix(.span))]
    InvalidNumber { value: String, span: Option<Span> },

    #[error("Invalid token: '{token}'{}", span_suffix(.span))]
    InvalidToken { token: String, span: Option<Span> },

    #[error("Expected '{expected}', but got '{got}'{}", span_suffix(.span))]
    UnexpectedToken {
        expected: String,
        got: String,
        span: Option<Span>,
    },

    #[error("Unexpected end of input")]
    UnexpectedEndOfInput,

    #[error("Unbalanced parentheses{}", span_suffix(.span))]
    UnbalancedParentheses { span: Option<Span> },

    #[error("Expression nesting depth exceeds maximum limit")]
    MaxDepthExceeded,

    #[error("Expression size exceeds maximum node count limit")]
    MaxNodesExceeded,
}

impl ParseError {
    pub(crate) fn invalid_token(token: impl Into<String>) -> Self {
        ParseError::InvalidToken {
            token: token.into(),
            span: None,
        }
    }

    pub(crate) fn invalid_token_at(token: impl Into<String>, span: Span) -> Self {
        ParseError::InvalidToken {
            token: token.into(),
            span: Some(span),
        }
    }

    pub(crate) fn unexpected(expected: impl Into<String>, got: impl Into<String>) -> Self {
        ParseError::UnexpectedToken {
            expected: expected.into(),
            got: got.into(),
            span: None,
        }
    }
}

/// A bound that could not be turned into a usable interval endpoint
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoundsError {
    #[error("Bound '{text}' is not a numeric constant: {reason}")]
    NotNumeric { text: String, reason: String },

    #[error("Bound {value} is not finite")]
    NotFinite { value: f64 },

    #[error("Lower bound {lower} must be strictly less than upper bound {upper}")]
    Reversed { lower: f64, upper: f64 },

    #[error("Interval width {width} exceeds the limit of {limit}")]
    WidthExceeded { width: f64, limit: f64 },

    #[error("Bound magnitude {value} exceeds the limit of {limit}")]
    MagnitudeExceeded { value: f64, limit: f64 },
}

/// Machine-checkable classification of an [`IntegralError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ErrorKind {
    Parse,
    VariableMismatch,
    Domain,
    NonRealResult,
    Bounds,
    Subdivision,
    IntegrationFailure,
    Timeout,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Parse => "ParseError",
            ErrorKind::VariableMismatch => "VariableMismatchError",
            ErrorKind::Domain => "DomainError",
            ErrorKind::NonRealResult => "NonRealResultError",
            ErrorKind::Bounds => "BoundsError",
            ErrorKind::Subdivision => "SubdivisionError",
            ErrorKind::IntegrationFailure => "IntegrationFailure",
            ErrorKind::Timeout => "Timeout",
        };
        f.write_str(name)
    }
}

/// One strategy that declined during an integration attempt
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DeclinedStrategy {
    pub method: Method,
    pub reason: Decline,
}

/// Errors returned by every public entry point
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegralError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Expression uses {} but the declared variable is '{expected}'", quote_list(.found))]
    VariableMismatch {
        expected: String,
        found: Vec<String>,
    },

    #[error("'{name}' cannot be used as the integration variable: {reason}")]
    InvalidVariable { name: String, reason: String },

    #[error("Function is undefined at {point}: {reason}")]
    Domain { point: f64, reason: UndefinedReason },

    #[error("Non-integrable singularity at {point}")]
    Singularity { point: f64 },

    #[error("Numeric overflow while evaluating at {point}")]
    Overflow { point: f64 },

    #[error("Evaluation at {point} produced a non-real result")]
    NonReal { point: f64 },

    #[error(transparent)]
    Bounds(#[from] BoundsError),

    #[error("Subdivision count {n} is invalid (must be between 1 and {limit})")]
    Subdivision { n: usize, limit: usize },

    #[error(
        "Integration failed: the function has discontinuities or singularities in range, \
         or exceeds engine precision ({})",
        summarize_declines(.attempts)
    )]
    IntegrationFailure { attempts: Vec<DeclinedStrategy> },

    #[error("Computation exceeded its deadline after {:.3}s", .elapsed.as_secs_f64())]
    Timeout { elapsed: Duration },
}

impl IntegralError {
    /// Machine-checkable error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            IntegralError::Parse(_) => ErrorKind::Parse,
            IntegralError::VariableMismatch { .. } | IntegralError::InvalidVariable { .. } => {
                ErrorKind::VariableMismatch
            }
            IntegralError::Domain { .. }
            | IntegralError::Singularity { .. }
            | IntegralError::Overflow { .. } => ErrorKind::Domain,
            IntegralError::NonReal { .. } => ErrorKind::NonRealResult,
            IntegralError::Bounds(_) => ErrorKind::Bounds,
            IntegralError::Subdivision { .. } => ErrorKind::Subdivision,
            IntegralError::IntegrationFailure { .. } => ErrorKind::IntegrationFailure,
            IntegralError::Timeout { .. } => ErrorKind::Timeout,
        }
    }
}

fn quote_list(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{}'", n)).collect();
    if quoted.len() == 1 {
        format!("variable {}", quoted[0])
    } else {
        format!("variables {}", quoted.join(", "))
    }
}

fn summarize_declines(attempts: &[DeclinedStrategy]) -> String {
    if attempts.is_empty() {
        return "no strategy available".to_string();
    }
    attempts
        .iter()
        .map(|a| format!("{}: {}", a.method, a.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_display_is_one_indexed() {
        assert_eq!(Span::at(0).display(), " at position 1");
        assert_eq!(Span::new(2, 5).display(), " at positions 3-5");
        assert_eq!(Span::default().display(), "");
    }

    #[test]
    fn test_parse_error_message_includes_span() {
        let err = ParseError::invalid_token_at("$", Span::at(3));
        assert_eq!(err.to_string(), "Invalid token: '$' at position 4");
    }

    #[test]
    fn test_kinds() {
        let err = IntegralError::from(ParseError::EmptyFormula);
        assert_eq!(err.kind(), ErrorKind::Parse);

        let err = IntegralError::Singularity { point: 0.0 };
        assert_eq!(err.kind(), ErrorKind::Domain);

        let err = IntegralError::from(BoundsError::Reversed {
            lower: 1.0,
            upper: 0.0,
        });
        assert_eq!(err.kind(), ErrorKind::Bounds);
        assert_eq!(ErrorKind::Bounds.to_string(), "BoundsError");
    }

    #[test]
    fn test_variable_mismatch_message() {
        let err = IntegralError::VariableMismatch {
            expected: "x".to_string(),
            found: vec!["y".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Expression uses variable 'y' but the declared variable is 'x'"
        );
    }
}
