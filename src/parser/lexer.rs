//! Tokenizer with surface-syntax normalization
//!
//! Handles `**` and `^` as power, Unicode operator glyphs, case-insensitive
//! function names with aliases and misspellings, and splitting of letter runs
//! such as `xsin` into `x` and `sin`.

use super::tokens::{Operator, Token};
use crate::error::{ParseError, Span};
use crate::functions::registry::splittable_names;
use crate::functions::{Function, NamedConstant};

/// Verify that parentheses are balanced, reporting the offending position
pub(crate) fn check_parentheses(input: &str) -> Result<(), ParseError> {
    let mut open: Vec<usize> = Vec::new();
    for (pos, ch) in input.char_indices() {
        match ch {
            '(' => open.push(pos),
            ')' => {
                if open.pop().is_none() {
                    return Err(ParseError::UnbalancedParentheses {
                        span: Some(Span::at(pos)),
                    });
                }
            }
            _ => {}
        }
    }
    match open.last() {
        Some(&pos) => Err(ParseError::UnbalancedParentheses {
            span: Some(Span::at(pos)),
        }),
        None => Ok(()),
    }
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

/// Split the input into tokens
pub(crate) fn lex(input: &str, variable: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::with_capacity(input.len() / 2 + 1);
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut i = 0;

    while i < chars.len() {
        let (pos, ch) = chars[i];
        match ch {
            c if c.is_whitespace() => i += 1,

            c if c.is_ascii_digit() || (c == '.' && next_is_digit(&chars, i)) => {
                let (token, next) = lex_number(input, &chars, i)?;
                tokens.push(token);
                i = next;
            }

            c if is_identifier_char(c) => {
                while i < chars.len() && is_identifier_char(chars[i].1) {
                    i += 1;
                }
                let end = chars.get(i).map_or(input.len(), |&(p, _)| p);
                tokens.extend(resolve_identifier(&input[pos..end], variable));
            }

            '*' => {
                if chars.get(i + 1).is_some_and(|&(_, c)| c == '*') {
                    tokens.push(Token::Operator(Operator::Pow));
                    i += 2;
                } else {
                    tokens.push(Token::Operator(Operator::Mul));
                    i += 1;
                }
            }
            '+' => {
                tokens.push(Token::Operator(Operator::Add));
                i += 1;
            }
            '-' | '−' => {
                tokens.push(Token::Operator(Operator::Sub));
                i += 1;
            }
            '×' | '·' => {
                tokens.push(Token::Operator(Operator::Mul));
                i += 1;
            }
            '/' | '÷' => {
                tokens.push(Token::Operator(Operator::Div));
                i += 1;
            }
            '^' => {
                tokens.push(Token::Operator(Operator::Pow));
                i += 1;
            }
            '(' => {
                tokens.push(Token::LeftParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RightParen);
                i += 1;
            }

            other => {
                return Err(ParseError::invalid_token_at(
                    other.to_string(),
                    Span::new(pos, pos + other.len_utf8()),
                ));
            }
        }
    }

    Ok(tokens)
}

fn next_is_digit(chars: &[(usize, char)], i: usize) -> bool {
    chars.get(i + 1).is_some_and(|&(_, c)| c.is_ascii_digit())
}

/// Lex a number starting at `chars[start]`; returns the token and the next index
fn lex_number(
    input: &str,
    chars: &[(usize, char)],
    start: usize,
) -> Result<(Token, usize), ParseError> {
    let mut i = start;
    while i < chars.len() && (chars[i].1.is_ascii_digit() || chars[i].1 == '.') {
        i += 1;
    }

    // Exponent only when digits follow, so `2e` stays "2 times e"
    if i < chars.len() && matches!(chars[i].1, 'e' | 'E') {
        let mut j = i + 1;
        if j < chars.len() && matches!(chars[j].1, '+' | '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].1.is_ascii_digit() {
            i = j;
            while i < chars.len() && chars[i].1.is_ascii_digit() {
                i += 1;
            }
        }
    }

    let begin = chars[start].0;
    let end = chars.get(i).map_or(input.len(), |&(p, _)| p);
    let text = &input[begin..end];
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok((Token::Number(value), i)),
        _ => Err(ParseError::InvalidNumber {
            value: text.to_string(),
            span: Some(Span::new(begin, end)),
        }),
    }
}

/// Resolve a single known name
fn known_name(name: &str, variable: &str) -> Option<Token> {
    if name == variable {
        return Some(Token::Identifier(name.to_string()));
    }
    if let Some(c) = NamedConstant::from_name(name) {
        return Some(Token::Constant(c));
    }
    if name.eq_ignore_ascii_case("abs") {
        return Some(Token::Operator(Operator::Abs));
    }
    Function::from_name(name).map(|f| Token::Operator(Operator::Func(f)))
}

/// Longest letter run the lexer will try to split into known names
const MAX_SPLIT_LEN: usize = 64;

/// Turn a letter run into tokens.
///
/// A run that is not itself a known name is split into known names when a complete
/// decomposition exists; otherwise it stays a single identifier, which validation will
/// later report as a second variable.
fn resolve_identifier(run: &str, variable: &str) -> Vec<Token> {
    if let Some(token) = known_name(run, variable) {
        return vec![token];
    }
    if run.len() > MAX_SPLIT_LEN {
        return vec![Token::Identifier(run.to_string())];
    }

    let mut candidates: Vec<&str> = Vec::with_capacity(splittable_names().len() + 3);
    candidates.push(variable);
    candidates.push("abs");
    candidates.push("π");
    candidates.extend_from_slice(splittable_names());
    candidates.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut parts = Vec::new();
    let mut dead_ends = vec![false; run.len()];
    if split_run(run, 0, variable, &candidates, &mut dead_ends, &mut parts) {
        parts
            .into_iter()
            .filter_map(|part| known_name(part, variable))
            .collect()
    } else {
        vec![Token::Identifier(run.to_string())]
    }
}

/// Depth-first split of `run[offset..]` into candidate names.
///
/// `dead_ends[k]` marks offsets already shown to have no complete split, so each offset
/// is explored at most once and overlapping names cannot blow up the search.
fn split_run<'a>(
    run: &'a str,
    offset: usize,
    variable: &str,
    candidates: &[&str],
    dead_ends: &mut [bool],
    parts: &mut Vec<&'a str>,
) -> bool {
    if offset == run.len() {
        return true;
    }
    if dead_ends[offset] {
        return false;
    }
    let rest = &run[offset..];
    for candidate in candidates {
        if candidate.is_empty() {
            continue;
        }
        let Some(head) = rest.get(..candidate.len()) else {
            continue;
        };
        // The variable and `e` match exactly, everything else case-insensitively
        let matches = if *candidate == variable || *candidate == "e" {
            head == *candidate
        } else {
            head.eq_ignore_ascii_case(candidate)
        };
        if matches {
            parts.push(head);
            let next = offset + candidate.len();
            if split_run(run, next, variable, candidates, dead_ends, parts) {
                return true;
            }
            parts.pop();
        }
    }
    dead_ends[offset] = true;
    false
}
