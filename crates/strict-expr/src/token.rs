//! Per-line tokenization.
//!
//! The language has no file-level lexer; semantics come from line position
//! and indentation. Within one line, value expressions are split into
//! identifiers, literals, operators (including the composite `is not`),
//! and grouping punctuation. Tokens never cross lines.

use strict_common::{ErrorKind, ParseError, SourceContext};

/// One token of a value expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Identifier(String),
    Number(f64),
    Text(String),
    /// `+ - * / % < > <= >= is "is not" and or`
    Operator(String),
    /// The only unary operator, `not x`.
    Not,
    Dot,
    OpenParen,
    CloseParen,
    Comma,
    /// `?` of a conditional expression.
    Question,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Identifier(name) => write!(f, "{name}"),
            Token::Number(value) => write!(f, "{value}"),
            Token::Text(text) => write!(f, "\"{text}\""),
            Token::Operator(operator) => write!(f, "{operator}"),
            Token::Not => write!(f, "not"),
            Token::Dot => write!(f, "."),
            Token::OpenParen => write!(f, "("),
            Token::CloseParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Question => write!(f, "?"),
        }
    }
}

/// Whether a `-` in this position starts a negative number literal rather
/// than a binary minus.
fn starts_negative_number(previous: Option<&Token>) -> bool {
    matches!(
        previous,
        None | Some(Token::Operator(_))
            | Some(Token::Not)
            | Some(Token::OpenParen)
            | Some(Token::Comma)
            | Some(Token::Question)
    )
}

/// Tokenize one value expression.
pub(crate) fn tokenize(text: &str, context: &SourceContext) -> Result<Vec<Token>, ParseError> {
    let error = |message: String| {
        ParseError::new(ErrorKind::Syntax { message }, context.clone())
    };

    let mut tokens: Vec<Token> = Vec::new();
    let bytes: Vec<char> = text.chars().collect();
    let mut position = 0;
    while position < bytes.len() {
        let c = bytes[position];
        match c {
            ' ' => position += 1,
            '"' => {
                let start = position + 1;
                let mut end = start;
                while end < bytes.len() && bytes[end] != '"' {
                    end += 1;
                }
                if end == bytes.len() {
                    return Err(error("unterminated text literal".into()));
                }
                tokens.push(Token::Text(bytes[start..end].iter().collect()));
                position = end + 1;
            }
            '(' => {
                tokens.push(Token::OpenParen);
                position += 1;
            }
            ')' => {
                tokens.push(Token::CloseParen);
                position += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                position += 1;
            }
            '.' => {
                tokens.push(Token::Dot);
                position += 1;
            }
            '?' => {
                tokens.push(Token::Question);
                position += 1;
            }
            '<' | '>' => {
                if bytes.get(position + 1) == Some(&'=') {
                    tokens.push(Token::Operator(format!("{c}=")));
                    position += 2;
                } else {
                    tokens.push(Token::Operator(c.to_string()));
                    position += 1;
                }
            }
            '+' | '*' | '/' | '%' => {
                tokens.push(Token::Operator(c.to_string()));
                position += 1;
            }
            '-' => {
                let negative = starts_negative_number(tokens.last())
                    && bytes.get(position + 1).is_some_and(|next| next.is_ascii_digit());
                if negative {
                    let (value, end) = scan_number(&bytes, position + 1, &error)?;
                    tokens.push(Token::Number(-value));
                    position = end;
                } else {
                    tokens.push(Token::Operator("-".into()));
                    position += 1;
                }
            }
            c if c.is_ascii_digit() => {
                let (value, end) = scan_number(&bytes, position, &error)?;
                tokens.push(Token::Number(value));
                position = end;
            }
            c if c.is_alphabetic() => {
                let start = position;
                let mut end = position;
                while end < bytes.len() && bytes[end].is_alphanumeric() {
                    end += 1;
                }
                let word: String = bytes[start..end].iter().collect();
                match word.as_str() {
                    "is" | "and" | "or" => tokens.push(Token::Operator(word)),
                    "not" => tokens.push(Token::Not),
                    _ => tokens.push(Token::Identifier(word)),
                }
                position = end;
            }
            '=' => return Err(error("unexpected `=` in expression".into())),
            other => return Err(error(format!("unexpected character `{other}`"))),
        }
    }
    Ok(merge_is_not(tokens))
}

/// Merge `is` followed by `not` into the composite `is not` operator.
fn merge_is_not(tokens: Vec<Token>) -> Vec<Token> {
    let mut merged: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        let compose = matches!(
            (merged.last(), &token),
            (Some(Token::Operator(operator)), Token::Not) if operator == "is"
        );
        if compose {
            merged.pop();
            merged.push(Token::Operator("is not".into()));
        } else {
            merged.push(token);
        }
    }
    merged
}

fn scan_number(
    bytes: &[char],
    start: usize,
    error: &impl Fn(String) -> ParseError,
) -> Result<(f64, usize), ParseError> {
    let mut end = start;
    let mut seen_dot = false;
    while end < bytes.len() {
        let c = bytes[end];
        if c.is_ascii_digit() {
            end += 1;
        } else if c == '.' && !seen_dot && bytes.get(end + 1).is_some_and(|n| n.is_ascii_digit()) {
            seen_dot = true;
            end += 1;
        } else {
            break;
        }
    }
    let literal: String = bytes[start..end].iter().collect();
    let value = literal
        .parse::<f64>()
        .map_err(|_| error(format!("invalid number literal `{literal}`")))?;
    Ok((value, end))
}
