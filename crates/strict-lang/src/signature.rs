//! Method signature parsing.
//!
//! Extracts name, parameters, and return type from the first line of a
//! method without touching the body. Names are words, recognized
//! operators, or the composite `is not`; `()` is rejected; parameters
//! start lowercase; `Any` is rejected as parameter or return type.

use strict_common::limits::MAX_PARAMETERS;
use strict_common::{ErrorKind, Limit, ParseError, SourceContext};

/// Operators a type may define as method names.
pub(crate) const OPERATOR_NAMES: &[&str] =
    &["+", "-", "*", "/", "%", "<", ">", "<=", ">=", "is", "is not", "and", "or", "not"];

/// A parsed parameter, unresolved.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParameterDecl {
    pub name: String,
    pub type_name: Option<String>,
    pub is_mutable: bool,
    pub default_value: Option<String>,
}

/// A parsed method head plus its raw body lines.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MethodDecl {
    pub name: String,
    pub parameters: Vec<ParameterDecl>,
    pub return_type_name: Option<String>,
    /// 1-based line of the signature.
    pub line: usize,
    pub body_lines: Vec<String>,
    pub body_start_line: usize,
}

/// Parse the first line of a method definition.
pub(crate) fn parse_signature(
    type_name: &str,
    line: &str,
    line_number: usize,
) -> Result<MethodDecl, ParseError> {
    let error = |message: String| {
        ParseError::new(
            ErrorKind::Signature { message },
            SourceContext::new(type_name, line_number, line),
        )
    };

    let (name, rest) = split_name(line);
    if name.is_empty() {
        return Err(error(format!("invalid method name in `{line}`")));
    }
    let is_word = name.chars().all(|c| c.is_alphabetic());
    if !is_word && !OPERATOR_NAMES.contains(&name.as_str()) {
        return Err(error(format!("invalid method name `{name}`")));
    }

    let mut parameters = Vec::new();
    let return_text;
    if let Some(inner_rest) = rest.strip_prefix('(') {
        let close = matching_paren(inner_rest)
            .ok_or_else(|| error(format!("unclosed parentheses in `{line}`")))?;
        let inner = &inner_rest[..close];
        if inner.trim().is_empty() {
            return Err(error("empty parentheses are not allowed".into()));
        }
        for part in split_top_level(inner, ',') {
            parameters.push(parse_parameter(part.trim(), &error)?);
        }
        if parameters.len() > MAX_PARAMETERS {
            return Err(ParseError::new(
                ErrorKind::LimitExceeded { limit: Limit::Parameters, actual: parameters.len() },
                SourceContext::new(type_name, line_number, line),
            ));
        }
        return_text = &inner_rest[close + 1..];
    } else {
        return_text = rest;
    }

    let return_type_name = match return_text {
        "" => None,
        text => match text.strip_prefix(' ') {
            Some(name) if !name.is_empty() => Some(name.to_string()),
            _ => return Err(error(format!("unexpected `{return_text}` after method name"))),
        },
    };
    if return_type_name.as_deref() == Some("Any") {
        return Err(error("return type `Any` is not allowed".into()));
    }

    Ok(MethodDecl {
        name,
        parameters,
        return_type_name,
        line: line_number,
        body_lines: Vec::new(),
        body_start_line: 0,
    })
}

/// Split the method name off the front of the line. Handles words,
/// operator symbols, and the composite `is not`.
fn split_name(line: &str) -> (String, &str) {
    let word_end = line.find(|c: char| !c.is_alphabetic()).unwrap_or(line.len());
    if word_end > 0 {
        let word = &line[..word_end];
        if word == "is" {
            if let Some(rest) = line[word_end..].strip_prefix(" not") {
                if rest.is_empty() || rest.starts_with('(') || rest.starts_with(' ') {
                    return ("is not".to_string(), rest);
                }
            }
        }
        return (word.to_string(), &line[word_end..]);
    }
    for operator in ["<=", ">=", "+", "-", "*", "/", "%", "<", ">"] {
        if let Some(rest) = line.strip_prefix(operator) {
            return (operator.to_string(), rest);
        }
    }
    (String::new(), line)
}

fn parse_parameter(
    text: &str,
    error: &impl Fn(String) -> ParseError,
) -> Result<ParameterDecl, ParseError> {
    let (is_mutable, text) = match text.strip_prefix("mutable ") {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (text, default_value) = match split_top_level(text, '=').as_slice() {
        [head] => (head.trim_end(), None),
        [head, default] => (head.trim_end(), Some(default.trim_start().to_string())),
        _ => return Err(error(format!("too many `=` in parameter `{text}`"))),
    };
    let mut words = text.splitn(2, ' ');
    let name = words.next().unwrap_or_default();
    if name.is_empty() || !name.chars().all(|c| c.is_alphabetic()) {
        return Err(error(format!("invalid parameter name `{name}`")));
    }
    if !name.chars().next().is_some_and(|c| c.is_lowercase()) {
        return Err(error(format!("parameter name `{name}` must start lowercase")));
    }
    let type_name = words.next().map(str::to_string);
    if type_name.as_deref() == Some("Any") || (type_name.is_none() && name == "any") {
        return Err(error("parameter type `Any` is not allowed".into()));
    }
    Ok(ParameterDecl { name: name.to_string(), type_name, is_mutable, default_value })
}

/// Index of the parenthesis closing the one just before `text`, honoring
/// nesting and text literals.
pub(crate) fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_text = false;
    for (index, c) in text.char_indices() {
        match c {
            '"' => in_text = !in_text,
            '(' if !in_text => depth += 1,
            ')' if !in_text => {
                if depth == 0 {
                    return Some(index);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    None
}

/// Split on a separator at parenthesis depth zero, outside text literals.
pub(crate) fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_text = false;
    let mut start = 0;
    for (index, c) in text.char_indices() {
        match c {
            '"' => in_text = !in_text,
            '(' if !in_text => depth += 1,
            ')' if !in_text => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 && !in_text => {
                parts.push(&text[start..index]);
                start = index + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<MethodDecl, ParseError> {
        parse_signature("Demo", line, 1)
    }

    #[test]
    fn word_method_with_return_type() {
        let decl = parse("CountNumber Number").unwrap();
        assert_eq!(decl.name, "CountNumber");
        assert!(decl.parameters.is_empty());
        assert_eq!(decl.return_type_name.as_deref(), Some("Number"));
    }

    #[test]
    fn method_without_return_type() {
        let decl = parse("Run").unwrap();
        assert_eq!(decl.name, "Run");
        assert_eq!(decl.return_type_name, None);
    }

    #[test]
    fn operator_method() {
        let decl = parse("+(other Number) Number").unwrap();
        assert_eq!(decl.name, "+");
        assert_eq!(decl.parameters.len(), 1);
        assert_eq!(decl.parameters[0].name, "other");
        assert_eq!(decl.parameters[0].type_name.as_deref(), Some("Number"));
    }

    #[test]
    fn composite_is_not() {
        let decl = parse("is not(other) Boolean").unwrap();
        assert_eq!(decl.name, "is not");
        assert_eq!(decl.parameters[0].name, "other");
    }

    #[test]
    fn empty_parentheses_rejected() {
        let err = parse("Run()").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Signature { .. }));
        assert!(err.to_string().contains("empty parentheses"));
    }

    #[test]
    fn uppercase_parameter_rejected() {
        let err = parse("Run(Count Number)").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Signature { .. }));
    }

    #[test]
    fn any_parameter_and_return_rejected() {
        assert!(parse("Run(value Any)").is_err());
        assert!(parse("Run(any)").is_err());
        assert!(parse("Run(value Number) Any").is_err());
    }

    #[test]
    fn parameter_limit_boundary() {
        assert!(parse("Run(a Number, b Number, c Number) Number").is_ok());
        let err = parse("Run(a Number, b Number, c Number, d Number) Number").unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::LimitExceeded { limit: Limit::Parameters, actual: 4 }
        ));
    }

    #[test]
    fn mutable_parameter_and_default_value() {
        let decl = parse("Run(mutable counter Number, label = \"x\")").unwrap();
        assert!(decl.parameters[0].is_mutable);
        assert_eq!(decl.parameters[1].default_value.as_deref(), Some("\"x\""));
    }

    #[test]
    fn generic_parameter_type_keeps_parentheses() {
        let decl = parse("Store(values List(Number))").unwrap();
        assert_eq!(decl.parameters[0].type_name.as_deref(), Some("List(Number)"));
    }
}
