//! Body pre-parsing: grouping indented lines into a scope tree.
//!
//! Walks a method's raw body lines, counts leading tabs, and groups
//! contiguous lines at one depth; a line one tab deeper opens a child that
//! the expression parser later attaches to its `if`/`else`/`for`. Depth
//! may only grow by a single tab at a time.

use strict_common::{ErrorKind, ParseError, SourceContext};

/// A pre-parsed scope: lines at one depth plus nested children, in order.
#[derive(Debug)]
pub(crate) struct RawBody {
    pub tabs: usize,
    /// 1-based first line of the scope.
    pub start_line: usize,
    /// 1-based line after the scope, exclusive.
    pub end_line: usize,
    pub items: Vec<RawItem>,
}

/// One entry of a pre-parsed scope.
#[derive(Debug)]
pub(crate) enum RawItem {
    /// A line with the scope's indentation stripped.
    Line { number: usize, text: String },
    /// A nested scope one tab deeper.
    Body(RawBody),
}

/// Group a method's body lines into a scope tree. The top-level body sits
/// at one tab; even a single expression gets a body.
pub(crate) fn pre_parse(
    lines: &[(usize, &str)],
    type_name: &str,
    method_name: &str,
) -> Result<RawBody, ParseError> {
    let error = |number: usize, text: &str, message: String| {
        ParseError::new(
            ErrorKind::Syntax { message },
            SourceContext::new(type_name, number, text).in_method(method_name),
        )
    };
    let Some(&(first_number, first_text)) = lines.first() else {
        return Err(error(0, "", "method has no body lines".into()));
    };
    if depth_of(first_text) != 1 {
        return Err(error(
            first_number,
            first_text,
            "a method body starts at one tab".into(),
        ));
    }
    let mut position = 0;
    parse_level(lines, &mut position, 1, &error)
}

fn parse_level(
    lines: &[(usize, &str)],
    position: &mut usize,
    tabs: usize,
    error: &impl Fn(usize, &str, String) -> ParseError,
) -> Result<RawBody, ParseError> {
    let start_line = lines[*position].0;
    let mut end_line = start_line;
    let mut items = Vec::new();
    while *position < lines.len() {
        let (number, text) = lines[*position];
        let depth = depth_of(text);
        if depth < tabs {
            break;
        }
        if depth == tabs {
            items.push(RawItem::Line { number, text: text[depth..].to_string() });
            *position += 1;
            end_line = number + 1;
        } else if depth == tabs + 1 {
            let child = parse_level(lines, position, tabs + 1, error)?;
            end_line = child.end_line;
            items.push(RawItem::Body(child));
        } else {
            return Err(error(
                number,
                text,
                "indentation may only grow one tab at a time".into(),
            ));
        }
    }
    Ok(RawBody { tabs, start_line, end_line, items })
}

fn depth_of(text: &str) -> usize {
    text.chars().take_while(|&c| c == '\t').count()
}
