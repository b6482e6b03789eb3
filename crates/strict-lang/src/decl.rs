//! Declaration parsing for one type file.
//!
//! The first word of each line decides its kind: `import`, `implement`,
//! `has`, or a method definition whose indented lines form the body.
//! Declaration order is fixed (`import` → `implement` → `has` → methods)
//! and the whitespace rules are strict: no empty lines, no leading or
//! trailing spaces, tabs only for indentation.
//!
//! This pass is pure syntax: names stay unresolved strings so files can be
//! parsed in parallel; resolution happens afterwards in [`crate::admit`].

use strict_common::limits::{
    MAX_BODY_LINES, MAX_LINE_LENGTH, MAX_MEMBERS, MAX_METHODS, MAX_NESTING, MAX_TYPE_LINES,
};
use strict_common::{ErrorKind, Limit, ParseError, SourceContext};

use crate::signature::{parse_signature, split_top_level, MethodDecl};

/// A parsed `has` declaration, unresolved.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MemberDecl {
    pub name: String,
    pub type_name: Option<String>,
    pub initializer: Option<String>,
    pub line: usize,
}

/// Everything a type file declares, with names still unresolved.
#[derive(Debug, Default)]
pub(crate) struct TypeDeclarations {
    pub imports: Vec<(String, usize)>,
    pub implements: Vec<(String, usize)>,
    pub members: Vec<MemberDecl>,
    pub methods: Vec<MethodDecl>,
}

/// Declaration sections must appear in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Section {
    Import,
    Implement,
    Member,
    Method,
}

/// Parse the lines of one type file into unresolved declarations.
pub(crate) fn parse_declarations(
    type_name: &str,
    lines: &[&str],
) -> Result<TypeDeclarations, ParseError> {
    if lines.len() > MAX_TYPE_LINES {
        return Err(ParseError::new(
            ErrorKind::LimitExceeded { limit: Limit::TypeLines, actual: lines.len() },
            SourceContext::new(type_name, MAX_TYPE_LINES + 1, lines[MAX_TYPE_LINES]),
        ));
    }

    let mut decls = TypeDeclarations::default();
    let mut section = Section::Import;
    for (index, &line) in lines.iter().enumerate() {
        let number = index + 1;
        let context = || SourceContext::new(type_name, number, line);
        let syntax = |message: String| ParseError::new(ErrorKind::Syntax { message }, context());

        let tabs = validate_line(type_name, line, number)?;
        if tabs > 0 {
            // An indented line belongs to the body of the latest method.
            let Some(method) = decls.methods.last_mut() else {
                return Err(syntax("unexpected indentation outside a method".into()));
            };
            if method.body_lines.len() == MAX_BODY_LINES {
                return Err(ParseError::new(
                    ErrorKind::LimitExceeded {
                        limit: Limit::BodyLines,
                        actual: method.body_lines.len() + 1,
                    },
                    context().in_method(method.name.clone()),
                ));
            }
            if method.body_lines.is_empty() {
                method.body_start_line = number;
            }
            method.body_lines.push(line.to_string());
            continue;
        }

        let (first, rest) = match line.find(' ') {
            Some(space) => (&line[..space], &line[space + 1..]),
            None => (line, ""),
        };
        match first {
            "import" => {
                if section > Section::Import {
                    return Err(syntax(
                        "`import` must come before `implement`, members and methods".into(),
                    ));
                }
                if rest.is_empty() {
                    return Err(syntax("`import` needs a package name".into()));
                }
                decls.imports.push((rest.to_string(), number));
            }
            "implement" => {
                if section > Section::Implement {
                    return Err(syntax("`implement` must come before members and methods".into()));
                }
                if rest.is_empty() {
                    return Err(syntax("`implement` needs a type name".into()));
                }
                if rest == "Any" {
                    return Err(syntax("`implement Any` is implicit and not allowed".into()));
                }
                section = Section::Implement;
                decls.implements.push((rest.to_string(), number));
            }
            "has" => {
                if section == Section::Method {
                    return Err(syntax("`has` must come before methods".into()));
                }
                if decls.members.len() == MAX_MEMBERS {
                    return Err(ParseError::new(
                        ErrorKind::LimitExceeded {
                            limit: Limit::Members,
                            actual: decls.members.len() + 1,
                        },
                        context(),
                    ));
                }
                section = Section::Member;
                decls.members.push(parse_member(type_name, rest, line, number)?);
            }
            _ => {
                if decls.methods.len() == MAX_METHODS {
                    return Err(ParseError::new(
                        ErrorKind::LimitExceeded {
                            limit: Limit::Methods,
                            actual: decls.methods.len() + 1,
                        },
                        context(),
                    ));
                }
                section = Section::Method;
                decls.methods.push(parse_signature(type_name, line, number)?);
            }
        }
    }
    Ok(decls)
}

/// Enforce the per-line whitespace and size rules; returns the leading tab
/// count.
fn validate_line(type_name: &str, line: &str, number: usize) -> Result<usize, ParseError> {
    let context = || SourceContext::new(type_name, number, line);
    let syntax = |message: &str| {
        ParseError::new(ErrorKind::Syntax { message: message.into() }, context())
    };

    let length = line.chars().count();
    if length > MAX_LINE_LENGTH {
        return Err(ParseError::new(
            ErrorKind::LimitExceeded { limit: Limit::LineLength, actual: length },
            context(),
        ));
    }
    if line.is_empty() {
        return Err(syntax("empty lines are not allowed"));
    }
    if line.starts_with(' ') {
        return Err(syntax("line must not start with spaces, use tabs for indentation"));
    }
    if line.ends_with(' ') || line.ends_with('\t') {
        return Err(syntax("line has trailing whitespace"));
    }
    let tabs = line.chars().take_while(|&c| c == '\t').count();
    if tabs > MAX_NESTING {
        return Err(ParseError::new(
            ErrorKind::LimitExceeded { limit: Limit::Nesting, actual: tabs },
            context(),
        ));
    }
    if line[tabs..].starts_with(' ') {
        return Err(syntax("spaces after tabs are not allowed"));
    }
    Ok(tabs)
}

fn parse_member(
    type_name: &str,
    rest: &str,
    line: &str,
    number: usize,
) -> Result<MemberDecl, ParseError> {
    let syntax = |message: String| {
        ParseError::new(
            ErrorKind::Syntax { message },
            SourceContext::new(type_name, number, line),
        )
    };
    if rest.is_empty() {
        return Err(syntax("`has` needs a member name".into()));
    }
    let (head, initializer) = match split_top_level(rest, '=').as_slice() {
        [head] => (head.trim_end(), None),
        [head, value] => (head.trim_end(), Some(value.trim_start().to_string())),
        _ => return Err(syntax(format!("too many `=` in member `{rest}`"))),
    };
    let mut words = head.splitn(2, ' ');
    let word = words.next().unwrap_or_default();
    let explicit_type = words.next().map(str::to_string);
    if word.is_empty() || !word.chars().all(|c| c.is_alphabetic()) {
        return Err(syntax(format!("invalid member name `{word}`")));
    }
    // `has number` names the member after its type; `has Number` is the
    // explicit form of the same auto-alias.
    let (name, type_name) = if word.chars().next().is_some_and(|c| c.is_uppercase()) {
        if explicit_type.is_some() {
            return Err(syntax(format!("member name `{word}` must start lowercase")));
        }
        (decapitalize(word), Some(word.to_string()))
    } else {
        (word.to_string(), explicit_type)
    };
    Ok(MemberDecl { name, type_name, initializer, line: number })
}

/// `Number` → `number`.
pub(crate) fn decapitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `number` → `Number`.
pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
