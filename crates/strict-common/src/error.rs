//! The tagged error type of the Strict front-end.
//!
//! The parser raises one error kind per failure category instead of a deep
//! exception hierarchy: every [`ParseError`] is a kind plus the
//! [`SourceContext`] of the offending line. Errors are fatal for the
//! enclosing file; nothing is caught or retried inside the parser.

use std::fmt;

use serde::Serialize;

use crate::context::SourceContext;
use crate::limits::Limit;

/// A parse error: what went wrong, and where.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub context: SourceContext,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ErrorKind, context: SourceContext) -> Self {
        Self { kind, context }
    }
}

/// The failure category of a [`ParseError`].
///
/// One message template per kind; the payload carries whatever the
/// template needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ErrorKind {
    /// Bad indentation, empty line, stray whitespace, or a declaration
    /// ordering violation (`import` after `implement`, `else` without `if`).
    Syntax { message: String },
    /// Invalid method head: bad name, empty parentheses, uppercase
    /// parameter, `Any` parameter or return type.
    Signature { message: String },
    /// A type, member, method, variable, or package could not be found.
    /// `searched` names the category that was looked up.
    NameResolution { name: String, searched: String },
    /// Argument/parameter mismatch, incompatible reassignment, non-Boolean
    /// `if` condition, mismatched conditional branches, iterator misuse.
    Type { message: String },
    /// A hard structural limit was exceeded.
    LimitExceeded { limit: Limit, actual: usize },
    /// Trait/body contract violations: bodies on trait methods, missing
    /// bodies on non-trait methods, unimplemented trait methods.
    TraitContract { message: String },
    /// A generic parameter could not be inferred or substituted.
    Generic { message: String },
    /// Reassignment of a non-mutable variable or member.
    ImmutableViolation { target: String },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { message } => write!(f, "syntax error: {message}"),
            Self::Signature { message } => write!(f, "invalid method signature: {message}"),
            Self::NameResolution { name, searched } => {
                write!(f, "{searched} `{name}` not found")
            }
            Self::Type { message } => write!(f, "type error: {message}"),
            Self::LimitExceeded { limit, actual } => {
                write!(f, "limit exceeded: {limit} (got {actual})")
            }
            Self::TraitContract { message } => write!(f, "trait contract violated: {message}"),
            Self::Generic { message } => write!(f, "generic error: {message}"),
            Self::ImmutableViolation { target } => {
                write!(f, "cannot reassign immutable `{target}`")
            }
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.context)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display_all_variants() {
        assert_eq!(
            ErrorKind::Syntax { message: "empty line".into() }.to_string(),
            "syntax error: empty line"
        );
        assert_eq!(
            ErrorKind::Signature { message: "empty parentheses".into() }.to_string(),
            "invalid method signature: empty parentheses"
        );
        assert_eq!(
            ErrorKind::NameResolution { name: "Foo".into(), searched: "type".into() }.to_string(),
            "type `Foo` not found"
        );
        assert_eq!(
            ErrorKind::Type { message: "arguments do not match method parameters".into() }
                .to_string(),
            "type error: arguments do not match method parameters"
        );
        assert_eq!(
            ErrorKind::LimitExceeded { limit: Limit::Parameters, actual: 4 }.to_string(),
            "limit exceeded: parameters per method over 3 (got 4)"
        );
        assert_eq!(
            ErrorKind::TraitContract { message: "`Length` is not implemented".into() }.to_string(),
            "trait contract violated: `Length` is not implemented"
        );
        assert_eq!(
            ErrorKind::Generic { message: "cannot substitute `Generic`".into() }.to_string(),
            "generic error: cannot substitute `Generic`"
        );
        assert_eq!(
            ErrorKind::ImmutableViolation { target: "x".into() }.to_string(),
            "cannot reassign immutable `x`"
        );
    }

    #[test]
    fn parse_error_display_includes_context() {
        let err = ParseError::new(
            ErrorKind::Syntax { message: "line starts with spaces".into() },
            SourceContext::new("Counter", 2, "  has number"),
        );
        assert_eq!(
            err.to_string(),
            "syntax error: line starts with spaces at Counter:2\n\t  has number"
        );
    }
}
