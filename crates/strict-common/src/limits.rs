//! Hard structural limits of the Strict language.
//!
//! Every limit is enforced during parsing; a violation raises
//! [`crate::ErrorKind::LimitExceeded`] with the offending line. The value
//! at a limit is legal, one past it is not.

use std::fmt;

use serde::Serialize;

/// Maximum number of members per type.
pub const MAX_MEMBERS: usize = 50;
/// Maximum number of lines per type file.
pub const MAX_TYPE_LINES: usize = 256;
/// Maximum number of methods per type.
pub const MAX_METHODS: usize = 15;
/// Maximum number of characters per line.
pub const MAX_LINE_LENGTH: usize = 120;
/// Maximum indentation depth, measured in tabs.
pub const MAX_NESTING: usize = 5;
/// Maximum number of lines in a single method body.
pub const MAX_BODY_LINES: usize = 12;
/// Maximum number of parameters per method.
pub const MAX_PARAMETERS: usize = 3;

/// Which structural limit a line ran over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Limit {
    Members,
    TypeLines,
    Methods,
    LineLength,
    Nesting,
    BodyLines,
    Parameters,
}

impl Limit {
    /// The hard maximum for this limit.
    pub fn maximum(self) -> usize {
        match self {
            Limit::Members => MAX_MEMBERS,
            Limit::TypeLines => MAX_TYPE_LINES,
            Limit::Methods => MAX_METHODS,
            Limit::LineLength => MAX_LINE_LENGTH,
            Limit::Nesting => MAX_NESTING,
            Limit::BodyLines => MAX_BODY_LINES,
            Limit::Parameters => MAX_PARAMETERS,
        }
    }

    /// What is being counted, for error messages.
    fn subject(self) -> &'static str {
        match self {
            Limit::Members => "members per type",
            Limit::TypeLines => "lines per type",
            Limit::Methods => "methods per type",
            Limit::LineLength => "characters per line",
            Limit::Nesting => "nesting tabs",
            Limit::BodyLines => "lines per method body",
            Limit::Parameters => "parameters per method",
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} over {}", self.subject(), self.maximum())
    }
}
