//! Source context for error reporting.
//!
//! Strict is line-oriented: every diagnostic points at a whole line of a
//! type file. A [`SourceContext`] records the owning type, the 1-based line
//! number, the raw line text, and (when inside a body) the method name.

use std::fmt;

use serde::Serialize;

/// Where an error happened: type, line, and optionally the method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceContext {
    /// Name of the type whose file was being parsed.
    pub type_name: String,
    /// 1-based line number within the type file.
    pub line_number: usize,
    /// The raw text of the offending line.
    pub line_text: String,
    /// The enclosing method, when the error happened inside one.
    pub method_name: Option<String>,
}

impl SourceContext {
    /// Create a context for a line outside any method.
    pub fn new(
        type_name: impl Into<String>,
        line_number: usize,
        line_text: impl Into<String>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            line_number,
            line_text: line_text.into(),
            method_name: None,
        }
    }

    /// Attach the enclosing method name.
    pub fn in_method(mut self, method_name: impl Into<String>) -> Self {
        self.method_name = Some(method_name.into());
        self
    }
}

impl fmt::Display for SourceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.type_name, self.line_number)?;
        if let Some(method) = &self.method_name {
            write!(f, " in {}", method)?;
        }
        if !self.line_text.is_empty() {
            write!(f, "\n\t{}", self.line_text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_display_without_method() {
        let ctx = SourceContext::new("Counter", 3, "has number");
        assert_eq!(ctx.to_string(), "Counter:3\n\thas number");
    }

    #[test]
    fn context_display_with_method() {
        let ctx = SourceContext::new("Counter", 5, "\tresult + 1").in_method("Count");
        assert_eq!(ctx.to_string(), "Counter:5 in Count\n\t\tresult + 1");
    }
}
