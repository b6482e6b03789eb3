//! Ariadne-based rendering of parse errors.
//!
//! Renders a [`ParseError`] against the file source with a stable error
//! code per kind and a label on the offending line. Output is colorless so
//! it can be asserted in tests.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};

use strict_common::{ErrorKind, ParseError};

/// Stable code per error kind.
pub fn error_code(kind: &ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Syntax { .. } => "E0001",
        ErrorKind::Signature { .. } => "E0002",
        ErrorKind::NameResolution { .. } => "E0003",
        ErrorKind::Type { .. } => "E0004",
        ErrorKind::LimitExceeded { .. } => "E0005",
        ErrorKind::TraitContract { .. } => "E0006",
        ErrorKind::Generic { .. } => "E0007",
        ErrorKind::ImmutableViolation { .. } => "E0008",
    }
}

/// Byte range of a 1-based line within the source, clamped to the source.
fn line_span(source: &str, line_number: usize) -> Range<usize> {
    for (index, line) in source.lines().enumerate() {
        if index + 1 == line_number {
            let offset = line.as_ptr() as usize - source.as_ptr() as usize;
            let end = (offset + line.len()).max(offset + 1).min(source.len());
            return offset..end;
        }
    }
    source.len().saturating_sub(1)..source.len()
}

/// Render one error against its file source.
pub fn render(error: &ParseError, source: &str) -> String {
    if source.is_empty() {
        return error.to_string();
    }
    let config = Config::default().with_color(false);
    let span = line_span(source, error.context.line_number);
    let label_message = match &error.context.method_name {
        Some(method) => format!("in method `{method}`"),
        None => format!("in `{}`", error.context.type_name),
    };

    let report = Report::build(ReportKind::Error, span.clone())
        .with_code(error_code(&error.kind))
        .with_message(error.kind.to_string())
        .with_config(config)
        .with_label(Label::new(span).with_message(label_message).with_color(Color::Red))
        .finish();

    let mut buffer = Vec::new();
    let cache = Source::from(source);
    if report.write(cache, &mut buffer).is_err() {
        return error.to_string();
    }
    String::from_utf8(buffer).unwrap_or_else(|_| error.to_string())
}
