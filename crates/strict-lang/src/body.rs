//! Bodies: indentation-delimited scopes of ordered expressions.

use std::fmt;
use std::ops::Range;

use crate::expr::{Expression, ExpressionKind};
use crate::program::TypeId;

/// A variable bound in a body by `let`, `constant`, `mutable`, or a `for`
/// loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub ty: TypeId,
    pub is_mutable: bool,
}

/// One indentation scope of a method body.
///
/// Child bodies (of `if`/`else`/`for`) live inside their owning expression;
/// a body records only its own depth, line range, expressions, and the
/// variables bound directly in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Indentation depth in tabs, 1 for the method's top-level body.
    pub tabs: usize,
    /// 1-based line numbers covered by this body, end exclusive.
    pub line_range: Range<usize>,
    pub expressions: Vec<Expression>,
    pub variables: Vec<Variable>,
    pub return_type: TypeId,
}

impl Body {
    /// Look up a variable bound directly in this body.
    pub fn find_variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|variable| variable.name == name)
    }

    /// The type a `return` inside this body (or a nested one) propagates
    /// upward, if any expression returns.
    pub fn returned_type(&self) -> Option<TypeId> {
        for expression in &self.expressions {
            match &expression.kind {
                ExpressionKind::Return(value) => return Some(value.return_type),
                ExpressionKind::If { then, otherwise, .. } => {
                    if let Some(ty) = then.returned_type() {
                        return Some(ty);
                    }
                    if let Some(ty) = otherwise.as_ref().and_then(Body::returned_type) {
                        return Some(ty);
                    }
                }
                ExpressionKind::For { body, .. } => {
                    if let Some(ty) = body.returned_type() {
                        return Some(ty);
                    }
                }
                _ => {}
            }
        }
        None
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = "\t".repeat(self.tabs);
        for (index, expression) in self.expressions.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{indent}{expression}")?;
        }
        Ok(())
    }
}
