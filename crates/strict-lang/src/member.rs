//! Members: the `has` declarations of a type.

use crate::program::TypeId;

/// A `has` declaration.
///
/// The declared type is resolved eagerly when written explicitly or
/// derivable from the member name (auto-alias). A member with only an
/// initializer keeps `ty = None` until the expression parser types the
/// initializer on first access.
#[derive(Debug, Clone)]
pub struct Member {
    pub name: String,
    pub ty: Option<TypeId>,
    /// Raw initializer expression text after `=`, parsed lazily.
    pub initializer: Option<String>,
    pub is_mutable: bool,
    /// 1-based line of the declaration, for error context.
    pub line: usize,
}

impl Member {
    pub fn new(name: impl Into<String>, ty: Option<TypeId>, line: usize) -> Self {
        Self {
            name: name.into(),
            ty,
            initializer: None,
            is_mutable: false,
            line,
        }
    }

    /// Clone this member for a generic instantiation, mapping its declared
    /// type through the substitution.
    pub(crate) fn clone_with_substitution(
        &self,
        substitute: &impl Fn(TypeId) -> TypeId,
    ) -> Member {
        Member {
            name: self.name.clone(),
            ty: self.ty.map(substitute),
            initializer: self.initializer.clone(),
            is_mutable: self.is_mutable,
            line: self.line,
        }
    }
}
