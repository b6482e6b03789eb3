//! The hierarchical name context: root → package → type → method.
//!
//! A [`Context`] is a lightweight handle into the program arena. Name
//! lookup starts at the innermost context and bubbles to the parent until
//! the root; see [`Program::find_type`](crate::Program::find_type).

use crate::program::{PackageId, Program, TypeId};

/// A node in the name tree. The root is `Context::Package(program.root())`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Package(PackageId),
    Type(TypeId),
    Method { ty: TypeId, method: usize },
}

impl Context {
    /// The parent context; `None` once the root package is reached.
    pub fn parent(self, program: &Program) -> Option<Context> {
        match self {
            Context::Package(id) => program.package(id).parent.map(Context::Package),
            Context::Type(id) => Some(Context::Package(program.ty(id).package)),
            Context::Method { ty, .. } => Some(Context::Type(ty)),
        }
    }

    /// The nearest enclosing package.
    pub fn package(self, program: &Program) -> PackageId {
        match self {
            Context::Package(id) => id,
            Context::Type(id) => program.ty(id).package,
            Context::Method { ty, .. } => program.ty(ty).package,
        }
    }

    /// The enclosing type, if this context is inside one.
    pub fn type_id(self) -> Option<TypeId> {
        match self {
            Context::Package(_) => None,
            Context::Type(id) => Some(id),
            Context::Method { ty, .. } => Some(ty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_chain_reaches_root() {
        let program = Program::new();
        let number = program.known().number;
        let ctx = Context::Method { ty: number, method: 0 };
        let ty_ctx = ctx.parent(&program).unwrap();
        assert_eq!(ty_ctx, Context::Type(number));
        let pkg_ctx = ty_ctx.parent(&program).unwrap();
        assert_eq!(pkg_ctx, Context::Package(program.base()));
        let root_ctx = pkg_ctx.parent(&program).unwrap();
        assert_eq!(root_ctx, Context::Package(program.root()));
        assert_eq!(root_ctx.parent(&program), None);
    }

    #[test]
    fn package_of_method_context() {
        let program = Program::new();
        let number = program.known().number;
        let ctx = Context::Method { ty: number, method: 0 };
        assert_eq!(ctx.package(&program), program.base());
    }
}
