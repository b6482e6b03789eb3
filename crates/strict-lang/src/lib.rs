//! Package loading, type declarations, and type resolution for Strict.
//!
//! The language is line-oriented and indentation-significant: one type per
//! `.strict` file, declarations ordered `import` → `implement` → `has` →
//! methods, method bodies stored raw and parsed lazily by the expression
//! parser crate. All packages and types live in arenas on [`Program`];
//! ids ([`PackageId`], [`TypeId`]) replace owning pointers.

mod admit;
mod builtins;
pub mod body;
pub mod context;
mod decl;
pub mod expr;
mod generics;
pub mod loader;
pub mod member;
pub mod method;
pub mod package;
pub mod program;
mod resolver;
mod signature;
pub mod ty;

pub use body::{Body, Variable};
pub use context::Context;
pub use expr::{Expression, ExpressionKind};
pub use loader::load_package;
pub use member::Member;
pub use method::{Method, Parameter};
pub use package::Package;
pub use program::{KnownTypes, PackageId, Program, TypeId};
pub use ty::{GenericKind, MethodSlot, Type};
