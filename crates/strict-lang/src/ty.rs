//! Types: the per-file unit of the language.
//!
//! A `Type` holds the parsed declarations of one `.strict` file: imports,
//! implemented traits/base types, members, and methods. Whether a type is a
//! trait is derived, not declared: a type with no members and no implements
//! supplies only method signatures.

use rustc_hash::FxHashMap;

use crate::member::Member;
use crate::method::Method;
use crate::program::{PackageId, TypeId};

/// Generic classification of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenericKind {
    /// An ordinary concrete type.
    None,
    /// A template mentioning the `Generic` placeholder (`List`, `Mutable`).
    Template,
    /// A concrete type produced by substituting implementation types into
    /// a template, e.g. `Numbers` = `List` instantiated with `Number`.
    Instance {
        template: TypeId,
        arguments: Vec<TypeId>,
    },
}

/// Where a method lives: owning type plus index into its method list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSlot {
    pub ty: TypeId,
    pub index: usize,
}

/// A user-defined data or trait unit; one per source file.
#[derive(Debug)]
pub struct Type {
    pub name: String,
    pub package: PackageId,
    /// Packages made visible with `import`.
    pub imports: Vec<PackageId>,
    /// Traits and base types declared with `implement`.
    pub implements: Vec<TypeId>,
    pub members: Vec<Member>,
    pub methods: Vec<Method>,
    /// Built-in Base types skip the trait/body contract.
    pub is_builtin: bool,
    pub generic: GenericKind,
    /// Lazily built union of methods visible on this type; see
    /// [`Program::available_methods`](crate::Program::available_methods).
    pub(crate) available_methods: Option<FxHashMap<String, Vec<MethodSlot>>>,
}

impl Type {
    pub(crate) fn new(name: impl Into<String>, package: PackageId) -> Self {
        Self {
            name: name.into(),
            package,
            imports: Vec::new(),
            implements: Vec::new(),
            members: Vec::new(),
            methods: Vec::new(),
            is_builtin: false,
            generic: GenericKind::None,
            available_methods: None,
        }
    }

    /// A trait has no members and no implements; it only declares method
    /// signatures. Built-in value types are never traits.
    pub fn is_trait(&self) -> bool {
        !self.is_builtin && self.implements.is_empty() && self.members.is_empty()
    }

    /// Whether this type is a generic template awaiting instantiation.
    pub fn is_generic_template(&self) -> bool {
        self.generic == GenericKind::Template
    }

    /// Find a member by name.
    pub fn find_member(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|member| member.name == name)
    }

    /// Find the first method with the given name.
    pub fn find_method_named(&self, name: &str) -> Option<usize> {
        self.methods.iter().position(|method| method.name == name)
    }
}
