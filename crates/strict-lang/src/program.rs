//! The program arena: every package and type created by a load lives here.
//!
//! Packages and types are stored in flat vectors and addressed by
//! [`PackageId`] and [`TypeId`]. Back-references (type → package,
//! instance → template) are indices, so the object graph has no ownership
//! cycles. Lazy state (available-method caches, parsed bodies, generic
//! instances) is reached through `&mut Program`; after loading no locks are
//! needed.

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use strict_common::{ErrorKind, ParseError, SourceContext};

use crate::builtins;
use crate::package::Package;
use crate::ty::{GenericKind, Type};

/// A unique identifier for a package within a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackageId(pub u32);

/// A unique identifier for a type within a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

/// Ids of the built-in Base types, resolved once at program creation.
#[derive(Debug, Clone, Copy)]
pub struct KnownTypes {
    pub any: TypeId,
    pub none: TypeId,
    pub number: TypeId,
    pub text: TypeId,
    pub boolean: TypeId,
    pub character: TypeId,
    pub log: TypeId,
    pub range: TypeId,
    pub list: TypeId,
    pub mutable: TypeId,
    pub binary_operator: TypeId,
    pub generic: TypeId,
}

/// The arena of packages and types produced by one load.
#[derive(Debug)]
pub struct Program {
    packages: Vec<Package>,
    types: Vec<Type>,
    root: PackageId,
    base: PackageId,
    main: Option<PackageId>,
    known: Option<KnownTypes>,
    pub(crate) generic_instances: FxHashMap<(TypeId, Vec<TypeId>), TypeId>,
}

impl Program {
    /// Create a program containing only the root and the built-in `Base`
    /// package.
    pub fn new() -> Self {
        let mut program = Self {
            packages: Vec::new(),
            types: Vec::new(),
            root: PackageId(0),
            base: PackageId(0),
            main: None,
            known: None,
            generic_instances: FxHashMap::default(),
        };
        program.root = program.insert_package("", None, PathBuf::new());
        program.base = program.insert_package("Base", Some(program.root), PathBuf::new());
        let known = builtins::register(&mut program);
        program.known = Some(known);
        program
    }

    /// The invisible root package above `Base` and the user package.
    pub fn root(&self) -> PackageId {
        self.root
    }

    /// The built-in `Base` package.
    pub fn base(&self) -> PackageId {
        self.base
    }

    /// The top-level package of the loaded folder, if one was loaded.
    pub fn main_package(&self) -> Option<PackageId> {
        self.main
    }

    pub(crate) fn set_main_package(&mut self, package: PackageId) {
        self.main = Some(package);
    }

    /// Ids of the built-in Base types.
    pub fn known(&self) -> KnownTypes {
        match self.known {
            Some(known) => known,
            // Only reachable from builtin registration itself, which never
            // asks for known types.
            None => unreachable!("known types are set during Program::new"),
        }
    }

    /// Look up a package by id.
    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.0 as usize]
    }

    pub(crate) fn package_mut(&mut self, id: PackageId) -> &mut Package {
        &mut self.packages[id.0 as usize]
    }

    /// Look up a type by id.
    pub fn ty(&self, id: TypeId) -> &Type {
        &self.types[id.0 as usize]
    }

    pub(crate) fn ty_mut(&mut self, id: TypeId) -> &mut Type {
        &mut self.types[id.0 as usize]
    }

    /// Number of types in the arena (instances included).
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Add a child package. The name is the folder name.
    pub fn add_package(
        &mut self,
        name: impl Into<String>,
        parent: PackageId,
        folder: PathBuf,
    ) -> PackageId {
        self.insert_package(name, Some(parent), folder)
    }

    fn insert_package(
        &mut self,
        name: impl Into<String>,
        parent: Option<PackageId>,
        folder: PathBuf,
    ) -> PackageId {
        let id = PackageId(self.packages.len() as u32);
        self.packages.push(Package::new(name, parent, folder));
        if let Some(parent) = parent {
            self.package_mut(parent).children.push(id);
        }
        id
    }

    /// Register a type stub in a package. The stub has no declarations yet;
    /// registering all stubs before parsing lets forward references resolve.
    ///
    /// Duplicate names within one package are rejected.
    pub fn add_type(&mut self, package: PackageId, name: &str) -> Result<TypeId, ParseError> {
        if self.package(package).find_type(name).is_some() {
            return Err(ParseError::new(
                ErrorKind::Syntax {
                    message: format!(
                        "type `{}` already exists in package `{}`",
                        name,
                        self.package(package).name
                    ),
                },
                SourceContext::new(name, 1, ""),
            ));
        }
        Ok(self.insert_type(package, name))
    }

    /// Insert a type without a duplicate check. Used for builtins and
    /// generic instances whose names are derived and checked by the caller.
    pub(crate) fn insert_type(&mut self, package: PackageId, name: &str) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(Type::new(name, package));
        self.package_mut(package).insert(name, id);
        id
    }

    /// Look up a type by name within one package, without bubbling.
    pub fn get_type(&self, package: PackageId, name: &str) -> Option<TypeId> {
        self.package(package).find_type(name)
    }

    /// The underlying value type of a `Mutable(T)` instance.
    pub fn data_type(&self, ty: TypeId) -> Option<TypeId> {
        match &self.ty(ty).generic {
            GenericKind::Instance { template, arguments } if *template == self.known().mutable => {
                arguments.first().copied()
            }
            _ => None,
        }
    }

    /// Store the parsed body of a method and return it. Used by the
    /// expression parser crate; the caller checks for an existing body
    /// first, so the first writer wins.
    pub fn set_method_body(&mut self, ty: TypeId, method: usize, body: crate::body::Body) -> &crate::body::Body {
        self.ty_mut(ty).methods[method].set_body(body)
    }

    /// Record the resolved type of a member whose declaration deferred it
    /// to its initializer.
    pub fn resolve_member(&mut self, ty: TypeId, member: usize, resolved: TypeId, is_mutable: bool) {
        let member = &mut self.ty_mut(ty).members[member];
        member.ty = Some(resolved);
        if is_mutable {
            member.is_mutable = true;
        }
    }

    /// The full dotted name of a type, e.g. `Base.Number`.
    pub fn full_name(&self, ty: TypeId) -> String {
        let ty = self.ty(ty);
        let mut parts = vec![ty.name.clone()];
        let mut package = Some(ty.package);
        while let Some(id) = package {
            let pkg = self.package(id);
            if !pkg.name.is_empty() {
                parts.push(pkg.name.clone());
            }
            package = pkg.parent;
        }
        parts.reverse();
        parts.join(".")
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}
