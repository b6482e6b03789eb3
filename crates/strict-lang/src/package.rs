//! Packages: directory-backed namespaces holding types.

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use crate::program::{PackageId, TypeId};

/// A namespace rooted at a directory. Holds the types of its `.strict`
/// files and links to its parent and child packages.
#[derive(Debug)]
pub struct Package {
    /// Folder name; empty for the invisible root.
    pub name: String,
    pub parent: Option<PackageId>,
    /// Directory this package was loaded from; empty for `Base` and root.
    pub folder: PathBuf,
    pub children: Vec<PackageId>,
    types: FxHashMap<String, TypeId>,
    /// Insertion order of types, for deterministic iteration.
    order: Vec<TypeId>,
}

impl Package {
    pub(crate) fn new(
        name: impl Into<String>,
        parent: Option<PackageId>,
        folder: PathBuf,
    ) -> Self {
        Self {
            name: name.into(),
            parent,
            folder,
            children: Vec::new(),
            types: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, name: &str, id: TypeId) {
        self.types.insert(name.to_string(), id);
        self.order.push(id);
    }

    /// Look up a type by name in this package only.
    pub fn find_type(&self, name: &str) -> Option<TypeId> {
        self.types.get(name).copied()
    }

    /// All types of this package in insertion order.
    pub fn types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.order.iter().copied()
    }

    /// Number of types registered in this package.
    pub fn type_count(&self) -> usize {
        self.order.len()
    }
}
