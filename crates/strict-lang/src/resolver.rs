//! Name and method resolution.
//!
//! Two lookup surfaces: [`Program::find_type`] bubbles a name through the
//! context chain (current type → package → imports → parents → Base), and
//! [`Program::available_methods`] lazily unions the methods of a type with
//! every transitively implemented trait plus `Any`. Overload selection is
//! arity-first with pairwise compatibility.

use rustc_hash::FxHashMap;

use strict_common::{ErrorKind, ParseError, SourceContext};

use crate::context::Context;
use crate::method::Method;
use crate::program::{Program, TypeId};
use crate::ty::{GenericKind, MethodSlot};

impl Program {
    /// Resolve a type name from a context.
    ///
    /// Dotted names are matched against fully-qualified package paths. The
    /// special name `Value` inside a method resolves to the owning type. A
    /// plural name whose singular names a type resolves to the `List`
    /// instantiation of the singular (`Numbers` → `List(Number)`).
    pub fn find_type(&mut self, context: Context, name: &str) -> Option<TypeId> {
        if let Some(found) = self.find_type_direct(context, name) {
            return Some(found);
        }
        // Plural fallback instantiates on demand, which is why this lookup
        // needs `&mut self`.
        if name.len() > 1 && name.ends_with('s') {
            let singular = &name[..name.len() - 1];
            if let Some(element) = self.find_type_direct(context, singular) {
                let list = self.known().list;
                if let Ok(instance) = self.instantiate(list, vec![element]) {
                    return Some(instance);
                }
            }
        }
        None
    }

    fn find_type_direct(&self, context: Context, name: &str) -> Option<TypeId> {
        if name == "Value" {
            if let Context::Method { ty, .. } = context {
                return Some(ty);
            }
        }
        if name.contains('.') {
            return self.find_qualified(name);
        }
        if let Some(ty) = context.type_id() {
            if self.ty(ty).name == name {
                return Some(ty);
            }
        }
        if let Some(found) = self.package(context.package(self)).find_type(name) {
            return Some(found);
        }
        if let Some(ty) = context.type_id() {
            for &import in &self.ty(ty).imports {
                if let Some(found) = self.package(import).find_type(name) {
                    return Some(found);
                }
            }
        }
        let mut package = self.package(context.package(self)).parent;
        while let Some(id) = package {
            if let Some(found) = self.package(id).find_type(name) {
                return Some(found);
            }
            package = self.package(id).parent;
        }
        self.package(self.base()).find_type(name)
    }

    /// Resolve a dotted name such as `Base.Number` against full package
    /// paths starting at the root.
    fn find_qualified(&self, name: &str) -> Option<TypeId> {
        let mut segments = name.split('.');
        let first = segments.next()?;
        let mut package = self
            .package(self.root())
            .children
            .iter()
            .copied()
            .find(|&id| self.package(id).name == first)?;
        let mut segments = segments.peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                return self.package(package).find_type(segment);
            }
            package = self
                .package(package)
                .children
                .iter()
                .copied()
                .find(|&id| self.package(id).name == segment)?;
        }
        None
    }

    /// The lazily built union of methods visible on a type: its own, every
    /// transitively implemented trait's, and `Any`'s. `Mutable(T)` lookups
    /// also delegate to T.
    pub fn available_methods(&mut self, ty: TypeId) -> &FxHashMap<String, Vec<MethodSlot>> {
        if self.ty(ty).available_methods.is_none() {
            let map = self.build_available_methods(ty);
            self.ty_mut(ty).available_methods = Some(map);
        }
        self.ty_mut(ty)
            .available_methods
            .get_or_insert_with(FxHashMap::default)
    }

    fn build_available_methods(&self, ty: TypeId) -> FxHashMap<String, Vec<MethodSlot>> {
        let mut map = FxHashMap::default();
        let mut visited = Vec::new();
        self.collect_methods(ty, &mut map, &mut visited);
        if let Some(data) = self.data_type(ty) {
            self.collect_methods(data, &mut map, &mut visited);
        }
        let any = self.known().any;
        self.collect_methods(any, &mut map, &mut visited);
        map
    }

    fn collect_methods(
        &self,
        ty: TypeId,
        map: &mut FxHashMap<String, Vec<MethodSlot>>,
        visited: &mut Vec<TypeId>,
    ) {
        if visited.contains(&ty) {
            return;
        }
        visited.push(ty);
        for (index, method) in self.ty(ty).methods.iter().enumerate() {
            map.entry(method.name.clone())
                .or_insert_with(Vec::new)
                .push(MethodSlot { ty, index });
        }
        for &base in &self.ty(ty).implements {
            self.collect_methods(base, map, visited);
        }
    }

    /// Convenience accessor for a method through its slot.
    pub fn method(&self, slot: MethodSlot) -> &Method {
        &self.ty(slot.ty).methods[slot.index]
    }

    /// Select the method overload for a call.
    ///
    /// The first candidate with matching arity whose parameter types are
    /// pairwise compatible with the argument types wins. An arity match
    /// with incompatible types is an argument mismatch; with no arity match
    /// the last same-name candidate is reported as the closest.
    pub fn find_method(
        &mut self,
        ty: TypeId,
        name: &str,
        arguments: &[TypeId],
        context: &SourceContext,
    ) -> Result<MethodSlot, ParseError> {
        let candidates = match self.available_methods(ty).get(name) {
            Some(candidates) => candidates.clone(),
            None => {
                return Err(ParseError::new(
                    ErrorKind::NameResolution { name: name.to_string(), searched: "method".into() },
                    context.clone(),
                ))
            }
        };
        let mut arity_match = None;
        for &slot in &candidates {
            let method = self.method(slot);
            // Trailing parameters with default values may be omitted.
            let optional = method
                .parameters
                .iter()
                .rev()
                .take_while(|parameter| parameter.default_value.is_some())
                .count();
            let required = method.parameters.len() - optional;
            if arguments.len() < required || arguments.len() > method.parameters.len() {
                continue;
            }
            arity_match = Some(slot);
            let compatible = arguments
                .iter()
                .zip(&method.parameters)
                .all(|(&argument, parameter)| self.is_compatible(argument, parameter.ty));
            if compatible {
                return Ok(slot);
            }
        }
        let kind = match (arity_match, candidates.last()) {
            (Some(slot), _) => ErrorKind::Type {
                message: format!(
                    "arguments do not match method parameters: `{}`",
                    self.method_signature(slot)
                ),
            },
            (None, Some(&best)) => ErrorKind::Type {
                message: format!(
                    "no overload of `{}` takes {} arguments; closest is `{}`",
                    name,
                    arguments.len(),
                    self.method_signature(best)
                ),
            },
            (None, None) => ErrorKind::NameResolution {
                name: name.to_string(),
                searched: "method".into(),
            },
        };
        Err(ParseError::new(kind, context.clone()))
    }

    /// Render a method head for error messages, e.g.
    /// `from(start Number, end Number) Range`.
    pub fn method_signature(&self, slot: MethodSlot) -> String {
        let method = self.method(slot);
        let parameters: Vec<String> = method
            .parameters
            .iter()
            .map(|parameter| format!("{} {}", parameter.name, self.ty(parameter.ty).name))
            .collect();
        let none = self.known().none;
        let mut signature = if parameters.is_empty() {
            method.name.clone()
        } else {
            format!("{}({})", method.name, parameters.join(", "))
        };
        if method.return_type != none {
            signature.push(' ');
            signature.push_str(&self.ty(method.return_type).name);
        }
        signature
    }

    /// Whether a value of type `from` can be used where `to` is expected.
    ///
    /// Holds on equality, for `Any`, for transitive `implements`, and for
    /// the allowed upcasts: Number → Text, element → List of that element,
    /// and `Mutable(T)` → T.
    pub fn is_compatible(&self, from: TypeId, to: TypeId) -> bool {
        if from == to {
            return true;
        }
        let known = self.known();
        if to == known.any {
            return true;
        }
        let mut visited = Vec::new();
        if self.implements_transitively(from, to, &mut visited) {
            return true;
        }
        if from == known.number && to == known.text {
            return true;
        }
        if let GenericKind::Instance { template, arguments } = &self.ty(to).generic {
            if *template == known.list && arguments.first() == Some(&from) {
                return true;
            }
        }
        if self.data_type(from) == Some(to) {
            return true;
        }
        false
    }

    fn implements_transitively(&self, from: TypeId, to: TypeId, visited: &mut Vec<TypeId>) -> bool {
        if visited.contains(&from) {
            return false;
        }
        visited.push(from);
        for &base in &self.ty(from).implements {
            if base == to || self.implements_transitively(base, to, visited) {
                return true;
            }
        }
        false
    }

    /// The element type an iterable yields: Numbers for `Range`, the
    /// element for `List` instances, transitively through `implements`.
    pub fn element_type(&self, ty: TypeId) -> Option<TypeId> {
        let known = self.known();
        if ty == known.range {
            return Some(known.number);
        }
        if let GenericKind::Instance { template, arguments } = &self.ty(ty).generic {
            if *template == known.list {
                return arguments.first().copied();
            }
        }
        for &base in &self.ty(ty).implements {
            if let Some(element) = self.element_type(base) {
                return Some(element);
            }
        }
        None
    }
}
