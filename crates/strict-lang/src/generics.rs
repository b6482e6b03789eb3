//! Generic type instantiation.
//!
//! A template (`List`, `Mutable`, or a user type mentioning `Generic`)
//! becomes a concrete type by substituting implementation types into a
//! memberwise clone. Instances are cached per `(template, arguments)`, so
//! instantiating twice returns the same id.

use strict_common::ErrorKind;

use crate::program::{Program, TypeId};
use crate::ty::GenericKind;

/// `List` instances pluralize their element: `Number` → `Numbers`.
pub(crate) fn pluralize(name: &str) -> String {
    format!("{name}s")
}

impl Program {
    /// Produce (or fetch) the concrete type for `template(arguments…)`.
    ///
    /// Members and methods mentioning the `Generic` placeholder are cloned
    /// with the first implementation type substituted; references to the
    /// template itself become the instance, so `List.+` returns `Numbers`
    /// on a `Numbers` value.
    pub fn instantiate(
        &mut self,
        template: TypeId,
        arguments: Vec<TypeId>,
    ) -> Result<TypeId, ErrorKind> {
        if let Some(&instance) = self.generic_instances.get(&(template, arguments.clone())) {
            return Ok(instance);
        }
        if !self.ty(template).is_generic_template() {
            return Err(ErrorKind::Generic {
                message: format!("`{}` is not a generic type", self.ty(template).name),
            });
        }
        let Some(&first_argument) = arguments.first() else {
            return Err(ErrorKind::Generic {
                message: format!(
                    "`{}` needs at least one implementation type",
                    self.ty(template).name
                ),
            });
        };

        let known = self.known();
        let name = if template == known.list {
            pluralize(&self.ty(first_argument).name)
        } else {
            let names: Vec<&str> = arguments.iter().map(|id| self.ty(*id).name.as_str()).collect();
            format!("{}({})", self.ty(template).name, names.join(", "))
        };
        let package = self.ty(template).package;
        if self.get_type(package, &name).is_some() {
            return Err(ErrorKind::Generic {
                message: format!("type `{name}` already exists and is not this instantiation"),
            });
        }

        let instance = self.insert_type(package, &name);
        let substitute = |ty: TypeId| {
            if ty == known.generic {
                first_argument
            } else if ty == template {
                instance
            } else {
                ty
            }
        };
        let members: Vec<_> = self
            .ty(template)
            .members
            .iter()
            .map(|member| member.clone_with_substitution(&substitute))
            .collect();
        let methods: Vec<_> = self
            .ty(template)
            .methods
            .iter()
            .map(|method| method.clone_with_substitution(&substitute))
            .collect();
        let is_builtin = self.ty(template).is_builtin;

        let ty = self.ty_mut(instance);
        ty.is_builtin = is_builtin;
        ty.generic = GenericKind::Instance { template, arguments: arguments.clone() };
        ty.members = members;
        ty.methods = methods;

        self.generic_instances.insert((template, arguments), instance);
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_instance_is_pluralized() {
        let mut program = Program::new();
        let known = program.known();
        let numbers = program.instantiate(known.list, vec![known.number]).unwrap();
        assert_eq!(program.ty(numbers).name, "Numbers");
        // The cloned `+` returns the instance, not the template.
        let plus = program.ty(numbers).find_method_named("+").unwrap();
        assert_eq!(program.ty(numbers).methods[plus].return_type, numbers);
        // `contains` takes the element type after substitution.
        let contains = program.ty(numbers).find_method_named("contains").unwrap();
        assert_eq!(
            program.ty(numbers).methods[contains].parameters[0].ty,
            known.number
        );
    }

    #[test]
    fn instantiating_twice_returns_the_same_type() {
        let mut program = Program::new();
        let known = program.known();
        let first = program.instantiate(known.list, vec![known.number]).unwrap();
        let second = program.instantiate(known.list, vec![known.number]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn mutable_instance_records_data_type() {
        let mut program = Program::new();
        let known = program.known();
        let wrapped = program.instantiate(known.mutable, vec![known.number]).unwrap();
        assert_eq!(program.ty(wrapped).name, "Mutable(Number)");
        assert_eq!(program.data_type(wrapped), Some(known.number));
    }

    #[test]
    fn non_generic_type_cannot_be_instantiated() {
        let mut program = Program::new();
        let known = program.known();
        let err = program.instantiate(known.number, vec![known.text]).unwrap_err();
        assert!(matches!(err, ErrorKind::Generic { .. }));
    }
}
