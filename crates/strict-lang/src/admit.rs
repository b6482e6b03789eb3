//! Admission: resolving parsed declarations into the program arena.
//!
//! Runs sequentially after every stub of a load is registered, so forward
//! references resolve regardless of file order. Resolves imports,
//! implements, member and signature types (instantiating generics on
//! demand), then enforces the trait/body contract.

use strict_common::{ErrorKind, ParseError, SourceContext};

use crate::context::Context;
use crate::decl::{capitalize, TypeDeclarations};
use crate::member::Member;
use crate::method::{Method, Parameter};
use crate::program::{PackageId, Program, TypeId};
use crate::signature::split_top_level;

/// Resolve and install the declarations of one type.
///
/// Contract checks run separately in [`check_contracts`] once every type
/// of the load is admitted, so an implementer never races its trait.
pub(crate) fn admit(
    program: &mut Program,
    ty: TypeId,
    decls: &TypeDeclarations,
) -> Result<(), ParseError> {
    let type_name = program.ty(ty).name.clone();
    let context = Context::Type(ty);

    let mut imports = Vec::new();
    for (name, line) in &decls.imports {
        let source = SourceContext::new(type_name.as_str(), *line, format!("import {name}"));
        let package = find_package(program, name).ok_or_else(|| {
            ParseError::new(
                ErrorKind::NameResolution { name: name.clone(), searched: "package".into() },
                source,
            )
        })?;
        imports.push(package);
    }
    program.ty_mut(ty).imports = imports;

    let mut implements = Vec::new();
    for (name, line) in &decls.implements {
        let source = SourceContext::new(type_name.as_str(), *line, format!("implement {name}"));
        let base = program.find_type(context, name).ok_or_else(|| {
            ParseError::new(
                ErrorKind::NameResolution { name: name.clone(), searched: "type".into() },
                source,
            )
        })?;
        implements.push(base);
    }
    program.ty_mut(ty).implements = implements;

    let mut members = Vec::new();
    for decl in &decls.members {
        let source = SourceContext::new(type_name.as_str(), decl.line, format!("has {}", decl.name));
        let mut member = Member::new(decl.name.clone(), None, decl.line);
        member.initializer = decl.initializer.clone();
        if let Some(text) = &decl.type_name {
            let resolved = resolve_type_name(program, context, text, &source)?;
            // `Mutable(T)` members are mutable and hold a T.
            if let Some(data) = program.data_type(resolved) {
                member.is_mutable = true;
                member.ty = Some(data);
            } else {
                member.ty = Some(resolved);
            }
        } else if decl.initializer.is_none() {
            let alias = capitalize(&decl.name);
            let resolved = program.find_type(context, &alias).ok_or_else(|| {
                ParseError::new(
                    ErrorKind::NameResolution { name: alias.clone(), searched: "type".into() },
                    source,
                )
            })?;
            member.ty = Some(resolved);
        }
        members.push(member);
    }
    program.ty_mut(ty).members = members;

    let mut methods = Vec::new();
    for decl in &decls.methods {
        let source = SourceContext::new(type_name.as_str(), decl.line, "").in_method(decl.name.clone());
        let mut parameters = Vec::new();
        for parameter in &decl.parameters {
            let resolved = match &parameter.type_name {
                Some(text) => resolve_type_name(program, context, text, &source)?,
                None => {
                    let alias = capitalize(&parameter.name);
                    program.find_type(context, &alias).ok_or_else(|| {
                        ParseError::new(
                            ErrorKind::NameResolution { name: alias.clone(), searched: "type".into() },
                            source.clone(),
                        )
                    })?
                }
            };
            let mut resolved_parameter = Parameter::new(parameter.name.clone(), resolved);
            resolved_parameter.is_mutable = parameter.is_mutable;
            if let Some(data) = program.data_type(resolved) {
                resolved_parameter.is_mutable = true;
                resolved_parameter.ty = data;
            }
            resolved_parameter.default_value = parameter.default_value.clone();
            parameters.push(resolved_parameter);
        }
        let return_type = match &decl.return_type_name {
            Some(text) => resolve_type_name(program, context, text, &source)?,
            None if decl.name == "from" => ty,
            None => program.known().none,
        };
        methods.push(
            Method::new(decl.name.clone(), parameters, return_type, decl.line)
                .with_body_lines(decl.body_lines.clone(), decl.body_start_line),
        );
    }
    program.ty_mut(ty).methods = methods;
    Ok(())
}

/// Trait/body contract checks, run once every type of the load is
/// resolved.
pub(crate) fn check_contracts(
    program: &Program,
    ty: TypeId,
    decls: &TypeDeclarations,
) -> Result<(), ParseError> {
    let t = program.ty(ty);
    let type_name = &t.name;
    if t.is_trait() {
        for method in &t.methods {
            if !method.body_lines().is_empty() {
                return Err(ParseError::new(
                    ErrorKind::TraitContract {
                        message: format!("trait `{type_name}` must not supply method bodies"),
                    },
                    SourceContext::new(type_name.as_str(), method.line, "").in_method(method.name.clone()),
                ));
            }
        }
        return Ok(());
    }
    if t.methods.is_empty() && t.members.len() + t.implements.len() < 2 {
        return Err(ParseError::new(
            ErrorKind::Syntax {
                message: format!(
                    "`{type_name}` must have at least one method or two members/implements"
                ),
            },
            SourceContext::new(type_name.as_str(), 1, ""),
        ));
    }
    for method in &t.methods {
        if method.body_lines().is_empty() {
            return Err(ParseError::new(
                ErrorKind::TraitContract {
                    message: format!("method `{}` of `{type_name}` has no body", method.name),
                },
                SourceContext::new(type_name.as_str(), method.line, "").in_method(method.name.clone()),
            ));
        }
    }
    // Every method a trait declares (except `from`) must appear on the
    // implementer.
    for (index, &base) in t.implements.iter().enumerate() {
        if !program.ty(base).is_trait() {
            continue;
        }
        for required in &program.ty(base).methods {
            if required.name == "from" {
                continue;
            }
            if t.find_method_named(&required.name).is_none() {
                let (trait_name, line) = match decls.implements.get(index) {
                    Some((name, line)) => (name.clone(), *line),
                    None => (program.ty(base).name.clone(), 1),
                };
                return Err(ParseError::new(
                    ErrorKind::TraitContract {
                        message: format!(
                            "method `{}` of trait `{}` must be implemented",
                            required.name, trait_name
                        ),
                    },
                    SourceContext::new(type_name.as_str(), line, format!("implement {trait_name}")),
                ));
            }
        }
    }
    Ok(())
}

/// Resolve a possibly-generic type name such as `Number`, `Numbers`, or
/// `Mutable(Number)`.
pub(crate) fn resolve_type_name(
    program: &mut Program,
    context: Context,
    text: &str,
    source: &SourceContext,
) -> Result<TypeId, ParseError> {
    if let Some(open) = text.find('(') {
        let Some(inner) = text[open + 1..].strip_suffix(')') else {
            return Err(ParseError::new(
                ErrorKind::Syntax { message: format!("unclosed parentheses in type `{text}`") },
                source.clone(),
            ));
        };
        let template_name = &text[..open];
        let template = program.find_type(context, template_name).ok_or_else(|| {
            ParseError::new(
                ErrorKind::NameResolution {
                    name: template_name.to_string(),
                    searched: "type".into(),
                },
                source.clone(),
            )
        })?;
        let mut arguments = Vec::new();
        for part in split_top_level(inner, ',') {
            arguments.push(resolve_type_name(program, context, part.trim(), source)?);
        }
        return program
            .instantiate(template, arguments)
            .map_err(|kind| ParseError::new(kind, source.clone()));
    }
    program.find_type(context, text).ok_or_else(|| {
        ParseError::new(
            ErrorKind::NameResolution { name: text.to_string(), searched: "type".into() },
            source.clone(),
        )
    })
}

/// Resolve a dotted package path against the root's children.
fn find_package(program: &Program, name: &str) -> Option<PackageId> {
    let mut current = None;
    for segment in name.split('.') {
        let parent = current.unwrap_or_else(|| program.root());
        current = Some(
            program
                .package(parent)
                .children
                .iter()
                .copied()
                .find(|&id| program.package(id).name == segment)?,
        );
    }
    current
}
