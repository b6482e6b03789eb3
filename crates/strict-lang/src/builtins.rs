//! Built-in type registration for the `Base` package.
//!
//! Registers the value types (Number, Text, Boolean, Character), the
//! universal `Any` and the `None` return type, the generic templates
//! `List` and `Mutable`, the iterable `Range`, `Log`, and the
//! `BinaryOperator` fallback that hosts operators not found on the left
//! operand's type. Built-in methods carry no body lines and are exempt
//! from the trait/body contract.

use crate::member::Member;
use crate::method::{Method, Parameter};
use crate::program::{KnownTypes, PackageId, Program, TypeId};
use crate::ty::GenericKind;

/// Register all built-in types into `Base` and return their ids.
pub(crate) fn register(program: &mut Program) -> KnownTypes {
    let base = program.base();

    // ── Type stubs first, so method signatures can reference each other ──

    let any = builtin(program, base, "Any", GenericKind::None);
    let none = builtin(program, base, "None", GenericKind::None);
    let number = builtin(program, base, "Number", GenericKind::None);
    let text = builtin(program, base, "Text", GenericKind::None);
    let boolean = builtin(program, base, "Boolean", GenericKind::None);
    let character = builtin(program, base, "Character", GenericKind::None);
    let log = builtin(program, base, "Log", GenericKind::None);
    let range = builtin(program, base, "Range", GenericKind::None);
    let list = builtin(program, base, "List", GenericKind::Template);
    let mutable = builtin(program, base, "Mutable", GenericKind::Template);
    let binary_operator = builtin(program, base, "BinaryOperator", GenericKind::None);
    let generic = builtin(program, base, "Generic", GenericKind::None);

    // ── Any: methods every type can call ─────────────────────────────────

    program.ty_mut(any).methods = vec![
        method("is", vec![parameter("other", any)], boolean),
        method("to_text", Vec::new(), text),
    ];

    // ── Number: arithmetic and comparison operators ──────────────────────

    program.ty_mut(number).methods = vec![
        method("+", vec![parameter("other", number)], number),
        method("-", vec![parameter("other", number)], number),
        method("*", vec![parameter("other", number)], number),
        method("/", vec![parameter("other", number)], number),
        method("%", vec![parameter("other", number)], number),
        method("<", vec![parameter("other", number)], boolean),
        method(">", vec![parameter("other", number)], boolean),
        method("<=", vec![parameter("other", number)], boolean),
        method(">=", vec![parameter("other", number)], boolean),
    ];

    // ── Text ─────────────────────────────────────────────────────────────

    program.ty_mut(text).methods = vec![
        method("+", vec![parameter("other", text)], text),
        method("length", Vec::new(), number),
    ];

    // ── Boolean ──────────────────────────────────────────────────────────

    program.ty_mut(boolean).methods = vec![
        method("and", vec![parameter("other", boolean)], boolean),
        method("or", vec![parameter("other", boolean)], boolean),
        method("not", Vec::new(), boolean),
    ];

    // ── Character ────────────────────────────────────────────────────────

    program.ty_mut(character).methods =
        vec![method("from", vec![parameter("code", number)], character)];

    // ── Log ──────────────────────────────────────────────────────────────

    program.ty_mut(log).methods = vec![method("write", vec![parameter("text", text)], none)];

    // ── Range: iterates Numbers ──────────────────────────────────────────

    program.ty_mut(range).members = vec![
        Member::new("start", Some(number), 0),
        Member::new("end", Some(number), 0),
    ];
    program.ty_mut(range).methods = vec![
        method(
            "from",
            vec![parameter("start", number), parameter("end", number)],
            range,
        ),
        method("length", Vec::new(), number),
    ];

    // ── List template: Generic is substituted on instantiation ───────────

    program.ty_mut(list).methods = vec![
        method("+", vec![parameter("other", generic)], list),
        method("length", Vec::new(), number),
        method("contains", vec![parameter("other", generic)], boolean),
    ];

    // ── Mutable template ─────────────────────────────────────────────────

    program.ty_mut(mutable).methods =
        vec![method("from", vec![parameter("value", generic)], mutable)];

    // ── BinaryOperator: fallback home for operators ──────────────────────

    program.ty_mut(binary_operator).methods = vec![
        method("is", vec![parameter("other", any)], boolean),
        method("is not", vec![parameter("other", any)], boolean),
    ];

    KnownTypes {
        any,
        none,
        number,
        text,
        boolean,
        character,
        log,
        range,
        list,
        mutable,
        binary_operator,
        generic,
    }
}

fn builtin(
    program: &mut Program,
    base: PackageId,
    name: &str,
    generic: GenericKind,
) -> TypeId {
    let id = program.insert_type(base, name);
    let ty = program.ty_mut(id);
    ty.is_builtin = true;
    ty.generic = generic;
    id
}

fn method(name: &str, parameters: Vec<Parameter>, return_type: TypeId) -> Method {
    Method::new(name, parameters, return_type, 0)
}

fn parameter(name: &str, ty: TypeId) -> Parameter {
    Parameter::new(name, ty)
}
