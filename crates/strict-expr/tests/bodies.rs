//! Body parsing tests: scopes, `if`/`else`, `for`, return-type
//! propagation, and variable lookup.

use strict_common::ErrorKind;
use strict_expr::method_body;
use strict_lang::{ExpressionKind, Program, TypeId};

fn parse_type(source: &str) -> (Program, TypeId) {
    let mut program = Program::new();
    let root = program.root();
    let package = program.add_package("Demo", root, Default::default());
    let ty = program.parse_type(package, "Sample", source).expect("type should parse");
    (program, ty)
}

/// 1. The arithmetic loop end-to-end: mutable accumulator, `for` over a
///    `Range`, reassignment in the loop body, trailing result.
#[test]
fn arithmetic_loop() {
    let (mut program, ty) = parse_type(
        "has number\nCountNumber Number\n\tmutable result = 1\n\tfor Range(0, number)\n\t\tresult = result + 1\n\tresult\n",
    );
    let body = method_body(&mut program, ty, 0).unwrap();
    let return_type = body.return_type;
    let second = body.expressions[1].clone();
    assert_eq!(return_type, program.known().number);
    let ExpressionKind::For { value, variable, body: loop_body } = second.kind else {
        panic!("expected the second expression to be a `for`");
    };
    assert_eq!(value.to_string(), "Range(0, number)");
    assert_eq!(variable, None);
    assert!(matches!(loop_body.expressions[0].kind, ExpressionKind::Reassignment { .. }));
}

/// 2. `if` takes a Boolean condition and an indented body; `else` attaches
///    at the same depth.
#[test]
fn if_else_bodies() {
    let (mut program, ty) = parse_type(
        "has log\nPick Number\n\tif 1 < 2\n\t\t1\n\telse\n\t\t2\n\t3\n",
    );
    let body = method_body(&mut program, ty, 0).unwrap();
    let ExpressionKind::If { condition, then, otherwise } = &body.expressions[0].kind else {
        panic!("expected an `if`");
    };
    assert_eq!(condition.to_string(), "1 < 2");
    assert_eq!(then.tabs, 2);
    assert!(otherwise.is_some());
}

/// 3. A non-Boolean `if` condition is a type error.
#[test]
fn non_boolean_condition_rejected() {
    let (mut program, ty) = parse_type("has log\nPick Number\n\tif 1\n\t\t1\n\t2\n");
    let err = method_body(&mut program, ty, 0).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Type { .. }));
    assert!(err.to_string().contains("Boolean"));
}

/// 4. `else` without a preceding `if` is rejected.
#[test]
fn else_without_if_rejected() {
    let (mut program, ty) = parse_type("has log\nPick Number\n\telse\n\t1\n");
    let err = method_body(&mut program, ty, 0).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Syntax { .. }));
    assert!(err.to_string().contains("without a preceding `if`"));
}

/// 5. A `return` inside a child body must match the method's return type.
#[test]
fn child_return_propagates_upward() {
    let (mut program, ty) =
        parse_type("has log\nPick Number\n\tif 1 < 2\n\t\treturn 5\n\t1\n");
    let known = program.known();
    let body = method_body(&mut program, ty, 0).unwrap();
    assert_eq!(body.return_type, known.number);

    let (mut program, ty) =
        parse_type("has log\nPick Boolean\n\tif 1 < 2\n\t\treturn 5\n\ttrue\n");
    let err = method_body(&mut program, ty, 0).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Type { .. }));
    assert!(err.to_string().contains("not assignable"));
}

/// 6. The body's value must be assignable to the declared return type.
#[test]
fn body_return_type_checked() {
    let (mut program, ty) = parse_type("has log\nPick Boolean\n\t1\n");
    let err = method_body(&mut program, ty, 0).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Type { .. }));
    assert!(err.to_string().contains("must return"));
}

/// 7. Inner bodies may shadow outer variables; the nearest binding wins.
#[test]
fn nearest_binding_wins() {
    let (mut program, ty) = parse_type(
        "has log\nPick Number\n\tlet x = 1\n\tif 1 < 2\n\t\tlet x = \"inner\"\n\tx\n",
    );
    let body = method_body(&mut program, ty, 0).unwrap();
    let outer = body.find_variable("x").unwrap().ty;
    let ExpressionKind::If { then, .. } = &body.expressions[1].kind else {
        panic!("expected an `if`");
    };
    let inner = then.find_variable("x").unwrap().ty;
    assert_eq!(outer, program.known().number);
    assert_eq!(inner, program.known().text);
}

/// 8. A duplicate variable in the same body is rejected.
#[test]
fn duplicate_variable_rejected() {
    let (mut program, ty) = parse_type("has log\nPick Number\n\tlet x = 1\n\tlet x = 2\n\tx\n");
    let err = method_body(&mut program, ty, 0).unwrap_err();
    assert!(err.to_string().contains("already defined"));
}

/// 9. Explicit loop variables allow nesting; implicit `index` may not be
///    shadowed.
#[test]
fn nested_for_needs_explicit_variables() {
    let (mut program, ty) = parse_type(
        "has log\nPick Number\n\tfor Range(0, 3)\n\t\tfor y in Range(0, 2)\n\t\t\ty\n\t1\n",
    );
    assert!(method_body(&mut program, ty, 0).is_ok());

    let (mut program, ty) = parse_type(
        "has log\nPick Number\n\tfor Range(0, 3)\n\t\tfor Range(0, 2)\n\t\t\t1\n\t1\n",
    );
    let err = method_body(&mut program, ty, 0).unwrap_err();
    assert!(err.to_string().contains("`index` cannot be shadowed"));
}

/// 10. The implicit `value` carries the element type of the iterable.
#[test]
fn implicit_value_has_element_type() {
    let (mut program, ty) = parse_type(
        "has log\nTotal Number\n\tmutable sum = 0\n\tfor Range(0, 3)\n\t\tsum = sum + value\n\tsum\n",
    );
    let known = program.known();
    let body = method_body(&mut program, ty, 0).unwrap();
    assert_eq!(body.return_type, known.number);
}

/// 11. Iterating something without an element type is rejected.
#[test]
fn non_iterable_rejected() {
    let (mut program, ty) = parse_type("has log\nPick Number\n\tfor 5\n\t\t1\n\t1\n");
    let err = method_body(&mut program, ty, 0).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Type { .. }));
    assert!(err.to_string().contains("not iterable"));
}

/// 12. List instances iterate their element type.
#[test]
fn list_iteration_yields_elements() {
    let (mut program, ty) = parse_type(
        "has log\nTotal Number\n\tmutable sum = 0\n\tfor x in (1, 2, 3)\n\t\tsum = sum + x\n\tsum\n",
    );
    let known = program.known();
    let body = method_body(&mut program, ty, 0).unwrap();
    assert_eq!(body.return_type, known.number);
}

/// 13. An `if` without an indented body is rejected.
#[test]
fn if_without_body_rejected() {
    let (mut program, ty) = parse_type("has log\nPick Number\n\tif 1 < 2\n\t1\n");
    let err = method_body(&mut program, ty, 0).unwrap_err();
    assert!(err.to_string().contains("needs an indented body"));
}

/// 14. Bodies are parsed once and cached on the method.
#[test]
fn bodies_are_cached() {
    let (mut program, ty) = parse_type("has log\nPick Number\n\t1\n");
    let first = method_body(&mut program, ty, 0).unwrap().clone();
    let second = method_body(&mut program, ty, 0).unwrap().clone();
    assert_eq!(first, second);
    assert!(program.ty(ty).methods[0].body().is_some());
}
