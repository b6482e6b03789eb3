//! Value expression tests: literals, operators, lists, conditionals,
//! constructor resolution, and the canonical textual form.

use strict_common::ErrorKind;
use strict_expr::method_body;
use strict_lang::{ExpressionKind, Program, TypeId};

/// Parse one type called `Sample` in a `Demo` package.
fn parse_type(source: &str) -> (Program, TypeId) {
    let mut program = Program::new();
    let root = program.root();
    let package = program.add_package("Demo", root, Default::default());
    let ty = program.parse_type(package, "Sample", source).expect("type should parse");
    (program, ty)
}

/// Parse a type whose first method body is the given lines (one tab each).
fn parse_body_source(body_lines: &[&str]) -> (Program, TypeId) {
    let mut source = String::from("has log\nRun Number\n");
    for line in body_lines {
        source.push('\t');
        source.push_str(line);
        source.push('\n');
    }
    parse_type(&source)
}

/// 1. `1 + 2 * 3` builds the precedence-correct tree and stringifies
///    canonically.
#[test]
fn precedence_shapes_the_tree() {
    let (mut program, ty) = parse_body_source(&["1 + 2 * 3"]);
    let body = method_body(&mut program, ty, 0).unwrap();
    let expression = &body.expressions[0];
    insta::assert_snapshot!(expression.to_string(), @"1 + 2 * 3");
    let ExpressionKind::Binary { operator, right, .. } = &expression.kind else {
        panic!("expected a binary expression, got {expression:?}");
    };
    assert_eq!(operator, "+");
    assert!(matches!(right.kind, ExpressionKind::Binary { .. }), "* binds tighter than +");
}

/// 2. A list literal instantiates `List` with the element type: `(1, 2, 3)`
///    has type `Numbers`.
#[test]
fn list_literal_upcasts_to_numbers() {
    let (mut program, ty) = parse_body_source(&["let xs = (1, 2, 3)", "1"]);
    let body = method_body(&mut program, ty, 0).unwrap();
    let variable = body.find_variable("xs").unwrap();
    let list_type = variable.ty;
    assert_eq!(program.ty(list_type).name, "Numbers");
}

/// 3. Mixed Number/Text elements upcast to the Text element: `Texts`.
#[test]
fn mixed_list_elements_upcast_to_text() {
    let (mut program, ty) = parse_body_source(&["let xs = (1, \"x\")", "1"]);
    let body = method_body(&mut program, ty, 0).unwrap();
    let list_type = body.find_variable("xs").unwrap().ty;
    assert_eq!(program.ty(list_type).name, "Texts");
}

/// 4. Incompatible list elements are rejected.
#[test]
fn incompatible_list_elements_rejected() {
    let (mut program, ty) = parse_body_source(&["let xs = (true, 1)", "1"]);
    let err = method_body(&mut program, ty, 0).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Type { .. }));
    assert!(err.to_string().contains("compatible type"));
}

/// 5. Conditional expressions type both branches: `true ? 1 else 2` is a
///    Number.
#[test]
fn conditional_expression_types_branches() {
    let (mut program, ty) = parse_body_source(&["let r = true ? 1 else 2", "r"]);
    let known = program.known();
    let body = method_body(&mut program, ty, 0).unwrap();
    assert_eq!(body.find_variable("r").unwrap().ty, known.number);
    insta::assert_snapshot!(body.expressions[0].to_string(), @"let r = true ? 1 else 2");
}

/// 6. Mismatched conditional branches are a type error.
#[test]
fn conditional_branch_mismatch_rejected() {
    let (mut program, ty) = parse_body_source(&["let r = true ? 1 else \"x\"", "1"]);
    let err = method_body(&mut program, ty, 0).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Type { .. }));
    assert!(err.to_string().contains("same type"));
}

/// 7. Conditional expressions cannot nest.
#[test]
fn nested_conditional_rejected() {
    let (mut program, ty) = parse_body_source(&["let r = true ? true ? 1 else 2 else 3", "1"]);
    let err = method_body(&mut program, ty, 0).unwrap_err();
    assert!(err.to_string().contains("cannot be nested"));
}

/// 8. `Character(7)` resolves to `Character.from(Number)`.
#[test]
fn constructor_resolves_from_method() {
    let (mut program, ty) = parse_type("has log\nMake Character\n\tCharacter(7)\n");
    let body = method_body(&mut program, ty, 0).unwrap();
    let expression = body.expressions[0].clone();
    let return_type = expression.return_type;
    assert!(matches!(expression.kind, ExpressionKind::From { .. }));
    assert_eq!(return_type, program.known().character);
    insta::assert_snapshot!(expression.to_string(), @"Character(7)");
}

/// 9. `Range(1, 2, 3, 4)` has no matching overload and reports the closest
///    candidate.
#[test]
fn constructor_without_matching_overload_rejected() {
    let (mut program, ty) = parse_type("has log\nMake Range\n\tRange(1, 2, 3, 4)\n");
    let err = method_body(&mut program, ty, 0).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Type { .. }));
    assert!(err.to_string().contains("from(start Number, end Number)"));
}

/// 10. Binary operators resolve on the left operand's type; incompatible
///     right operands are an argument mismatch.
#[test]
fn binary_argument_mismatch_rejected() {
    let (mut program, ty) = parse_body_source(&["1 + \"x\""]);
    let err = method_body(&mut program, ty, 0).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Type { .. }));
    assert!(err.to_string().contains("arguments do not match"));
}

/// 11. `"a" + 1` is fine: Numbers upcast to Text.
#[test]
fn number_upcasts_to_text_in_concatenation() {
    let (mut program, ty) = parse_type("has log\nJoin Text\n\t\"a\" + 1\n");
    let known = program.known();
    let body = method_body(&mut program, ty, 0).unwrap();
    assert_eq!(body.return_type, known.text);
}

/// 12. `is` lives on `Any`, `is not` falls back to `BinaryOperator`; both
///     compare anything and return Boolean.
#[test]
fn is_and_is_not_compare_anything() {
    let (mut program, ty) = parse_type("has log\nSame Boolean\n\t1 is not 2\n");
    let known = program.known();
    let body = method_body(&mut program, ty, 0).unwrap();
    assert_eq!(body.expressions[0].to_string(), "1 is not 2");
    assert_eq!(body.return_type, known.boolean);
}

/// 13. `not x` resolves to `x.not()` and only exists where `not` does.
#[test]
fn not_is_the_only_unary() {
    let (mut program, ty) = parse_type("has log\nFlip Boolean\n\tnot true\n");
    let body = method_body(&mut program, ty, 0).unwrap();
    assert!(matches!(body.expressions[0].kind, ExpressionKind::Not(_)));

    let (mut program, ty) = parse_type("has log\nFlip Boolean\n\tnot 1\n");
    let err = method_body(&mut program, ty, 0).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NameResolution { .. }));
}

/// 14. The canonical text of a parsed expression parses back to an equal
///     expression.
#[test]
fn display_round_trips() {
    let lines = ["1 + 2 * 3", "(1, 2, 3)", "not true", "\"a\" + 1", "1 is not 2"];
    let names = ["A", "B", "C", "D", "E"];
    let mut program = Program::new();
    let root = program.root();
    let package = program.add_package("RoundTrip", root, Default::default());
    for (&line, &name) in lines.iter().zip(&names) {
        let first = program
            .parse_type(
                package,
                &format!("First{name}"),
                &format!("has log\nRun Number\n\t{line}\n\t1\n"),
            )
            .unwrap();
        let original = method_body(&mut program, first, 0).unwrap().expressions[0].clone();
        let rendered = original.to_string();
        assert_eq!(rendered, line, "canonical form of `{line}` drifted");
        let second = program
            .parse_type(
                package,
                &format!("Second{name}"),
                &format!("has log\nRun Number\n\t{rendered}\n\t1\n"),
            )
            .unwrap();
        let reparsed = method_body(&mut program, second, 0).unwrap().expressions[0].clone();
        assert_eq!(reparsed, original, "round-trip changed `{line}`");
    }
}

/// 15. Zero-argument methods are called without parentheses.
#[test]
fn zero_argument_method_call() {
    let (mut program, ty) =
        parse_type("has text\nSize Number\n\ttext.length\n");
    let known = program.known();
    let body = method_body(&mut program, ty, 0).unwrap();
    assert_eq!(body.expressions[0].to_string(), "text.length");
    assert_eq!(body.return_type, known.number);
}
