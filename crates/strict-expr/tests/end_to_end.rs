//! End-to-end tests over the two public surfaces: `load_package` and lazy
//! method-body access, plus diagnostic rendering and the available-method
//! invariants.

use std::fs;

use strict_common::ErrorKind;
use strict_expr::{diagnostics, method_body};
use strict_lang::{load_package, Program};

/// 1. Load a package from disk and parse a body lazily through the public
///    surface.
#[test]
fn load_then_parse_body() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(
        tmp.path().join("Counter.strict"),
        "has number\nCountNumber Number\n\tmutable result = 1\n\tfor Range(0, number)\n\t\tresult = result + 1\n\tresult\n",
    )
    .unwrap();

    let mut program = load_package(tmp.path()).unwrap();
    let main = program.main_package().unwrap();
    let counter = program.get_type(main, "Counter").unwrap();
    assert!(program.ty(counter).methods[0].body().is_none(), "bodies parse lazily");

    let body = method_body(&mut program, counter, 0).unwrap();
    let return_type = body.return_type;
    assert_eq!(return_type, program.known().number);
}

/// 2. A body error renders as an ariadne diagnostic with a code and the
///    offending line.
#[test]
fn body_error_renders_diagnostic() {
    let tmp = tempfile::tempdir().unwrap();
    let source = "has number\nBroken Number\n\tnumber +\n";
    fs::write(tmp.path().join("Counter.strict"), source).unwrap();

    let mut program = load_package(tmp.path()).unwrap();
    let main = program.main_package().unwrap();
    let counter = program.get_type(main, "Counter").unwrap();
    let err = method_body(&mut program, counter, 0).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Syntax { .. }));
    assert_eq!(err.context.line_number, 3);

    let rendered = diagnostics::render(&err, source);
    assert!(rendered.contains("E0001"));
    assert!(rendered.contains("in method `Broken`"));
}

/// 3. Available methods include every transitively implemented trait and
///    `Any`.
#[test]
fn available_methods_are_transitive() {
    let mut program = Program::new();
    let root = program.root();
    let package = program.add_package("Demo", root, Default::default());
    program
        .parse_types(
            package,
            &[
                ("HasLength", "Length Number\n"),
                (
                    "Word",
                    "implement HasLength\nhas text\nLength Number\n\ttext.length\n",
                ),
            ],
        )
        .unwrap();
    let word = program.get_type(package, "Word").unwrap();
    let methods = program.available_methods(word);
    assert!(methods.contains_key("Length"));
    assert!(methods.contains_key("is"), "Any's methods are always available");
    assert!(methods.contains_key("to_text"));
}

/// 4. A missing trait method is a trait-contract violation.
#[test]
fn unimplemented_trait_method_rejected() {
    let mut program = Program::new();
    let root = program.root();
    let package = program.add_package("Demo", root, Default::default());
    let err = program
        .parse_types(
            package,
            &[
                ("HasLength", "Length Number\n"),
                ("Word", "implement HasLength\nhas text\nName Text\n\ttext\n"),
            ],
        )
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TraitContract { .. }));
    assert!(err.to_string().contains("`Length` of trait `HasLength`"));
}

/// 5. Generic instantiations are shared: every `(1, 2, 3)` in a program is
///    the same `Numbers`.
#[test]
fn generic_instances_are_shared() {
    let mut program = Program::new();
    let root = program.root();
    let package = program.add_package("Demo", root, Default::default());
    let first = program
        .parse_type(package, "First", "has log\nRun Numbers\n\t(1, 2, 3)\n")
        .unwrap();
    let second = program
        .parse_type(package, "Second", "has log\nRun Numbers\n\t(4, 5, 6)\n")
        .unwrap();
    let first_type = method_body(&mut program, first, 0).unwrap().return_type;
    let second_type = method_body(&mut program, second, 0).unwrap().return_type;
    assert_eq!(first_type, second_type);
    assert_eq!(program.ty(first_type).name, "Numbers");
}

/// 6. Trait methods dispatch through the implementer.
#[test]
fn trait_method_dispatch() {
    let mut program = Program::new();
    let root = program.root();
    let package = program.add_package("Demo", root, Default::default());
    program
        .parse_types(
            package,
            &[
                ("HasLength", "Length Number\n"),
                (
                    "Word",
                    "implement HasLength\nhas text\nLength Number\n\ttext.length\n",
                ),
                (
                    "Report",
                    "has word Word\nSize Number\n\tword.Length\n",
                ),
            ],
        )
        .unwrap();
    let report = program.get_type(package, "Report").unwrap();
    let known = program.known();
    let body = method_body(&mut program, report, 0).unwrap();
    assert_eq!(body.expressions[0].to_string(), "word.Length");
    assert_eq!(body.return_type, known.number);
}
