//! Integration tests for package loading: directory walking, stub
//! registration, forward references, and cross-file trait contracts.

use std::fs;
use std::path::Path;

use strict_common::ErrorKind;
use strict_lang::{load_package, Context};

/// Write a `.strict` file under the given root.
fn write_type(root: &Path, relative: &str, source: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, source).unwrap();
}

#[test]
fn load_single_type() {
    let tmp = tempfile::tempdir().unwrap();
    write_type(tmp.path(), "Counter.strict", "has number\nIncrement Number\n\tnumber + 1\n");

    let program = load_package(tmp.path()).unwrap();
    let main = program.main_package().unwrap();
    let counter = program.get_type(main, "Counter").unwrap();
    assert_eq!(program.ty(counter).name, "Counter");
    assert_eq!(program.ty(counter).members.len(), 1);
    assert_eq!(program.ty(counter).members[0].ty, Some(program.known().number));
    assert_eq!(program.ty(counter).methods.len(), 1);
}

#[test]
fn forward_references_resolve_across_files() {
    let tmp = tempfile::tempdir().unwrap();
    // `Account` references `Balance`, which sorts after it alphabetically;
    // stub registration makes the order irrelevant.
    write_type(
        tmp.path(),
        "Account.strict",
        "has balance Balance\nTotal Number\n\tbalance.number\n",
    );
    write_type(tmp.path(), "Balance.strict", "has number\nDouble Number\n\tnumber + number\n");

    let program = load_package(tmp.path()).unwrap();
    let main = program.main_package().unwrap();
    let account = program.get_type(main, "Account").unwrap();
    let balance = program.get_type(main, "Balance").unwrap();
    assert_eq!(program.ty(account).members[0].ty, Some(balance));
}

#[test]
fn directories_become_child_packages() {
    let tmp = tempfile::tempdir().unwrap();
    write_type(
        tmp.path(),
        "geometry/Point.strict",
        "has number\nLength Number\n\tnumber\n",
    );

    let program = load_package(tmp.path()).unwrap();
    let main = program.main_package().unwrap();
    assert!(program.get_type(main, "Point").is_none(), "Point lives in the child package");
    let geometry = program
        .package(main)
        .children
        .iter()
        .copied()
        .find(|&id| program.package(id).name == "geometry")
        .unwrap();
    let point = program.get_type(geometry, "Point").unwrap();
    // The child package bubbles to its parent and Base during resolution.
    let mut program = program;
    assert_eq!(
        program.find_type(Context::Type(point), "Number"),
        Some(program.known().number)
    );
}

#[test]
fn hidden_directories_and_foreign_files_are_ignored() {
    let tmp = tempfile::tempdir().unwrap();
    write_type(tmp.path(), "Counter.strict", "has number\nIncrement Number\n\tnumber + 1\n");
    write_type(tmp.path(), ".hidden/Secret.strict", "has number\nRun Number\n\tnumber\n");
    fs::write(tmp.path().join("README.md"), "not strict").unwrap();

    let program = load_package(tmp.path()).unwrap();
    let main = program.main_package().unwrap();
    assert_eq!(program.package(main).type_count(), 1);
}

#[test]
fn reserved_language_folder_is_not_scanned() {
    let tmp = tempfile::tempdir().unwrap();
    write_type(tmp.path(), "Counter.strict", "has number\nIncrement Number\n\tnumber + 1\n");
    write_type(
        tmp.path(),
        "strict-lang/Strict/Number.strict",
        "has number\nRun Number\n\tnumber\n",
    );

    let program = load_package(tmp.path()).unwrap();
    let reserved = program
        .package(program.main_package().unwrap())
        .children
        .iter()
        .copied()
        .find(|&id| program.package(id).name == "strict-lang")
        .unwrap();
    assert_eq!(program.package(reserved).type_count(), 0);
    assert!(program.package(reserved).children.is_empty());
}

#[test]
fn trait_must_be_implemented_across_files() {
    let tmp = tempfile::tempdir().unwrap();
    write_type(tmp.path(), "HasLength.strict", "Length Number\n");
    write_type(tmp.path(), "Word.strict", "implement HasLength\nhas text\nName Text\n\ttext\n");

    let err = load_package(tmp.path()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TraitContract { .. }));
    assert!(err.to_string().contains("`Length`"));
}

#[test]
fn implemented_trait_loads() {
    let tmp = tempfile::tempdir().unwrap();
    write_type(tmp.path(), "HasLength.strict", "Length Number\n");
    write_type(
        tmp.path(),
        "Word.strict",
        "implement HasLength\nhas text\nLength Number\n\ttext.length\n",
    );

    let program = load_package(tmp.path()).unwrap();
    let main = program.main_package().unwrap();
    let word = program.get_type(main, "Word").unwrap();
    let has_length = program.get_type(main, "HasLength").unwrap();
    assert!(program.ty(has_length).is_trait());
    assert_eq!(program.ty(word).implements, vec![has_length]);
}

#[test]
fn lowercase_file_name_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    write_type(tmp.path(), "counter.strict", "has number\nIncrement Number\n\tnumber + 1\n");

    let err = load_package(tmp.path()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Syntax { .. }));
    assert!(err.to_string().contains("uppercase"));
}

#[test]
fn import_of_unknown_package_fails() {
    let tmp = tempfile::tempdir().unwrap();
    write_type(
        tmp.path(),
        "Counter.strict",
        "import Missing\nhas number\nIncrement Number\n\tnumber + 1\n",
    );

    let err = load_package(tmp.path()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NameResolution { .. }));
    assert!(err.to_string().contains("package `Missing` not found"));
}
