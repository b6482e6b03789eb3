//! Package loading: directory tree → packages, `.strict` files → types.
//!
//! Every directory becomes a child package named after the folder and
//! every `.strict` file becomes a type stub (name = file stem) that is
//! registered before any parsing, so forward references resolve regardless
//! of file order. Files are then read and declaration-parsed in parallel;
//! admission runs sequentially afterwards, the only phase that mutates
//! shared state.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use strict_common::{ErrorKind, ParseError, SourceContext};

use crate::admit;
use crate::decl::{self, TypeDeclarations};
use crate::program::{PackageId, Program, TypeId};

/// The pristine language folder is reserved and never scanned.
const RESERVED_PATH: &str = "strict-lang/Strict";

/// Load every `.strict` file under `root` into a fresh program.
pub fn load_package(root: &Path) -> Result<Program, ParseError> {
    let mut program = Program::new();
    let name = root
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("Package")
        .to_string();
    let package = program.add_package(name, program.root(), root.to_path_buf());
    program.set_main_package(package);

    let mut files = Vec::new();
    collect_files(&mut program, package, root, &mut files)?;

    // Register all stubs before parsing anything.
    let mut pending = Vec::new();
    for (package, path) in files {
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();
        if !stem.chars().next().is_some_and(|c| c.is_uppercase())
            || !stem.chars().all(|c| c.is_alphanumeric())
        {
            return Err(ParseError::new(
                ErrorKind::Syntax {
                    message: format!("type file name `{stem}` must be an uppercase type name"),
                },
                SourceContext::new(stem.as_str(), 1, ""),
            ));
        }
        let id = program.add_type(package, &stem)?;
        pending.push((id, stem, path));
    }

    // One task per file: read and declaration-parse, nothing shared.
    let parsed: Result<Vec<(TypeId, TypeDeclarations)>, ParseError> = pending
        .par_iter()
        .map(|(id, name, path)| {
            let source = fs::read_to_string(path).map_err(|error| {
                ParseError::new(
                    ErrorKind::Syntax {
                        message: format!("cannot read `{}`: {error}", path.display()),
                    },
                    SourceContext::new(name.as_str(), 1, ""),
                )
            })?;
            let lines: Vec<&str> = source.lines().collect();
            let decls = decl::parse_declarations(name, &lines)?;
            Ok((*id, decls))
        })
        .collect();

    // Exclusive inserts: admission resolves names and mutates the arena.
    let parsed = parsed?;
    for (id, decls) in &parsed {
        admit::admit(&mut program, *id, decls)?;
    }
    // Contract checks only once every type is resolved, so an implementer
    // never races its trait.
    for (id, decls) in &parsed {
        admit::check_contracts(&program, *id, decls)?;
    }
    Ok(program)
}

/// Recursively collect `.strict` files, creating a child package per
/// directory. Hidden entries and the reserved language folder are skipped;
/// entries are visited in name order for determinism.
fn collect_files(
    program: &mut Program,
    package: PackageId,
    directory: &Path,
    files: &mut Vec<(PackageId, PathBuf)>,
) -> Result<(), ParseError> {
    let read_error = |error: std::io::Error| {
        ParseError::new(
            ErrorKind::Syntax {
                message: format!("cannot read directory `{}`: {error}", directory.display()),
            },
            SourceContext::new(directory.display().to_string(), 1, ""),
        )
    };
    let mut entries: Vec<PathBuf> = fs::read_dir(directory)
        .map_err(read_error)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .collect();
    entries.sort();

    for path in entries {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        if name.starts_with('.') {
            continue;
        }
        if path.is_dir() {
            if path.ends_with(RESERVED_PATH) {
                continue;
            }
            let child = program.add_package(name, package, path.clone());
            collect_files(program, child, &path, files)?;
        } else if path.extension().and_then(|extension| extension.to_str()) == Some("strict") {
            files.push((package, path));
        }
    }
    Ok(())
}

impl Program {
    /// Parse one type from source text into a package. Test- and
    /// tool-facing entry point; files go through [`load_package`].
    pub fn parse_type(
        &mut self,
        package: PackageId,
        name: &str,
        source: &str,
    ) -> Result<TypeId, ParseError> {
        let id = self.add_type(package, name)?;
        let lines: Vec<&str> = source.lines().collect();
        let decls = decl::parse_declarations(name, &lines)?;
        admit::admit(self, id, &decls)?;
        admit::check_contracts(self, id, &decls)?;
        Ok(id)
    }

    /// Parse several types at once, registering all stubs first so they can
    /// reference each other in any order.
    pub fn parse_types(
        &mut self,
        package: PackageId,
        sources: &[(&str, &str)],
    ) -> Result<Vec<TypeId>, ParseError> {
        let mut ids = Vec::new();
        for (name, _) in sources {
            ids.push(self.add_type(package, name)?);
        }
        let mut parsed = Vec::new();
        for (&id, (name, source)) in ids.iter().zip(sources) {
            let lines: Vec<&str> = source.lines().collect();
            let decls = decl::parse_declarations(name, &lines)?;
            admit::admit(self, id, &decls)?;
            parsed.push((id, decls));
        }
        for (id, decls) in &parsed {
            admit::check_contracts(self, *id, decls)?;
        }
        Ok(ids)
    }
}
