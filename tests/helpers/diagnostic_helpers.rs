//! Diagnostic assertion helpers.

use ttcn::base::{FileId, Identifier};
use ttcn::hir::{Diagnostic, Severity};
use ttcn::Project;

/// `file`'s diagnostics as `CODE: message`, in source order.
pub fn messages(project: &Project, file: FileId) -> Vec<String> {
    project
        .file_diagnostics(file)
        .iter()
        .map(|d| format!("{}: {}", d.code.as_deref().unwrap_or("-"), d.message))
        .collect()
}

pub fn errors(project: &Project, file: FileId) -> Vec<Diagnostic> {
    project
        .file_diagnostics(file)
        .into_iter()
        .filter(|d| d.severity == Severity::Error)
        .collect()
}

/// Assert that no file of the project has diagnostics.
pub fn assert_clean(project: &Project) {
    let all: Vec<String> = project
        .files()
        .flat_map(|(file, _)| messages(project, file))
        .collect();
    assert!(
        all.is_empty(),
        "Expected no diagnostics, got {}:\n  {}",
        all.len(),
        all.join("\n  ")
    );
}

pub fn names(identifiers: &[Identifier]) -> Vec<&str> {
    identifiers.iter().map(Identifier::name).collect()
}
