//! Project setup helpers.

use ttcn::base::{FileId, TextRange, TextSize};
use ttcn::hir::{Assignment, AssignmentRef, ModuleData};
use ttcn::{Project, TextEdit};

/// A project holding `sources`, one file each, not yet analysed.
pub fn project_from(sources: &[&str]) -> (Project, Vec<FileId>) {
    let mut project = Project::new();
    let files = sources
        .iter()
        .map(|source| {
            let file = project.add_file(*source);
            assert_eq!(
                project.file(file).unwrap().syntax_errors,
                0,
                "syntax errors in {source:?}: {:?}",
                project.file_diagnostics(file)
            );
            file
        })
        .collect();
    (project, files)
}

/// A project holding `sources` after its first pass.
pub fn analysed(sources: &[&str]) -> (Project, Vec<FileId>) {
    let (mut project, files) = project_from(sources);
    project.analyze();
    (project, files)
}

pub fn module<'a>(project: &'a Project, file: FileId) -> &'a ModuleData {
    let id = project.module_of(file).expect("file holds a module");
    project.db().module(id).unwrap()
}

/// The module-level definition of `file` named `name`.
pub fn definition(project: &Project, file: FileId, name: &str) -> AssignmentRef {
    let id = project.module_of(file).unwrap();
    let data = module(project, file);
    let found = data
        .definitions()
        .iter()
        .copied()
        .find(|d| data.assignment(*d).unwrap().name() == name)
        .unwrap_or_else(|| panic!("no definition `{name}` in {}", data.identifier));
    AssignmentRef::new(id, found)
}

pub fn assignment<'a>(project: &'a Project, file: FileId, name: &str) -> &'a Assignment {
    project.db().assignment(definition(project, file, name)).unwrap()
}

/// Replace the first `old` found after `anchor` in `file` by `new`.
pub fn edit_after(project: &Project, file: FileId, anchor: &str, old: &str, new: &str) -> TextEdit {
    let text = &project.file(file).unwrap().text;
    let from = text.find(anchor).unwrap_or_else(|| panic!("no `{anchor}`")) + anchor.len();
    let start = from + text[from..].find(old).unwrap_or_else(|| panic!("no `{old}` after `{anchor}`"));
    TextEdit::new(TextRange::at(TextSize::new(start as u32), TextSize::of(old)), new)
}
