//! Loading module files from a directory tree.

use std::fs;
use std::path::Path;

use rstest::rstest;
use tempfile::TempDir;
use ttcn::{Project, ProjectLoader};

use crate::helpers::diagnostic_helpers::{assert_clean, names};

fn write(root: &Path, name: &str, text: &str) {
    let path = root.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

#[rstest]
#[case::ttcn("lib.ttcn", true)]
#[case::ttcn3("lib.ttcn3", true)]
#[case::text("lib.txt", false)]
#[case::no_extension("lib", false)]
#[case::upper_case("lib.TTCN", false)]
fn test_recognized_extensions(#[case] name: &str, #[case] loaded: bool) {
    let dir = TempDir::new().unwrap();
    write(dir.path(), name, "module Lib {\n}");
    let mut project = Project::new();
    let files = ProjectLoader::new().load_directory(&mut project, dir.path()).unwrap();
    assert_eq!(files.len(), usize::from(loaded));
    assert_eq!(project.module_by_name("Lib").is_some(), loaded);
}

#[test]
fn test_loaded_tree_analyses_cleanly() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "common/types.ttcn", "module Types {\n type integer Num;\n}");
    write(dir.path(), "common/values.ttcn3", "module Values {\n import from Types all;\n const Num c_one := 1;\n}");
    write(dir.path(), "suite/main.ttcn", "module Main {\n import from Values all;\n const integer c_two := c_one;\n}");

    let mut project = Project::new();
    let files = ProjectLoader::new().load_directory(&mut project, dir.path()).unwrap();
    assert_eq!(files.len(), 3);

    let report = project.analyze();
    assert_eq!(names(&report.checked), vec!["Types", "Values", "Main"]);
    assert_clean(&project);
}

#[test]
fn test_file_with_syntax_errors_is_still_tracked() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "broken.ttcn", "module Broken {\n const integer := ;\n}");
    let mut project = Project::new();
    let files = ProjectLoader::new().load_directory(&mut project, dir.path()).unwrap();
    assert_eq!(files.len(), 1);
    assert!(project.file(files[0]).unwrap().syntax_errors > 0);
    assert!(project.diagnostics().has_errors());
}
