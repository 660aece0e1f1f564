//! Edits applied to a project and the model they leave behind.

use ttcn::ReparseOutcome;
use ttcn::hir::codes;

use crate::helpers::diagnostic_helpers::{assert_clean, messages, names};
use crate::helpers::project_helpers::{analysed, assignment, definition, edit_after, module};

const THREE: &str = "module M {\n const integer c_a := 1;\n const integer c_b := 2;\n const integer c_c := 3;\n}";

#[test]
fn test_edit_inside_definition_reparses_it_alone() {
    let (mut project, files) = analysed(&[THREE]);
    let stamp = project.timestamp();
    let a = definition(&project, files[0], "c_a");
    let c = definition(&project, files[0], "c_c");
    let a_location = assignment(&project, files[0], "c_a").location;
    let c_location = assignment(&project, files[0], "c_c").location;
    let b = definition(&project, files[0], "c_b");

    let edit = edit_after(&project, files[0], "c_b := ", "2", "5");
    let outcome = project.apply_edit(files[0], &edit).unwrap();
    assert!(matches!(outcome, ReparseOutcome::Reparsed { removed: 1, inserted: 1, .. }));

    // Siblings are untouched: same node, same place, same memo.
    assert_eq!(definition(&project, files[0], "c_a"), a);
    assert_eq!(definition(&project, files[0], "c_c"), c);
    assert_eq!(assignment(&project, files[0], "c_a").location, a_location);
    assert_eq!(assignment(&project, files[0], "c_c").location, c_location);
    assert_eq!(assignment(&project, files[0], "c_a").memo.last_checked(), Some(stamp));
    assert_eq!(assignment(&project, files[0], "c_c").memo.last_checked(), Some(stamp));

    // The edited one is new and not yet checked.
    assert_ne!(definition(&project, files[0], "c_b"), b);
    assert_eq!(assignment(&project, files[0], "c_b").memo.last_checked(), None);
    assert_eq!(module(&project, files[0]).definitions().len(), 3);
}

#[test]
fn test_edit_across_boundary_replaces_the_pair() {
    let (mut project, files) = analysed(&[THREE]);
    let stamp = project.timestamp();
    let c = definition(&project, files[0], "c_c");
    let c_location = assignment(&project, files[0], "c_c").location;

    let edit = edit_after(
        &project,
        files[0],
        "c_a := ",
        "1;\n const integer c_b := 2",
        "10;\n const integer c_b := 20",
    );
    let outcome = project.apply_edit(files[0], &edit).unwrap();
    assert!(matches!(outcome, ReparseOutcome::Reparsed { removed: 2, inserted: 2, .. }));

    // The adjacent definition is only moved.
    assert_eq!(definition(&project, files[0], "c_c"), c);
    assert_eq!(assignment(&project, files[0], "c_c").location, c_location.shifted(2));
    assert_eq!(assignment(&project, files[0], "c_c").memo.last_checked(), Some(stamp));
    assert_eq!(assignment(&project, files[0], "c_a").memo.last_checked(), None);
    assert_eq!(assignment(&project, files[0], "c_b").memo.last_checked(), None);

    let text = &project.file(files[0]).unwrap().text;
    let c_text = &text[assignment(&project, files[0], "c_c").location.range];
    assert_eq!(c_text, "const integer c_c := 3;");
}

#[test]
fn test_edit_in_group_keeps_group_members() {
    let source = "module M {\n group G {\n  const integer c_a := 1;\n  const integer c_b := 2;\n }\n const integer c_c := c_b;\n}";
    let (mut project, files) = analysed(&[source]);
    let a = definition(&project, files[0], "c_a");

    let edit = edit_after(&project, files[0], "c_b := ", "2", "22");
    project.apply_edit(files[0], &edit).unwrap();
    assert_eq!(definition(&project, files[0], "c_a"), a);
    let groups = module(&project, files[0]).groups();
    let group = groups[0];
    assert!(group.location.contains(assignment(&project, files[0], "c_b").location.start()));

    project.analyze();
    assert_clean(&project);
}

#[test]
fn test_new_duplicate_from_edit_is_reported_after_the_pass() {
    let (mut project, files) = analysed(&[THREE]);
    let edit = edit_after(&project, files[0], "c_a := 1;\n const integer ", "c_b", "c_a");
    project.apply_edit(files[0], &edit).unwrap();
    assert_clean(&project);

    project.analyze();
    let found = project.file_diagnostics(files[0]);
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|d| d.code.as_deref() == Some(codes::DUPLICATE_DEFINITION)));
}

#[test]
fn test_unbalanced_edit_falls_back_to_full_parse() {
    let (mut project, files) = analysed(&[THREE]);
    let first = project.module_of(files[0]).unwrap();

    let edit = edit_after(&project, files[0], "c_b := ", "2", "(2");
    assert_eq!(project.apply_edit(files[0], &edit).unwrap(), ReparseOutcome::Full);
    assert_ne!(project.module_of(files[0]), Some(first));
    assert!(messages(&project, files[0]).iter().all(|m| m.starts_with("E0018")));

    let edit = edit_after(&project, files[0], "c_b := ", "(2", "2");
    assert_eq!(project.apply_edit(files[0], &edit).unwrap(), ReparseOutcome::Full);
    let report = project.analyze();
    assert_eq!(names(&report.checked), vec!["M"]);
    assert_clean(&project);
}

#[test]
fn test_whitespace_edit_keeps_everything() {
    let (mut project, files) = analysed(&[THREE]);
    let stamp = project.timestamp();
    let edit = edit_after(&project, files[0], "c_a := 1;", "\n", "\n\n\n");
    assert_eq!(project.apply_edit(files[0], &edit).unwrap(), ReparseOutcome::Shifted);
    assert!(!project.has_pending_changes());
    assert_eq!(assignment(&project, files[0], "c_b").memo.last_checked(), Some(stamp));
    let report = project.analyze();
    assert!(report.checked.is_empty());
}
