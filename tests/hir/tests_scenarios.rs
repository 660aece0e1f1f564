//! End-to-end behaviour of the semantic model through a [`Project`].

use ttcn::hir::{KindTag, Pairing, Resolver, codes};

use crate::helpers::diagnostic_helpers::{assert_clean, messages, names};
use crate::helpers::project_helpers::{analysed, assignment, definition, edit_after, module};

// ============================================================================
// DUPLICATE DEFINITIONS
// ============================================================================

#[test]
fn test_duplicate_pair_keeps_both_and_resolves_to_first() {
    let source = "module M {\n const integer Foo := 1;\n const integer Foo := 2;\n const integer c_x := Foo;\n}";
    let (project, files) = analysed(&[source]);

    let diagnostics = project.file_diagnostics(files[0]);
    assert_eq!(diagnostics.len(), 2, "{:?}", messages(&project, files[0]));
    assert_eq!(diagnostics[0].pairing, Some(Pairing::First));
    assert_eq!(diagnostics[1].pairing, Some(Pairing::Repeated));
    assert!(diagnostics.iter().all(|d| d.code.as_deref() == Some(codes::DUPLICATE_DEFINITION)));
    assert_eq!(diagnostics[0].related[0].location, diagnostics[1].location);

    let data = module(&project, files[0]);
    assert_eq!(data.definitions().len(), 3);
    let first = data.definitions()[0];
    let id = project.module_of(files[0]).unwrap();
    let found = Resolver::new(project.db(), id)
        .resolve_name("Foo", source.len().try_into().unwrap(), data.root)
        .found()
        .unwrap();
    assert_eq!(found.id, first);
}

#[test]
fn test_duplicate_pair_is_reported_once_per_pass() {
    let (mut project, files) = analysed(&["module M {\n const integer Foo := 1;\n const integer Foo := 2;\n}"]);
    let before = messages(&project, files[0]);

    let edit = edit_after(&project, files[0], "Foo := ", "2", "3");
    project.apply_edit(files[0], &edit).unwrap();
    project.analyze();
    assert_eq!(messages(&project, files[0]), before);
}

// ============================================================================
// UNRESOLVED REFERENCES
// ============================================================================

#[test]
fn test_unresolved_reference_is_recorded_on_its_definition() {
    let (project, files) = analysed(&["module M {\n const integer X := Y;\n const integer Z := 1;\n}"]);

    assert_eq!(messages(&project, files[0]), vec!["E0001: undefined reference `Y`"]);
    let diagnostic = &project.file_diagnostics(files[0])[0];
    assert!(assignment(&project, files[0], "X").location.contains(diagnostic.location.start()));

    // The sibling was still checked by the same pass.
    let z = assignment(&project, files[0], "Z");
    assert_eq!(z.memo.last_checked(), Some(project.timestamp()));
}

#[test]
fn test_unresolved_target_does_not_cascade() {
    let (project, files) = analysed(&[
        "module M {\n type Missing T;\n const T c_a := 1;\n const integer c_b := c_a;\n}",
    ]);
    assert_eq!(messages(&project, files[0]), vec!["E0001: undefined reference `Missing`"]);
}

// ============================================================================
// DEFERRED CLASSIFICATION
// ============================================================================

#[test]
fn test_alias_follows_its_target_across_an_edit() {
    let (mut project, files) = analysed(&[
        "module Lib {\n const integer Q := 1;\n}",
        "module App {\n import from Lib all;\n W ::= Q\n}",
    ]);
    let w = definition(&project, files[1], "W");
    assert_eq!(assignment(&project, files[1], "W").tag(), KindTag::Value);
    let first: *const _ = project
        .db()
        .assignment(w)
        .unwrap()
        .as_ambiguous()
        .unwrap()
        .resolved
        .as_deref()
        .unwrap();

    let edit = edit_after(&project, files[0], "{", "const integer Q := 1;", "Q ::= CLASS { }");
    project.apply_edit(files[0], &edit).unwrap();
    let report = project.analyze();
    assert_eq!(names(&report.checked), vec!["Lib", "App"]);

    // Same node, new sub-assignment.
    assert_eq!(definition(&project, files[1], "W"), w);
    let ambiguous = project.db().assignment(w).unwrap().as_ambiguous().unwrap();
    let resolved = ambiguous.resolved.as_deref().unwrap();
    assert_eq!(resolved.tag(), KindTag::ObjectClass);
    assert!(!std::ptr::eq(first, resolved));
    assert_eq!(ambiguous.classified_at, Some(report.timestamp));
    assert_clean(&project);
}

#[test]
fn test_alias_outcome_is_reused_when_unaffected() {
    let (mut project, files) = analysed(&[
        "module Lib {\n const integer Q := 1;\n}",
        "module App {\n import from Lib all;\n W ::= Q\n}",
        "module Other {\n const integer c_o := 1;\n}",
    ]);
    let w = definition(&project, files[1], "W");
    let stamp = project
        .db()
        .assignment(w)
        .unwrap()
        .as_ambiguous()
        .unwrap()
        .classified_at;

    let edit = edit_after(&project, files[2], "c_o := ", "1", "2");
    project.apply_edit(files[2], &edit).unwrap();
    let report = project.analyze();
    assert_eq!(names(&report.checked), vec!["Other"]);
    let ambiguous = project.db().assignment(w).unwrap().as_ambiguous().unwrap();
    assert_eq!(ambiguous.classified_at, stamp);
}

#[test]
fn test_circular_aliases_are_erroneous_not_fatal() {
    let (project, files) = analysed(&["module M {\n A ::= B\n B ::= A\n const integer c_ok := 1;\n}"]);
    let errors = messages(&project, files[0]);
    assert!(errors.iter().all(|m| m.starts_with("E0007")), "{errors:?}");
    assert!(!errors.is_empty());
    let ok = assignment(&project, files[0], "c_ok");
    assert_eq!(ok.memo.last_checked(), Some(project.timestamp()));
}
