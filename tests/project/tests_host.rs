//! Snapshots published by the analysis host.

use std::sync::Arc;

use ttcn::hir::KindTag;
use ttcn::{AnalysisConfig, AnalysisHost, TextEdit, TextRange, TextSize};

fn offset_of(text: &str, needle: &str) -> TextSize {
    TextSize::new(text.find(needle).unwrap() as u32)
}

#[test]
fn test_declaration_kind_follows_classification() {
    let text = "module M {\n C ::= CLASS { }\n A ::= C\n}";
    let host = AnalysisHost::new(AnalysisConfig::default());
    let file = host.add_file(text);

    let before = host.snapshot();
    assert_eq!(before.declaration_at(file, offset_of(text, "A ::=")).unwrap().kind, KindTag::Ambiguous);

    host.analyze();
    let after = host.snapshot();
    assert_eq!(after.declaration_at(file, offset_of(text, "A ::=")).unwrap().kind, KindTag::ObjectClass);
    // The earlier snapshot is frozen.
    assert_eq!(before.declaration_at(file, offset_of(text, "A ::=")).unwrap().kind, KindTag::Ambiguous);
}

#[test]
fn test_snapshot_tracks_edits_and_removals() {
    let text = "module M {\n const integer c_a := 1;\n}";
    let host = AnalysisHost::default();
    let file = host.add_file(text);
    let other = host.add_file("module N {\n}");
    assert_eq!(host.snapshot().file_count(), 2);

    let at = offset_of(text, "1;");
    host.apply_edit(file, &TextEdit::new(TextRange::at(at, TextSize::new(1)), "22"))
        .unwrap();
    let snapshot = host.snapshot();
    assert_eq!(&*snapshot.file(file).unwrap().text, "module M {\n const integer c_a := 22;\n}");
    assert_eq!(snapshot.file(file).unwrap().module.as_ref().unwrap().name(), "M");

    host.remove_file(other).unwrap();
    assert!(host.snapshot().file(other).is_none());
    assert!(snapshot.file(other).is_some());
}

#[test]
fn test_config_change_is_published_after_pass() {
    let host = AnalysisHost::default();
    let file = host.add_file("module M {\n const integer bad := 1;\n}");
    host.analyze();
    assert!(host.snapshot().diagnostics(file).is_empty());

    host.set_config(AnalysisConfig::default().with_naming_conventions(true));
    host.analyze();
    let rendered = host.snapshot().rendered_diagnostics(file);
    assert_eq!(rendered.len(), 1);
    assert!(rendered[0].contains("W0003"), "{rendered:?}");
}

#[test]
fn test_snapshot_outlives_host_state() {
    let host = Arc::new(AnalysisHost::default());
    let file = host.add_file("module M {\n const integer c_a := 1;\n}");
    let snapshot = host.snapshot();
    host.with_project(|project| assert_eq!(project.file_count(), 1));
    drop(host);
    assert_eq!(snapshot.file(file).unwrap().declarations.len(), 1);
}
