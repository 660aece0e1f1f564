//! Damage growth over neighbouring definitions, seen through a project.

use rstest::rstest;
use ttcn::ReparseOutcome;
use ttcn::hir::codes;

use crate::helpers::diagnostic_helpers::{assert_clean, messages, names};
use crate::helpers::project_helpers::{analysed, assignment, definition, edit_after, module};

fn definition_names(project: &ttcn::Project, file: ttcn::FileId) -> Vec<String> {
    let data = module(project, file);
    data.definitions()
        .iter()
        .map(|id| data.assignment(*id).unwrap().name().to_string())
        .collect()
}

#[test]
fn test_continuation_absorbs_unterminated_definition() {
    let (mut project, files) = analysed(&["module M {\n const integer c_a := 1\n const integer c_b := 2;\n}"]);
    let edit = edit_after(&project, files[0], "c_a := 1\n", "const", "+ 1;\n const");
    let outcome = project.apply_edit(files[0], &edit).unwrap();
    assert!(matches!(outcome, ReparseOutcome::Reparsed { removed: 2, inserted: 2, .. }));
    assert_eq!(definition_names(&project, files[0]), vec!["c_a", "c_b"]);

    let text = &project.file(files[0]).unwrap().text;
    assert_eq!(&text[assignment(&project, files[0], "c_a").location.range], "const integer c_a := 1\n + 1;");
}

#[rstest]
#[case::constant(" const integer c_new := 5;\n")]
#[case::type_alias(" type integer T_new;\n")]
#[case::function(" function f_new() { }\n")]
fn test_inserted_definition_leaves_neighbours(#[case] inserted: &str) {
    let (mut project, files) = analysed(&["module M {\n const integer c_a := 1;\n const integer c_b := 2;\n}"]);
    let stamp = project.timestamp();
    let a = definition(&project, files[0], "c_a");
    let b = definition(&project, files[0], "c_b");

    let edit = edit_after(&project, files[0], "c_a := 1;\n", " ", &format!("{inserted} "));
    let outcome = project.apply_edit(files[0], &edit).unwrap();
    assert!(matches!(outcome, ReparseOutcome::Reparsed { removed: 0, inserted: 1, .. }), "{outcome:?}");
    assert_eq!(definition(&project, files[0], "c_a"), a);
    assert_eq!(definition(&project, files[0], "c_b"), b);
    assert_eq!(assignment(&project, files[0], "c_b").memo.last_checked(), Some(stamp));
    assert_eq!(definition_names(&project, files[0]).len(), 3);

    let report = project.analyze();
    assert_eq!(names(&report.checked), vec!["M"]);
    assert_clean(&project);
}

#[test]
fn test_deleted_definition_takes_its_diagnostics() {
    let (mut project, files) = analysed(&["module M {\n const integer c_a := missing;\n const integer c_b := 2;\n}"]);
    assert_eq!(messages(&project, files[0]), vec!["E0001: undefined reference `missing`"]);

    let edit = edit_after(&project, files[0], "{\n", " const integer c_a := missing;\n", "");
    let outcome = project.apply_edit(files[0], &edit).unwrap();
    assert!(matches!(outcome, ReparseOutcome::Reparsed { removed: 1, inserted: 0, .. }), "{outcome:?}");
    assert_clean(&project);
    assert_eq!(definition_names(&project, files[0]), vec!["c_b"]);

    project.analyze();
    assert_clean(&project);
}

#[test]
fn test_edit_touching_module_brace_reparses_file() {
    let (mut project, files) = analysed(&["module M {\n const integer c_a := 1;\n}"]);
    let edit = edit_after(&project, files[0], "c_a := 1;", "\n}", "\n const integer c_b := 2;\n}");
    assert_eq!(project.apply_edit(files[0], &edit).unwrap(), ReparseOutcome::Full);
    assert_eq!(definition_names(&project, files[0]), vec!["c_a", "c_b"]);
}

const PLAIN: &str = "module M {\n const integer c_a := 1;\n const integer c_b := 2;\n const integer c_c := 3;\n}";

fn fresh_names(project: &ttcn::Project, file: ttcn::FileId) -> Vec<String> {
    let text = project.file(file).unwrap().text.to_string();
    let (fresh, files) = analysed(&[text.as_str()]);
    definition_names(&fresh, files[0])
}

#[rstest]
#[case::line_comment_out(PLAIN, "c_a := 1;\n", " ", " //", vec!["c_a", "c_c"])]
#[case::line_comment_in(
    "module M {\n const integer c_a := 1;\n //const integer c_b := 2;\n const integer c_c := 3;\n}",
    "c_a := 1;\n ",
    "//",
    "",
    vec!["c_a", "c_b", "c_c"]
)]
#[case::block_comment_out(
    "module M {\n const integer c_a := 1;\n const integer c_b := 2; // */\n const integer c_c := 3;\n}",
    "c_a := 1;\n",
    " ",
    " /*",
    vec!["c_a", "c_c"]
)]
#[case::block_comment_in(
    "module M {\n const integer c_a := 1;\n /*const integer c_b := 2; // */\n const integer c_c := 3;\n}",
    "c_a := 1;\n ",
    "/*",
    "",
    vec!["c_a", "c_b", "c_c"]
)]
fn test_comment_opener_in_gap_matches_fresh_parse(
    #[case] source: &str,
    #[case] after: &str,
    #[case] old: &str,
    #[case] new: &str,
    #[case] expected: Vec<&str>,
) {
    let (mut project, files) = analysed(&[source]);
    let a = definition(&project, files[0], "c_a");
    let c = definition(&project, files[0], "c_c");

    let edit = edit_after(&project, files[0], after, old, new);
    let outcome = project.apply_edit(files[0], &edit).unwrap();
    assert!(matches!(outcome, ReparseOutcome::Reparsed { .. }), "{outcome:?}");
    assert_eq!(definition_names(&project, files[0]), expected);
    assert_eq!(definition_names(&project, files[0]), fresh_names(&project, files[0]));

    // The untouched neighbours keep their nodes.
    assert_eq!(definition(&project, files[0], "c_a"), a);
    assert_eq!(definition(&project, files[0], "c_c"), c);
    let text = &project.file(files[0]).unwrap().text;
    assert_eq!(&text[assignment(&project, files[0], "c_c").location.range], "const integer c_c := 3;");

    project.analyze();
    assert_clean(&project);
}

#[test]
fn test_string_opener_in_gap_reparses_file() {
    let (mut project, files) = analysed(&[PLAIN]);
    let edit = edit_after(&project, files[0], "c_a := 1;\n", " ", " \"");
    assert_eq!(project.apply_edit(files[0], &edit).unwrap(), ReparseOutcome::Full);
    let syntax = format!("{}:", codes::SYNTAX_ERROR);
    assert!(messages(&project, files[0]).iter().any(|m| m.starts_with(&syntax)));
}
