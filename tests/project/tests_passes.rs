//! Which modules a pass re-checks, and what it leaves alone.

use ttcn::{AnalysisConfig, Project};

use crate::helpers::diagnostic_helpers::{errors, messages, names};
use crate::helpers::project_helpers::{analysed, edit_after, module};

const BASE: &str = "module Base {\n type integer Num;\n const Num c_one := 1;\n}";
const MID: &str = "module Mid {\n import from Base all;\n const Num c_two := c_one + 1;\n}";
const TOP: &str = "module Top {\n import from Mid all;\n const integer c_three := 3;\n}";
const SIDE: &str = "module Side {\n const integer c_side := nowhere;\n}";

#[test]
fn test_edit_rechecks_transitive_importers_in_order() {
    // Added importers first so source order differs from check order.
    let (mut project, files) = analysed(&[TOP, MID, BASE, SIDE]);
    let edit = edit_after(&project, files[2], "c_one := ", "1", "10");
    project.apply_edit(files[2], &edit).unwrap();

    let report = project.analyze();
    assert_eq!(names(&report.checked), vec!["Base", "Mid", "Top"]);
    assert_eq!(names(&report.skipped), vec!["Side"]);
}

#[test]
fn test_edit_at_the_top_rechecks_only_itself() {
    let (mut project, files) = analysed(&[BASE, MID, TOP, SIDE]);
    let edit = edit_after(&project, files[2], "c_three := ", "3", "33");
    project.apply_edit(files[2], &edit).unwrap();

    let report = project.analyze();
    assert_eq!(names(&report.checked), vec!["Top"]);
    assert_eq!(report.skipped.len(), 3);
}

#[test]
fn test_skipped_module_keeps_diagnostics_and_memo() {
    let (mut project, files) = analysed(&[BASE, MID, TOP, SIDE]);
    let before = messages(&project, files[3]);
    let side_checked = module(&project, files[3]).memo.last_checked();
    assert_eq!(before, vec!["E0001: undefined reference `nowhere`"]);

    let edit = edit_after(&project, files[0], "c_one := ", "1", "2");
    project.apply_edit(files[0], &edit).unwrap();
    let report = project.analyze();

    assert!(names(&report.skipped).contains(&"Side"));
    assert_eq!(messages(&project, files[3]), before);
    assert_eq!(module(&project, files[3]).memo.last_checked(), side_checked);
    assert_ne!(Some(report.timestamp), side_checked);
    assert_eq!(module(&project, files[0]).memo.last_checked(), Some(report.timestamp));
}

#[test]
fn test_pass_over_unchanged_state_is_a_no_op() {
    let (mut project, files) = analysed(&[BASE, MID, SIDE]);
    let before: Vec<Vec<String>> = files.iter().map(|f| messages(&project, *f)).collect();

    let report = project.analyze();
    assert!(report.checked.is_empty());
    let after: Vec<Vec<String>> = files.iter().map(|f| messages(&project, *f)).collect();
    assert_eq!(before, after);
}

#[test]
fn test_removed_import_target_reports_importer() {
    let (mut project, files) = analysed(&[BASE, MID]);
    assert!(errors(&project, files[1]).is_empty());

    project.remove_file(files[0]).unwrap();
    let report = project.analyze();
    assert_eq!(names(&report.checked), vec!["Mid"]);
    let found = messages(&project, files[1]);
    assert_eq!(found[0], "E0014: there is no module named `Base`");
}

#[test]
fn test_config_change_rechecks_every_module() {
    let (mut project, _) = analysed(&[BASE, MID, TOP, SIDE]);
    project.set_config(AnalysisConfig::default().with_naming_conventions(true));
    let report = project.analyze();
    assert_eq!(report.checked.len(), 4);
    assert!(report.skipped.is_empty());
}

#[test]
fn test_timestamps_increase_per_pass() {
    let mut project = Project::new();
    project.add_file(BASE);
    let first = project.analyze().timestamp;
    let second = project.analyze().timestamp;
    assert!(first < second);
    assert_eq!(project.timestamp(), second);
}
