//! Configurable checks and kind mismatches.

use rstest::rstest;
use ttcn::hir::{AnalysisConfig, Severity, codes};

use crate::helpers::diagnostic_helpers::{assert_clean, errors, messages};
use crate::helpers::project_helpers::{analysed, project_from};

#[rstest]
#[case("const integer bad := 1;", "constant `bad` should start with `c_`")]
#[case("template integer bad := 1;", "template `bad` should start with `t_`")]
#[case("modulepar integer bad;", "module parameter `bad` should start with `tsp_`")]
#[case("function bad() { }", "function `bad` should start with `f_`")]
#[case("altstep bad() { }", "altstep `bad` should start with `as_`")]
#[case("testcase bad() { }", "testcase `bad` should start with `tc_`")]
fn test_naming_convention_per_kind(#[case] definition: &str, #[case] expected: &str) {
    let source = format!("module M {{\n {definition}\n}}");
    let (mut project, files) = project_from(&[&source]);
    project.set_config(AnalysisConfig::default().with_naming_conventions(true));
    project.analyze();
    assert_eq!(messages(&project, files[0]), vec![format!("W0003: {expected}")]);
}

#[rstest]
#[case("const integer c_a := 1;")]
#[case("template integer t_a := 1;")]
#[case("function f_a() { }")]
#[case("type integer anything;")]
fn test_naming_convention_satisfied(#[case] definition: &str) {
    let source = format!("module M {{\n {definition}\n}}");
    let (mut project, _) = project_from(&[&source]);
    project.set_config(AnalysisConfig::default().with_naming_conventions(true));
    project.analyze();
    assert_clean(&project);
}

#[rstest]
#[case("const c_t c_x := 1;", "E0003: type reference expected: `c_t` is a constant")]
#[case("const integer c_x := C;", "E0003: `C` is an object class and cannot be used in an expression")]
#[case("function f_a() runs on T { }", "E0003: component type expected: `T` is a type")]
fn test_kind_mismatch(#[case] definition: &str, #[case] expected: &str) {
    let source = format!("module M {{\n type integer T;\n const integer c_t := 1;\n C ::= CLASS {{ }}\n {definition}\n}}");
    let (project, files) = analysed(&[&source]);
    assert_eq!(messages(&project, files[0]), vec![expected.to_string()]);
}

#[test]
fn test_unsupported_port_severity() {
    let source = "module M {\n type port P procedure { in integer }\n}";
    let (project, files) = analysed(&[source]);
    let found = errors(&project, files[0]);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code.as_deref(), Some(codes::UNSUPPORTED_CONSTRUCT));

    let (mut project, files) = project_from(&[source]);
    project.set_config(AnalysisConfig::default().with_unsupported_construct_severity(Severity::Warning));
    project.analyze();
    let found = project.file_diagnostics(files[0]);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].severity, Severity::Warning);
}

#[test]
fn test_shadowing_warning_toggle() {
    let source = "module M {\n const integer c_a := 1;\n function f_a() { var integer c_a := 2; }\n}";
    let (mut project, files) = analysed(&[source]);
    assert_eq!(
        messages(&project, files[0]),
        vec!["W0004: `c_a` shadows the module-level constant with the same name"]
    );

    project.set_config(AnalysisConfig::default().with_shadowing_warnings(false));
    project.analyze();
    assert!(messages(&project, files[0]).is_empty());
}
