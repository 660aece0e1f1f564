//! Analysis options.
//!
//! An [`AnalysisConfig`] is an immutable snapshot: a pass reads the
//! snapshot it started with, and a host that wants different options hands
//! the project a new one.

use smol_str::SmolStr;

use super::assignment::KindTag;
use super::diagnostics::Severity;

/// Required identifier prefixes per definition kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamingConventions {
    pub enabled: bool,
    pub constant: SmolStr,
    pub template: SmolStr,
    pub module_par: SmolStr,
    pub function: SmolStr,
    pub altstep: SmolStr,
    pub testcase: SmolStr,
    pub variable: SmolStr,
}

impl Default for NamingConventions {
    fn default() -> Self {
        Self {
            enabled: false,
            constant: SmolStr::new_static("c_"),
            template: SmolStr::new_static("t_"),
            module_par: SmolStr::new_static("tsp_"),
            function: SmolStr::new_static("f_"),
            altstep: SmolStr::new_static("as_"),
            testcase: SmolStr::new_static("tc_"),
            variable: SmolStr::new_static("v_"),
        }
    }
}

impl NamingConventions {
    /// The prefix required for `kind`, if the convention covers it.
    pub fn prefix_for(&self, kind: KindTag) -> Option<&str> {
        let prefix = match kind {
            KindTag::Value => &self.constant,
            KindTag::Template => &self.template,
            KindTag::ModulePar => &self.module_par,
            KindTag::Function => &self.function,
            KindTag::Altstep => &self.altstep,
            KindTag::Testcase => &self.testcase,
            KindTag::Variable | KindTag::VarTemplate => &self.variable,
            _ => return None,
        };
        Some(prefix.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub naming: NamingConventions,
    /// Severity for constructs the engine does not analyse
    /// (procedure and mixed ports).
    pub unsupported_construct_severity: Severity,
    /// Warn when a local definition hides a module-level one.
    pub report_shadowing: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            naming: NamingConventions::default(),
            unsupported_construct_severity: Severity::Error,
            report_shadowing: true,
        }
    }
}

impl AnalysisConfig {
    pub fn with_naming_conventions(mut self, enabled: bool) -> Self {
        self.naming.enabled = enabled;
        self
    }

    pub fn with_naming(mut self, naming: NamingConventions) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_unsupported_construct_severity(mut self, severity: Severity) -> Self {
        self.unsupported_construct_severity = severity;
        self
    }

    pub fn with_shadowing_warnings(mut self, report: bool) -> Self {
        self.report_shadowing = report;
        self
    }
}
