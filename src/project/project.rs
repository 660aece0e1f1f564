//! Project state: source files, their modules and the analysis passes run
//! over them.
//!
//! Edits are applied eagerly: the text is updated and the module repaired
//! in place by the reparse engine, or re-parsed whole when the repair
//! escalates to the module. Nothing is checked until [`Project::analyze`],
//! which re-checks only the modules an edit could have affected.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::error::ProjectError;
use crate::base::{FileId, Identifier};
use crate::hir::{
    AnalysisConfig, Checker, CompilationTimeStamp, Database, DependencySelector, Diagnostic,
    DiagnosticOwner, DiagnosticStore, ImportGraph, ModuleId, TimestampAuthority, check_order,
    codes, lower_module,
};
use crate::incremental::{DamageRegion, ReparseEngine, ReparseOutcome, TextEdit};
use crate::parser::parse_module;

/// One source file and the module parsed from it.
#[derive(Clone, Debug)]
pub struct SourceFile {
    pub text: Arc<str>,
    pub path: Option<PathBuf>,
    /// `None` while the text does not parse to a module at all.
    pub module: Option<ModuleId>,
    /// Errors the last full parse recovered from. A recovered tree is not
    /// repaired incrementally; the next edit re-parses the whole file.
    pub syntax_errors: usize,
}

/// What one analysis pass did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassReport {
    pub timestamp: CompilationTimeStamp,
    /// Modules re-checked, in check order.
    pub checked: Vec<Identifier>,
    /// Modules left as they were, in insertion order.
    pub skipped: Vec<Identifier>,
}

/// Single-writer state of a set of modules.
#[derive(Debug)]
pub struct Project {
    files: IndexMap<FileId, SourceFile>,
    paths: FxHashMap<PathBuf, FileId>,
    next_file: u32,
    clock: TimestampAuthority,
    db: Database,
    store: DiagnosticStore,
    config: Arc<AnalysisConfig>,
    /// Modules whose own model changed since the last pass.
    structural: IndexSet<ModuleId>,
    /// Modules to re-check although their model is unchanged.
    semantic: IndexSet<ModuleId>,
    /// Module names that appeared or disappeared since the last pass.
    renamed: IndexSet<SmolStr>,
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl Project {
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            files: IndexMap::new(),
            paths: FxHashMap::default(),
            next_file: 0,
            clock: TimestampAuthority::new(),
            db: Database::new(),
            store: DiagnosticStore::new(),
            config: Arc::new(config),
            structural: IndexSet::new(),
            semantic: IndexSet::new(),
            renamed: IndexSet::new(),
        }
    }

    // ========================================================================
    // FILES
    // ========================================================================

    /// Add `text` as a new file.
    pub fn add_file(&mut self, text: impl Into<Arc<str>>) -> FileId {
        let file = FileId::new(self.next_file);
        self.add_module(file, text);
        file
    }

    /// Add or replace the file loaded from `path`.
    pub fn add_path(&mut self, path: PathBuf, text: impl Into<Arc<str>>) -> FileId {
        let file = self
            .paths
            .get(&path)
            .copied()
            .unwrap_or(FileId::new(self.next_file));
        self.add_module(file, text);
        if let Some(source) = self.files.get_mut(&file) {
            source.path = Some(path.clone());
        }
        self.paths.insert(path, file);
        file
    }

    /// Set the whole text of `file`, adding the file when it is new.
    ///
    /// Returns the module parsed from the text, or `None` when the text
    /// holds no module; syntax errors are reported against the file either
    /// way.
    pub fn add_module(&mut self, file: FileId, text: impl Into<Arc<str>>) -> Option<ModuleId> {
        self.next_file = self.next_file.max(file.raw() + 1);
        let text = text.into();
        match self.files.get_mut(&file) {
            Some(source) => source.text = text,
            None => {
                self.files.insert(
                    file,
                    SourceFile {
                        text,
                        path: None,
                        module: None,
                        syntax_errors: 0,
                    },
                );
            }
        }
        self.reparse_file(file)
    }

    /// Drop `file`, its module and every diagnostic they own.
    pub fn remove_file(&mut self, file: FileId) -> Result<(), ProjectError> {
        let source = self
            .files
            .shift_remove(&file)
            .ok_or(ProjectError::UnknownFile(file))?;
        if let Some(path) = &source.path {
            self.paths.remove(path);
        }
        self.store.clear(DiagnosticOwner::File(file));
        if let Some(module) = source.module {
            self.drop_module(module);
        }
        tracing::debug!("[PROJECT] removed {}", file);
        Ok(())
    }

    /// Drop the file holding `module`.
    pub fn remove_module(&mut self, module: ModuleId) -> Result<(), ProjectError> {
        let file = self
            .db
            .module(module)
            .map(|data| data.file)
            .ok_or(ProjectError::UnknownModule(module))?;
        self.remove_file(file)
    }

    /// Apply `edit` to the text of `file` and repair its module.
    ///
    /// Diagnostics of nodes that survive the repair are moved with the
    /// text; those of re-created nodes are dropped until the next pass.
    pub fn apply_edit(&mut self, file: FileId, edit: &TextEdit) -> Result<ReparseOutcome, ProjectError> {
        let source = self.files.get(&file).ok_or(ProjectError::UnknownFile(file))?;
        let text: Arc<str> = edit
            .apply(&source.text)
            .ok_or(ProjectError::InvalidEdit {
                file,
                range: edit.range,
            })?
            .into();
        let damage = DamageRegion::new(&source.text, edit);
        let repairable = source.module.filter(|_| source.syntax_errors == 0);

        let repaired = repairable.and_then(|id| {
            let module = self.db.module_mut(id)?;
            Some((id, ReparseEngine::new(&text, damage).reparse_module(module)))
        });
        if let Some(source) = self.files.get_mut(&file) {
            source.text = text;
        }

        let outcome = match repaired {
            Some((_, Ok(ReparseOutcome::Shifted))) => {
                self.store.shift(file, damage.range.end(), damage.delta);
                ReparseOutcome::Shifted
            }
            Some((id, Ok(outcome @ ReparseOutcome::Reparsed { region, .. }))) => {
                self.store.remove_within(file, region);
                self.store.shift(file, region.end(), damage.delta);
                let db = &self.db;
                self.store.retain_owners(|owner| db.contains_owner(owner));
                self.structural.insert(id);
                outcome
            }
            Some((_, Err(escalated))) => {
                tracing::debug!("[PROJECT] {} re-parsed whole: {}", file, escalated);
                self.reparse_file(file);
                ReparseOutcome::Full
            }
            Some((_, Ok(ReparseOutcome::Full))) | None => {
                self.reparse_file(file);
                ReparseOutcome::Full
            }
        };
        Ok(outcome)
    }

    /// Replace the configuration; every module is re-checked by the next
    /// pass.
    pub fn set_config(&mut self, config: AnalysisConfig) {
        self.config = Arc::new(config);
        let modules: Vec<ModuleId> = self.db.modules().map(|(id, _)| id).collect();
        self.semantic.extend(modules);
    }

    fn reparse_file(&mut self, file: FileId) -> Option<ModuleId> {
        let source = self.files.get(&file)?;
        let text = Arc::clone(&source.text);
        let old = source.module;
        if let Some(old) = old {
            self.drop_module(old);
        }
        self.store.clear(DiagnosticOwner::File(file));

        let parsed = parse_module(file, &text);
        let syntax_errors = parsed.errors.len();
        for error in parsed.errors {
            self.store.report(
                DiagnosticOwner::File(file),
                Diagnostic::error(error.location, error.message).with_code(codes::SYNTAX_ERROR),
            );
        }
        let module = parsed.content.map(|syntax| {
            let module = lower_module(syntax);
            self.renamed.insert(module.identifier.key());
            let id = self.db.insert(module);
            self.structural.insert(id);
            id
        });
        if let Some(source) = self.files.get_mut(&file) {
            source.module = module;
            source.syntax_errors = syntax_errors;
        }
        tracing::debug!(
            "[PROJECT] parsed {}: module {:?}, {} syntax error(s)",
            file,
            module,
            syntax_errors
        );
        module
    }

    fn drop_module(&mut self, id: ModuleId) {
        if let Some(module) = self.db.remove(id) {
            self.renamed.insert(module.identifier.key());
        }
        self.store.remove_module(id);
        let db = &self.db;
        self.store.retain_owners(|owner| db.contains_owner(owner));
        self.structural.shift_remove(&id);
        self.semantic.shift_remove(&id);
    }

    // ========================================================================
    // ANALYSIS
    // ========================================================================

    /// Run one pass at a fresh stamp over the modules changed since the
    /// last one and everything importing them.
    pub fn analyze(&mut self) -> PassReport {
        let ts = self.clock.issue();
        let graph = ImportGraph::build(&self.db);

        let mut invalidated = std::mem::take(&mut self.structural);
        invalidated.extend(std::mem::take(&mut self.semantic));
        for name in std::mem::take(&mut self.renamed) {
            invalidated.extend(graph.importers_of_name(&name));
            invalidated.extend(
                self.db
                    .modules()
                    .filter(|(_, module)| module.identifier.key() == name)
                    .map(|(id, _)| id),
            );
        }
        invalidated.retain(|id| graph.contains(*id));

        let selected = DependencySelector::new(&graph).select(invalidated);
        let order = check_order(&self.db, &graph, &selected);
        let names: FxHashMap<ModuleId, Identifier> = self
            .db
            .modules()
            .map(|(id, module)| (id, module.identifier.clone()))
            .collect();

        let config = Arc::clone(&self.config);
        let mut checker = Checker::new(&mut self.db, &mut self.store, &config, ts).with_selection(&selected);
        let mut checked = Vec::with_capacity(order.len());
        for id in order {
            if checker.check_module(id) {
                checked.extend(names.get(&id).cloned());
            }
        }

        let skipped: Vec<Identifier> = self
            .db
            .modules()
            .filter(|(id, _)| !selected.contains(id))
            .map(|(_, module)| module.identifier.clone())
            .collect();
        tracing::debug!(
            "[PROJECT] pass {}: {} checked, {} skipped",
            ts,
            checked.len(),
            skipped.len()
        );
        PassReport {
            timestamp: ts,
            checked,
            skipped,
        }
    }

    /// Whether an edit or configuration change is waiting for a pass.
    pub fn has_pending_changes(&self) -> bool {
        !(self.structural.is_empty() && self.semantic.is_empty() && self.renamed.is_empty())
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn diagnostics(&self) -> &DiagnosticStore {
        &self.store
    }

    /// Diagnostics located in `file`, in source order.
    pub fn file_diagnostics(&self, file: FileId) -> Vec<Diagnostic> {
        self.store.for_file(file)
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Stamp of the last pass, `BASE` before the first one.
    pub fn timestamp(&self) -> CompilationTimeStamp {
        self.clock.current()
    }

    pub fn file(&self, file: FileId) -> Option<&SourceFile> {
        self.files.get(&file)
    }

    /// Files in the order they were added.
    pub fn files(&self) -> impl Iterator<Item = (FileId, &SourceFile)> {
        self.files.iter().map(|(id, source)| (*id, source))
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn file_for_path(&self, path: &Path) -> Option<FileId> {
        self.paths.get(path).copied()
    }

    pub fn module_of(&self, file: FileId) -> Option<ModuleId> {
        self.files.get(&file)?.module
    }

    pub fn module_by_name(&self, name: &str) -> Option<ModuleId> {
        self.db.module_by_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::{KindTag, Severity};
    use text_size::TextSize;

    fn names(identifiers: &[Identifier]) -> Vec<&str> {
        identifiers.iter().map(Identifier::name).collect()
    }

    fn edit_after(project: &Project, file: FileId, anchor: &str, old: &str, new: &str) -> TextEdit {
        let text = &project.file(file).unwrap().text;
        let from = text.find(anchor).unwrap() + anchor.len();
        let start = from + text[from..].find(old).unwrap();
        let range = text_size::TextRange::at(TextSize::new(start as u32), TextSize::of(old));
        TextEdit::new(range, new)
    }

    fn messages(project: &Project, file: FileId) -> Vec<String> {
        project
            .file_diagnostics(file)
            .iter()
            .map(|d| format!("{}: {}", d.code.as_deref().unwrap_or("-"), d.message))
            .collect()
    }

    #[test]
    fn test_first_pass_checks_every_module() {
        let mut project = Project::new();
        project.add_file("module Types {\n type integer T;\n}");
        project.add_file("module App {\n import from Types all;\n const T c_x := 1;\n}");
        assert!(project.has_pending_changes());

        let report = project.analyze();
        assert_eq!(names(&report.checked), vec!["Types", "App"]);
        assert!(report.skipped.is_empty());
        assert!(!project.has_pending_changes());
        assert_eq!(project.timestamp(), report.timestamp);
    }

    #[test]
    fn test_pass_without_changes_checks_nothing() {
        let mut project = Project::new();
        project.add_file("module A {\n}");
        project.analyze();
        let report = project.analyze();
        assert!(report.checked.is_empty());
        assert_eq!(names(&report.skipped), vec!["A"]);
    }

    #[test]
    fn test_edit_rechecks_module_and_importers_only() {
        let mut project = Project::new();
        let lib = project.add_file("module Lib {\n const integer c_a := 1;\n}");
        project.add_file("module App {\n import from Lib all;\n const integer c_b := c_a;\n}");
        project.add_file("module Other {\n const integer c_c := 3;\n}");
        project.analyze();

        let edit = edit_after(&project, lib, "c_a := ", "1", "2");
        let outcome = project.apply_edit(lib, &edit).unwrap();
        assert!(matches!(outcome, ReparseOutcome::Reparsed { removed: 1, inserted: 1, .. }));

        let report = project.analyze();
        assert_eq!(names(&report.checked), vec!["Lib", "App"]);
        assert_eq!(names(&report.skipped), vec!["Other"]);
    }

    #[test]
    fn test_whitespace_edit_shifts_diagnostics() {
        let mut project = Project::new();
        let file = project.add_file("module M {\n const integer c_a := 1;\n const integer c_b := missing;\n}");
        project.analyze();
        let before = project.file_diagnostics(file)[0].location;

        let edit = TextEdit::insert(TextSize::new(11), "\n\n");
        assert_eq!(project.apply_edit(file, &edit).unwrap(), ReparseOutcome::Shifted);
        let after = project.file_diagnostics(file)[0].location;
        assert_eq!(after, before.shifted(2));
        assert!(!project.has_pending_changes());
    }

    #[test]
    fn test_reparsed_definition_drops_its_diagnostics_until_next_pass() {
        let mut project = Project::new();
        let file = project.add_file("module M {\n const integer c_a := missing;\n const integer c_b := other;\n}");
        project.analyze();
        assert_eq!(project.file_diagnostics(file).len(), 2);

        let edit = edit_after(&project, file, "c_a := ", "missing", "1");
        project.apply_edit(file, &edit).unwrap();
        assert_eq!(messages(&project, file), vec!["E0001: undefined reference `other`"]);

        project.analyze();
        assert_eq!(messages(&project, file), vec!["E0001: undefined reference `other`"]);
    }

    #[test]
    fn test_broken_edit_reparses_whole_file() {
        let mut project = Project::new();
        let file = project.add_file("module M {\n const integer c_a := 1;\n}");
        let first = project.module_of(file).unwrap();
        project.analyze();

        let edit = edit_after(&project, file, "c_a", " := 1;", " := (1;");
        assert_eq!(project.apply_edit(file, &edit).unwrap(), ReparseOutcome::Full);
        assert_ne!(project.module_of(file), Some(first));
        assert!(project.db().module(first).is_none());
        assert!(project.file(file).unwrap().syntax_errors > 0);
        assert!(
            project
                .file_diagnostics(file)
                .iter()
                .any(|d| d.code.as_deref() == Some(codes::SYNTAX_ERROR))
        );

        // The recovered tree is replaced whole by the fixing edit.
        let edit = edit_after(&project, file, "c_a", " := (1;", " := 1;");
        assert_eq!(project.apply_edit(file, &edit).unwrap(), ReparseOutcome::Full);
        assert_eq!(project.file(file).unwrap().syntax_errors, 0);
        project.analyze();
        assert!(project.file_diagnostics(file).is_empty());
    }

    #[test]
    fn test_text_without_module() {
        let mut project = Project::new();
        let file = project.add_file("const integer c_a := 1;");
        assert_eq!(project.module_of(file), None);
        assert!(project.diagnostics().has_errors());

        let edit = TextEdit::new(text_size::TextRange::up_to(TextSize::of("const integer c_a := 1;")), "module M { }");
        assert_eq!(project.apply_edit(file, &edit).unwrap(), ReparseOutcome::Full);
        assert!(project.module_of(file).is_some());
        assert!(!project.diagnostics().has_errors());
    }

    #[test]
    fn test_module_appearing_rechecks_importers_by_name() {
        let mut project = Project::new();
        let app = project.add_file("module App {\n import from Lib all;\n}");
        project.add_file("module Unrelated {\n}");
        project.analyze();
        assert_eq!(messages(&project, app), vec!["E0014: there is no module named `Lib`"]);

        project.add_file("module Lib {\n}");
        let report = project.analyze();
        assert_eq!(names(&report.checked), vec!["Lib", "App"]);
        assert!(project.file_diagnostics(app).is_empty());

        let lib = project.module_by_name("Lib").unwrap();
        project.remove_module(lib).unwrap();
        let report = project.analyze();
        assert_eq!(names(&report.checked), vec!["App"]);
        assert_eq!(messages(&project, app), vec!["E0014: there is no module named `Lib`"]);
    }

    #[test]
    fn test_duplicate_module_name_moves_to_survivor() {
        let mut project = Project::new();
        let first = project.add_file("module M {\n}");
        let second = project.add_file("module M {\n}");
        project.analyze();
        assert!(project.file_diagnostics(first).is_empty());
        assert_eq!(messages(&project, second), vec!["E0004: module `M` is already defined"]);

        project.remove_file(first).unwrap();
        let report = project.analyze();
        assert_eq!(names(&report.checked), vec!["M"]);
        assert!(project.file_diagnostics(second).is_empty());
    }

    #[test]
    fn test_config_change_rechecks_everything() {
        let mut project = Project::new();
        let file = project.add_file("module M {\n const integer bad := 1;\n}");
        project.add_file("module N {\n}");
        project.analyze();
        assert!(project.file_diagnostics(file).is_empty());

        project.set_config(AnalysisConfig::default().with_naming_conventions(true));
        let report = project.analyze();
        assert_eq!(report.checked.len(), 2);
        let diagnostics = project.file_diagnostics(file);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(diagnostics[0].code.as_deref(), Some(codes::NAMING_CONVENTION));
    }

    #[test]
    fn test_errors() {
        let mut project = Project::new();
        let file = project.add_file("module M { }");
        let edit = TextEdit::insert(TextSize::new(100), "x");
        assert!(matches!(
            project.apply_edit(file, &edit),
            Err(ProjectError::InvalidEdit { .. })
        ));
        assert!(matches!(
            project.apply_edit(FileId::new(9), &edit),
            Err(ProjectError::UnknownFile(_))
        ));
        project.remove_file(file).unwrap();
        assert!(matches!(project.remove_file(file), Err(ProjectError::UnknownFile(_))));
        assert_eq!(project.file_count(), 0);
    }

    #[test]
    fn test_paths_map_to_one_file() {
        let mut project = Project::new();
        let path = PathBuf::from("/work/a.ttcn");
        let file = project.add_path(path.clone(), "module A { const integer c_a := 1; }");
        let again = project.add_path(path.clone(), "module A { type integer T; }");
        assert_eq!(file, again);
        assert_eq!(project.file_for_path(&path), Some(file));
        let module = project.db().module(project.module_of(file).unwrap()).unwrap();
        let only = module.assignment(module.definitions()[0]).unwrap();
        assert_eq!(only.tag(), KindTag::Type);
        assert_eq!(project.db().len(), 1);
    }
}
