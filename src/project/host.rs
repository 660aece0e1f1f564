//! AnalysisHost and ProjectSnapshot: one writer, many readers.
//!
//! The host owns the [`Project`] behind a mutex; every mutation runs under
//! it and ends by publishing a fresh [`ProjectSnapshot`]. Readers clone the
//! published `Arc` and query it without ever taking the project lock, so a
//! query never waits for a pass and never sees a declaration list that is
//! being spliced.
//!
//! ## Usage
//!
//! ```ignore
//! let host = AnalysisHost::new(AnalysisConfig::default());
//! let file = host.add_file("module M { const integer c_a := 1; }");
//! host.analyze();
//!
//! let snapshot = host.snapshot();
//! let declaration = snapshot.declaration_at(file, offset);
//! ```

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use text_size::TextSize;

use super::error::ProjectError;
use super::project::{PassReport, Project};
use crate::base::{FileId, Identifier, LineIndex, Location};
use crate::hir::{AnalysisConfig, CompilationTimeStamp, Diagnostic, KindTag};
use crate::incremental::{ReparseOutcome, TextEdit};

/// A module-level declaration as published to readers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclarationInfo {
    pub name: Identifier,
    /// Kind after classification; `Ambiguous` until classified.
    pub kind: KindTag,
    pub location: Location,
}

/// Published state of one file.
#[derive(Clone, Debug)]
pub struct FileSnapshot {
    pub text: Arc<str>,
    pub module: Option<Identifier>,
    /// Module-level declarations in source order.
    pub declarations: Arc<[DeclarationInfo]>,
    pub diagnostics: Arc<[Diagnostic]>,
    pub line_index: Arc<LineIndex>,
}

/// Immutable view of a project between two mutations.
#[derive(Clone, Debug)]
pub struct ProjectSnapshot {
    timestamp: CompilationTimeStamp,
    files: FxHashMap<FileId, FileSnapshot>,
}

impl ProjectSnapshot {
    pub fn capture(project: &Project) -> Self {
        let files = project
            .files()
            .map(|(file, source)| {
                let module = source.module.and_then(|id| project.db().module(id));
                let declarations: Vec<DeclarationInfo> = module
                    .map(|module| {
                        module
                            .definitions()
                            .iter()
                            .filter_map(|id| module.assignment(*id))
                            .map(|assignment| DeclarationInfo {
                                name: assignment.identifier.clone(),
                                kind: assignment.tag(),
                                location: assignment.location,
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                let snapshot = FileSnapshot {
                    text: Arc::clone(&source.text),
                    module: module.map(|module| module.identifier.clone()),
                    declarations: declarations.into(),
                    diagnostics: project.file_diagnostics(file).into(),
                    line_index: Arc::new(LineIndex::new(&source.text)),
                };
                (file, snapshot)
            })
            .collect();
        Self {
            timestamp: project.timestamp(),
            files,
        }
    }

    /// Stamp of the last pass the snapshot includes.
    pub fn timestamp(&self) -> CompilationTimeStamp {
        self.timestamp
    }

    pub fn file(&self, file: FileId) -> Option<&FileSnapshot> {
        self.files.get(&file)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// The module-level declaration whose text contains `offset`.
    pub fn declaration_at(&self, file: FileId, offset: TextSize) -> Option<&DeclarationInfo> {
        let declarations = &self.files.get(&file)?.declarations;
        let index = declarations.partition_point(|d| d.location.end() <= offset);
        declarations.get(index).filter(|d| d.location.contains(offset))
    }

    pub fn diagnostics(&self, file: FileId) -> &[Diagnostic] {
        self.files
            .get(&file)
            .map(|snapshot| &*snapshot.diagnostics)
            .unwrap_or_default()
    }

    /// `file`'s diagnostics rendered as `line:col: severity[code]: message`.
    pub fn rendered_diagnostics(&self, file: FileId) -> Vec<String> {
        let Some(snapshot) = self.files.get(&file) else {
            return Vec::new();
        };
        snapshot
            .diagnostics
            .iter()
            .map(|diagnostic| diagnostic.render(&snapshot.line_index))
            .collect()
    }
}

/// Owns the project and publishes snapshots of it.
pub struct AnalysisHost {
    project: Mutex<Project>,
    published: RwLock<Arc<ProjectSnapshot>>,
}

impl Default for AnalysisHost {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl AnalysisHost {
    pub fn new(config: AnalysisConfig) -> Self {
        Self::from_project(Project::with_config(config))
    }

    pub fn from_project(project: Project) -> Self {
        let snapshot = ProjectSnapshot::capture(&project);
        Self {
            project: Mutex::new(project),
            published: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<ProjectSnapshot> {
        Arc::clone(&self.published.read())
    }

    pub fn add_file(&self, text: impl Into<Arc<str>>) -> FileId {
        self.mutate(|project| project.add_file(text))
    }

    pub fn apply_edit(&self, file: FileId, edit: &TextEdit) -> Result<ReparseOutcome, ProjectError> {
        self.mutate(|project| project.apply_edit(file, edit))
    }

    pub fn remove_file(&self, file: FileId) -> Result<(), ProjectError> {
        self.mutate(|project| project.remove_file(file))
    }

    pub fn set_config(&self, config: AnalysisConfig) {
        self.mutate(|project| project.set_config(config))
    }

    pub fn analyze(&self) -> PassReport {
        self.mutate(Project::analyze)
    }

    /// Run `f` on the project under the writer lock, then publish.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut Project) -> R) -> R {
        let mut project = self.project.lock();
        let result = f(&mut project);
        let snapshot = Arc::new(ProjectSnapshot::capture(&project));
        *self.published.write() = snapshot;
        result
    }

    /// Read the live project. Blocks while a mutation runs.
    pub fn with_project<R>(&self, f: impl FnOnce(&Project) -> R) -> R {
        f(&self.project.lock())
    }
}
