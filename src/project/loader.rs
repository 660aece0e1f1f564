//! Loading module files from disk into a [`Project`].

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use super::error::ProjectError;
use super::project::Project;
use crate::base::FileId;

/// File extensions recognized as modules.
pub const MODULE_EXTENSIONS: &[&str] = &["ttcn", "ttcn3"];

/// Loads module files into a project.
#[derive(Clone, Debug, Default)]
pub struct ProjectLoader {
    follow_links: bool,
}

impl ProjectLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Module files under `dir`, sorted by path.
    pub fn collect_paths(&self, dir: &Path) -> Result<Vec<PathBuf>, ProjectError> {
        if !dir.is_dir() {
            return Err(ProjectError::DirectoryNotFound(dir.to_path_buf()));
        }
        let mut paths = Vec::new();
        for entry in WalkDir::new(dir).follow_links(self.follow_links) {
            let entry = entry.map_err(|error| {
                let path = error.path().unwrap_or(dir).to_path_buf();
                ProjectError::Io {
                    path,
                    source: error.into(),
                }
            })?;
            if entry.file_type().is_file() && has_module_extension(entry.path()) {
                paths.push(entry.into_path());
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Read every module file under `dir` in parallel and add them to
    /// `project` in path order. Fails before touching the project when a
    /// file cannot be read.
    pub fn load_directory(&self, project: &mut Project, dir: &Path) -> Result<Vec<FileId>, ProjectError> {
        let paths = self.collect_paths(dir)?;
        let texts: Vec<(PathBuf, String)> = paths
            .into_par_iter()
            .map(|path| match std::fs::read_to_string(&path) {
                Ok(text) => Ok((path, text)),
                Err(source) => Err(ProjectError::Io { path, source }),
            })
            .collect::<Result<_, _>>()?;

        let files: Vec<FileId> = texts
            .into_iter()
            .map(|(path, text)| project.add_path(path, text))
            .collect();
        tracing::debug!("[LOADER] loaded {} file(s) from {}", files.len(), dir.display());
        Ok(files)
    }

    /// Read one file and add it to `project`.
    pub fn load_file(&self, project: &mut Project, path: &Path) -> Result<FileId, ProjectError> {
        let text = std::fs::read_to_string(path).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(project.add_path(path.to_path_buf(), text))
    }
}

fn has_module_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| MODULE_EXTENSIONS.contains(&extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_collects_module_files_in_path_order() {
        let dir = TempDir::new().unwrap();
        write(&dir, "b.ttcn", "module B { }");
        write(&dir, "nested/a.ttcn3", "module A { }");
        write(&dir, "notes.txt", "not a module");

        let paths = ProjectLoader::new().collect_paths(dir.path()).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["b.ttcn", "nested/a.ttcn3"]);
    }

    #[test]
    fn test_load_directory_adds_every_module() {
        let dir = TempDir::new().unwrap();
        write(&dir, "lib.ttcn", "module Lib {\n const integer c_a := 1;\n}");
        write(&dir, "app.ttcn", "module App {\n import from Lib all;\n const integer c_b := c_a;\n}");

        let mut project = Project::new();
        let files = ProjectLoader::new().load_directory(&mut project, dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(project.file_for_path(&dir.path().join("lib.ttcn")), Some(files[1]));

        project.analyze();
        assert!(!project.diagnostics().has_errors());
    }

    #[test]
    fn test_reload_reuses_file_ids() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "m.ttcn", "module M { }");
        let loader = ProjectLoader::new();
        let mut project = Project::new();
        let first = loader.load_file(&mut project, &path).unwrap();
        fs::write(&path, "module M { type integer T; }").unwrap();
        let again = loader.load_directory(&mut project, dir.path()).unwrap();
        assert_eq!(again, vec![first]);
        assert_eq!(project.file_count(), 1);
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let mut project = Project::new();
        let result = ProjectLoader::new().load_directory(&mut project, &missing);
        assert!(matches!(result, Err(ProjectError::DirectoryNotFound(_))));
        assert!(matches!(
            ProjectLoader::new().load_file(&mut project, &missing),
            Err(ProjectError::Io { .. })
        ));
    }
}
