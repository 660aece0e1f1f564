//! Projects: files, edits and analysis passes over a set of modules.
//!
//! - [`Project`] - single-writer state; applies edits and runs passes
//! - [`AnalysisHost`] - the project behind a lock, publishing
//!   [`ProjectSnapshot`]s for concurrent readers
//! - [`ProjectLoader`] - reads module files from disk

mod error;
mod host;
mod loader;
#[allow(clippy::module_inception)]
mod project;

pub use error::ProjectError;
pub use host::{AnalysisHost, DeclarationInfo, FileSnapshot, ProjectSnapshot};
pub use loader::{MODULE_EXTENSIONS, ProjectLoader};
pub use project::{PassReport, Project, SourceFile};
