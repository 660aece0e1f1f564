use std::path::PathBuf;

use text_size::TextRange;
use thiserror::Error;

use crate::base::FileId;
use crate::hir::ModuleId;

/// Errors of project operations. Problems in the analysed text are never
/// errors here; they are diagnostics.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("unknown file {0}")]
    UnknownFile(FileId),

    #[error("unknown module {0}")]
    UnknownModule(ModuleId),

    #[error("edit range {range:?} is not a valid range of {file}")]
    InvalidEdit { file: FileId, range: TextRange },

    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
