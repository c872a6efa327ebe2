use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while reading a document for metadata.
///
/// Only hard I/O problems are errors. A corrupt or unsupported document is
/// reported by the extractor as "no metadata" instead.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum RenameError {
    #[error("folder does not exist or is not a directory: {}", .0.display())]
    FolderNotFound(PathBuf),
    #[error("filesystem error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("target already exists: {}", .0.display())]
    Conflict(PathBuf),
    #[error("operation cancelled")]
    Cancelled,
}

/// Why a hand-typed name was not accepted for a plan row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("no row {0} in the plan")]
    NoSuchEntry(usize),
    #[error("hidden files are not renamed; enable hidden files to edit this row")]
    Hidden,
    #[error("name is empty after removing characters filenames cannot hold")]
    Empty,
    #[error("{0} is already taken")]
    Taken(String),
}

impl RenameError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type Result<T, E = RenameError> = std::result::Result<T, E>;
