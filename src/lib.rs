//! Rename document files to `"Author - Title.ext"` using the metadata
//! embedded in them.
//!
//! Planning ([`rename_engine::RenameEngine::plan`]) never touches the
//! filesystem beyond reading; execution applies an approved plan.

pub mod collision;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod rename_engine;
pub mod report;
pub mod sanitize;
pub mod tui;

pub use error::{EditError, ExtractError, RenameError};
pub use metadata::{DocumentKind, FormatExtractor, Metadata, MetadataExtractor};
pub use rename_engine::{
    CancelFlag, ConfigBuilder, ExecutionOutcome, ExecutionResult, FileEntry, PlanEntry, PlanStatus, RenameConfig,
    RenameEngine, RenamePlan, Session,
};
