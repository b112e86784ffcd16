//! Shared vocabulary for the relocale workspace: locale codes, insertion-ordered
//! locale sets, and the [`Diff`] produced by [`resolve`].

use std::path::PathBuf;

use thiserror::Error;

mod diff;
mod locale;

pub use diff::{resolve, Diff};
pub use locale::{LocaleCode, LocaleError, LocaleSet};

/// Workspace-wide result alias.
pub type Result<T> = color_eyre::eyre::Result<T>;

/// Typed failures that callers match on (the rest travels as `eyre::Report`).
#[derive(Debug, Error)]
pub enum RelocaleError {
    /// An artifact lacks a pattern every downstream step depends on.
    #[error("{path}: could not find {what}")]
    StructuralAbsence { path: PathBuf, what: String },
    /// A locale copy would land on a directory that already exists.
    #[error("refusing to copy onto existing directory {0}")]
    TargetExists(PathBuf),
}

impl RelocaleError {
    pub fn absent(path: impl Into<PathBuf>, what: impl Into<String>) -> Self {
        Self::StructuralAbsence {
            path: path.into(),
            what: what.into(),
        }
    }
}
