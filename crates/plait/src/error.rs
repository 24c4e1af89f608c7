//! Fatal error conditions raised while bundling.
//!
//! Every variant aborts the whole bundling request. They travel inside
//! `anyhow::Error`, so callers that need to branch on the kind of failure can
//! use `err.downcast_ref::<BundleError>()`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("entry script not found: {}", .0.display())]
    EntryNotFound(PathBuf),

    #[error("failed to read {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },

    #[error("failed to parse {}:{line}:{column}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("unresolved import '{import}' in {importer}")]
    UnresolvedImport { import: String, importer: String },

    #[error("failed to probe search paths with {}: {reason}", binary.display())]
    ProbeFailure { binary: PathBuf, reason: String },
}

impl BundleError {
    /// Build a parse error from a byte offset into `source`, converting it to
    /// a 1-based line and column.
    pub fn parse_at(path: PathBuf, source: &str, offset: usize, message: String) -> Self {
        let offset = offset.min(source.len());
        let before = source.get(..offset).unwrap_or(source);
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
        let column = before[line_start..].chars().count() + 1;
        Self::Parse {
            path,
            line,
            column,
            message,
        }
    }
}
