//! Error types for multifind.
//!
//! Only a bad search root ever reaches the caller of [`crate::search`].
//! Everything that goes wrong inside a single worker (walk errors, write
//! failures) is reported as a [`SearchError`] to the worker itself and
//! contained there.
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur during search operations
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("'{}' is not a directory.", .0.display())]
    InvalidRoot(PathBuf),
    #[error("could not check '{}'", path.display())]
    RootCheck {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to launch worker for '{name}': {source}")]
    Launch {
        name: String,
        source: std::io::Error,
    },
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Canonicalize the path and strip UNC prefixes so that
/// reported paths on Windows are consistent.
pub fn unify_path(original: &Path) -> PathBuf {
    let canonical = original
        .canonicalize()
        .unwrap_or_else(|_| original.to_path_buf());
    strip_unc_prefix(&canonical)
}

/// Strips the Windows UNC prefix (\\?\) from a path if present
fn strip_unc_prefix(p: &Path) -> PathBuf {
    let s = p.display().to_string();
    if let Some(stripped) = s.strip_prefix(r"\\?\") {
        PathBuf::from(stripped)
    } else {
        p.to_path_buf()
    }
}

impl SearchError {
    pub fn invalid_root(path: impl Into<PathBuf>) -> Self {
        Self::InvalidRoot(path.into())
    }

    pub fn root_check(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::RootCheck {
            path: path.into(),
            source,
        }
    }

    pub fn launch(name: impl Into<String>, source: std::io::Error) -> Self {
        Self::Launch {
            name: name.into(),
            source,
        }
    }

    /// True for errors a walker should skip over rather than stop on.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            SearchError::IoError(e) => e.kind() == std::io::ErrorKind::PermissionDenied,
            SearchError::Walk(e) => e
                .io_error()
                .is_some_and(|io| io.kind() == std::io::ErrorKind::PermissionDenied),
            _ => false,
        }
    }
}
