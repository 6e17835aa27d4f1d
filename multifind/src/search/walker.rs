use ignore::{Walk, WalkBuilder};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::trace;

use crate::errors::{SearchError, SearchResult};

/// A regular file found by a [`DirectoryWalker`]
#[derive(Debug, Clone)]
pub struct FileEntry {
    path: PathBuf,
}

impl FileEntry {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }

    /// Final path component; files always have one
    pub fn file_name(&self) -> &OsStr {
        self.path.file_name().unwrap_or_default()
    }
}

/// Lazy sequence of the regular files below a root.
///
/// Unlike a code search walk, nothing is filtered by hidden-file or ignore
/// rules: every regular file is a candidate. Entries that cannot be read,
/// that disappeared mid-walk, or that loop back on an ancestor are skipped.
/// Any other traversal error is yielded once and ends the walk.
pub struct DirectoryWalker {
    inner: Option<Walk>,
    follow_links: bool,
}

impl DirectoryWalker {
    /// Walks `root`, one level deep unless `recursive` is set.
    ///
    /// A missing root or a root that is not a directory yields nothing.
    pub fn new(root: &Path, recursive: bool, follow_links: bool) -> Self {
        if !root.is_dir() {
            trace!("Root {} is not a directory, nothing to walk", root.display());
            return Self {
                inner: None,
                follow_links,
            };
        }

        let mut builder = WalkBuilder::new(root);
        builder
            .standard_filters(false)
            .follow_links(follow_links)
            .max_depth(if recursive { None } else { Some(1) });

        Self {
            inner: Some(builder.build()),
            follow_links,
        }
    }

    fn is_regular_file(&self, entry: &ignore::DirEntry) -> bool {
        match entry.file_type() {
            Some(ft) if ft.is_file() => true,
            // A link to a regular file counts; links to directories are
            // only descended when following links
            Some(ft) if ft.is_symlink() && !self.follow_links => entry
                .path()
                .metadata()
                .map(|m| m.is_file())
                .unwrap_or(false),
            _ => false,
        }
    }
}

impl Iterator for DirectoryWalker {
    type Item = SearchResult<FileEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = self.inner.as_mut()?.next()?;
            match next {
                Ok(entry) => {
                    if self.is_regular_file(&entry) {
                        return Some(Ok(FileEntry {
                            path: entry.into_path(),
                        }));
                    }
                }
                Err(err) => {
                    let err = SearchError::Walk(err);
                    if is_skippable(&err) {
                        trace!("Skipping unreadable entry: {}", err);
                        continue;
                    }
                    // Stop after the first hard error
                    self.inner = None;
                    return Some(Err(err));
                }
            }
        }
    }
}

/// Entries that vanished, loop back on an ancestor, or cannot be read are
/// left out of the walk
fn is_skippable(err: &SearchError) -> bool {
    fn is_loop(err: &ignore::Error) -> bool {
        match err {
            ignore::Error::Loop { .. } => true,
            ignore::Error::WithPath { err, .. }
            | ignore::Error::WithDepth { err, .. }
            | ignore::Error::WithLineNumber { err, .. } => is_loop(err),
            _ => false,
        }
    }
    match err {
        SearchError::Walk(e) => {
            is_loop(e)
                || e.io_error().is_some_and(|io| {
                    matches!(
                        io.kind(),
                        std::io::ErrorKind::PermissionDenied | std::io::ErrorKind::NotFound
                    )
                })
        }
        _ => err.is_permission_denied(),
    }
}

/// Walks `root` with symlinked directories left alone
pub fn walk(root: &Path, recursive: bool) -> DirectoryWalker {
    DirectoryWalker::new(root, recursive, false)
}
