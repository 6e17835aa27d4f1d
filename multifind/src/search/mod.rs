//! Concurrent file name search.
//!
//! The [`engine`] launches one [`task::SearchTask`] per wanted name on its
//! own thread. Each task walks the root with a [`walker::DirectoryWalker`],
//! tests every file name with a [`matcher::NameMatcher`] and reports matches
//! to a shared [`crate::sink::ResultSink`].
pub mod engine;
pub mod matcher;
pub mod task;
pub mod walker;

pub use engine::{resolve_root, search};
pub use matcher::{names_match, NameMatcher};
pub use task::SearchTask;
pub use walker::{walk, DirectoryWalker, FileEntry};
