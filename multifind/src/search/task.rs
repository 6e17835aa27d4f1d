use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use tracing::{debug, trace};

use super::matcher::NameMatcher;
use super::walker::DirectoryWalker;
use crate::errors::SearchResult;
use crate::results::{NameMatch, WorkerId, WorkerOutcome};
use crate::sink::ResultSink;

/// Searches one root for one wanted name.
///
/// A task owns all of its state; the sink is the only thing it shares with
/// other tasks.
#[derive(Debug, Clone)]
pub struct SearchTask {
    worker: WorkerId,
    root: PathBuf,
    matcher: NameMatcher,
    recursive: bool,
    follow_links: bool,
}

impl SearchTask {
    pub fn new(
        worker: WorkerId,
        root: impl Into<PathBuf>,
        wanted: impl Into<OsString>,
        recursive: bool,
        ignore_case: bool,
    ) -> Self {
        Self {
            worker,
            root: root.into(),
            matcher: NameMatcher::new(wanted, ignore_case),
            recursive,
            follow_links: false,
        }
    }

    /// Descend into symlinked directories while walking
    pub fn follow_links(mut self, yes: bool) -> Self {
        self.follow_links = yes;
        self
    }

    pub fn worker(&self) -> WorkerId {
        self.worker
    }

    pub fn wanted(&self) -> &OsStr {
        self.matcher.wanted()
    }

    /// Runs the search to completion, reporting every match to `sink`.
    ///
    /// Errors never escape: the first one stops the task and is handed back
    /// in the outcome.
    pub fn run<S: ResultSink + ?Sized>(&self, sink: &S) -> WorkerOutcome {
        let mut matches = 0;
        let error = self.search(sink, &mut matches).err();

        if let Some(err) = &error {
            debug!(
                "Worker {} for '{}' stopped after {} matches: {}",
                self.worker,
                self.wanted().to_string_lossy(),
                matches,
                err
            );
        }

        WorkerOutcome {
            worker: self.worker,
            wanted: self.wanted().to_owned(),
            matches,
            error,
        }
    }

    fn search<S: ResultSink + ?Sized>(&self, sink: &S, matches: &mut usize) -> SearchResult<()> {
        let walker = DirectoryWalker::new(&self.root, self.recursive, self.follow_links);

        for entry in walker {
            let entry = entry?;
            if !self.matcher.is_match(entry.file_name()) {
                continue;
            }

            let path = entry.into_path();
            let path = if path.is_absolute() {
                path
            } else {
                std::path::absolute(&path)?
            };

            trace!("Worker {} matched {}", self.worker, path.display());
            sink.emit(&NameMatch {
                worker: self.worker,
                wanted: self.wanted().to_owned(),
                path,
            })?;
            *matches += 1;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SearchError;
    use crate::sink::CollectingSink;
    use std::fs;
    use std::io;
    use std::path::Path;
    use tempfile::tempdir;

    fn build_tree(root: &Path) {
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub/a.txt"), "a").unwrap();
        fs::write(root.join("sub/b.txt"), "b").unwrap();
    }

    /// Fails every write after the first
    struct FlakySink {
        inner: CollectingSink,
        writes: std::sync::atomic::AtomicUsize,
    }

    impl ResultSink for FlakySink {
        fn emit(&self, result: &NameMatch) -> SearchResult<()> {
            use std::sync::atomic::Ordering;
            if self.writes.fetch_add(1, Ordering::SeqCst) > 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed").into());
            }
            self.inner.emit(result)
        }
    }

    #[test]
    fn test_shallow_task() {
        let dir = tempdir().unwrap();
        build_tree(dir.path());

        let sink = CollectingSink::new();
        let task = SearchTask::new(WorkerId::next(), dir.path(), "a.txt", false, false);
        let outcome = task.run(&sink);

        assert_eq!(outcome.matches, 1);
        assert!(outcome.error.is_none());
        let matches = sink.into_matches();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].path, dir.path().join("a.txt"));
        assert_eq!(matches[0].worker, task.worker());
        assert_eq!(matches[0].wanted, "a.txt");
    }

    #[test]
    fn test_recursive_task() {
        let dir = tempdir().unwrap();
        build_tree(dir.path());

        let sink = CollectingSink::new();
        let outcome = SearchTask::new(WorkerId::next(), dir.path(), "a.txt", true, false).run(&sink);

        assert_eq!(outcome.matches, 2);
        let mut paths: Vec<_> = sink.into_matches().into_iter().map(|m| m.path).collect();
        paths.sort();
        assert_eq!(
            paths,
            vec![dir.path().join("a.txt"), dir.path().join("sub/a.txt")]
        );
    }

    #[test]
    fn test_ignore_case_task() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("README.MD"), "r").unwrap();

        let sink = CollectingSink::new();
        let outcome = SearchTask::new(WorkerId::next(), dir.path(), "readme.md", false, true).run(&sink);
        assert_eq!(outcome.matches, 1);
        assert_eq!(sink.into_matches()[0].wanted, "readme.md");

        let sink = CollectingSink::new();
        let outcome = SearchTask::new(WorkerId::next(), dir.path(), "readme.md", false, false).run(&sink);
        assert_eq!(outcome.matches, 0);
    }

    #[test]
    fn test_missing_root_is_not_an_error() {
        let dir = tempdir().unwrap();
        let sink = CollectingSink::new();
        let outcome =
            SearchTask::new(WorkerId::next(), dir.path().join("gone"), "a.txt", true, false).run(&sink);

        assert_eq!(outcome.matches, 0);
        assert!(outcome.error.is_none());
    }

    #[test]
    fn test_sink_failure_stops_task() {
        let dir = tempdir().unwrap();
        for i in 0..3 {
            let sub = dir.path().join(format!("d{}", i));
            fs::create_dir(&sub).unwrap();
            fs::write(sub.join("same.txt"), "x").unwrap();
        }

        let sink = FlakySink {
            inner: CollectingSink::new(),
            writes: Default::default(),
        };
        let outcome = SearchTask::new(WorkerId::next(), dir.path(), "same.txt", true, false).run(&sink);

        assert_eq!(outcome.matches, 1);
        assert!(matches!(outcome.error, Some(SearchError::IoError(_))));
        assert_eq!(sink.inner.into_matches().len(), 1);
    }
}
