use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread::{self, Scope, ScopedJoinHandle};
use tracing::{debug, error, info};

use super::task::SearchTask;
use crate::config::{LaunchPolicy, SearchConfig};
use crate::errors::{unify_path, SearchError, SearchResult};
use crate::results::{SearchSummary, WorkerId, WorkerOutcome};
use crate::sink::ResultSink;

/// Checks that `root` is a directory and resolves it to an absolute path.
///
/// Resolution happens once, before any worker starts, so workers never
/// consult the current directory.
pub fn resolve_root(root: &Path) -> SearchResult<PathBuf> {
    match fs::metadata(root) {
        Ok(metadata) if metadata.is_dir() => {
            let unified = unify_path(root);
            if unified.is_absolute() {
                Ok(unified)
            } else {
                Ok(std::path::absolute(&unified)?)
            }
        }
        Ok(_) => Err(SearchError::invalid_root(root)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(SearchError::invalid_root(root)),
        Err(e) => Err(SearchError::root_check(root, e)),
    }
}

/// Starts one worker thread; errors mean the thread could not be created
type Spawned<'scope> = io::Result<ScopedJoinHandle<'scope, WorkerOutcome>>;

/// Searches for every configured name concurrently, one worker thread per
/// name, writing matches to `sink`.
///
/// Returns once every launched worker has finished. Only an invalid root is
/// an error; failed or panicking workers and workers that could not be
/// launched are counted in the summary.
pub fn search<S: ResultSink + ?Sized>(
    config: &SearchConfig,
    sink: &S,
) -> SearchResult<SearchSummary> {
    search_with(config, sink, |scope, builder, task, sink| {
        builder.spawn_scoped(scope, move || task.run(sink))
    })
}

fn search_with<'env, S, F>(
    config: &SearchConfig,
    sink: &'env S,
    spawn: F,
) -> SearchResult<SearchSummary>
where
    S: ResultSink + ?Sized,
    F: for<'scope> Fn(
        &'scope Scope<'scope, 'env>,
        thread::Builder,
        SearchTask,
        &'env S,
    ) -> Spawned<'scope>,
{
    info!(
        "Starting search for {:?} in {}",
        config.names,
        config.root_path.display()
    );

    let root = resolve_root(&config.root_path)?;
    let mut summary = SearchSummary::new();

    if config.names.is_empty() {
        debug!("No names provided, returning empty summary");
        return Ok(summary);
    }

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(config.names.len());

        for name in &config.names {
            let task = SearchTask::new(
                WorkerId::next(),
                root.clone(),
                name.clone(),
                config.recursive,
                config.ignore_case,
            )
            .follow_links(config.follow_links);
            let worker = task.worker();
            let name = name.to_string_lossy();

            let builder = thread::Builder::new().name(format!("multifind-worker-{}", worker));
            match spawn(scope, builder, task, sink) {
                Ok(handle) => {
                    debug!("Launched worker {} for '{}'", worker, name);
                    handles.push((worker, name, handle));
                }
                Err(e) => {
                    error!("{}", SearchError::launch(name, e));
                    summary.launch_failures += 1;
                    if config.launch_policy == LaunchPolicy::Abort {
                        break;
                    }
                }
            }
        }

        summary.workers_launched = handles.len();

        for (worker, name, handle) in handles {
            match handle.join() {
                Ok(outcome) => summary.add_outcome(&outcome),
                Err(_) => {
                    debug!("Worker {} for '{}' panicked", worker, name);
                    summary.add_panicked_worker();
                }
            }
        }
    });

    info!(
        "Search complete. {} workers found {} matches ({} failed, {} not launched)",
        summary.workers_launched,
        summary.total_matches,
        summary.failed_workers,
        summary.launch_failures
    );

    Ok(summary)
}
