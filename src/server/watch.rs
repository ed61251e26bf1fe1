//! Watch/update channel: filesystem events in, republished snapshots out.

use std::path::{Path, PathBuf};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::mock::store::MOCK_FILE;
use crate::pipeline::{Pipeline, SOURCE_EXTENSION};
use crate::server::ServerState;

/// A change the pipeline reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A source file was created, modified or removed.
    Source(PathBuf),
    /// The mock file was written, possibly by hand.
    MockFile,
}

/// Decides which filesystem events matter.
#[derive(Debug, Clone)]
pub struct ChangeFilter {
    base: PathBuf,
    mock_dir: PathBuf,
    mock_file: PathBuf,
}

impl ChangeFilter {
    /// Builds a filter for sources under `base` and the mock file in
    /// `mock_dir` (relative to `base` unless absolute).
    #[must_use]
    pub fn new(base: &Path, mock_dir: &Path) -> Self {
        let base = base.canonicalize().unwrap_or_else(|_| base.to_path_buf());
        let mock_dir = base.join(mock_dir);
        let mock_file = mock_dir.join(MOCK_FILE);
        Self { base, mock_dir, mock_file }
    }

    /// Directory to watch recursively.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.base
    }

    /// Whether the scanner would visit `path`: under the base directory and
    /// outside any `node_modules`.
    fn scanned(&self, path: &Path) -> bool {
        path.strip_prefix(&self.base)
            .is_ok_and(|rel| !rel.components().any(|c| c.as_os_str() == "node_modules"))
    }

    /// Maps a raw event to the change it represents, if any.
    #[must_use]
    pub fn classify(&self, event: &Event) -> Option<ChangeEvent> {
        let written = matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_));
        if !written && !matches!(event.kind, EventKind::Remove(_)) {
            return None;
        }
        for path in &event.paths {
            if path == &self.mock_file {
                if written {
                    return Some(ChangeEvent::MockFile);
                }
            } else if path.starts_with(&self.mock_dir) || !self.scanned(path) {
                continue;
            } else if path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
                return Some(ChangeEvent::Source(path.clone()));
            }
        }
        None
    }
}

/// Starts a recursive watcher and returns it with the stream of relevant
/// changes. Dropping the watcher ends the stream.
///
/// # Errors
///
/// Returns an error if the platform watcher cannot be created or the base
/// directory cannot be watched.
pub fn watch_changes(filter: ChangeFilter) -> Result<(RecommendedWatcher, UnboundedReceiver<ChangeEvent>)> {
    let (tx, rx) = mpsc::unbounded_channel();
    let root = filter.root().to_path_buf();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Some(change) = filter.classify(&event) {
                    let _ = tx.send(change);
                }
            }
            Err(e) => warn!(error = %e, "watch error"),
        },
        Config::default(),
    )?;
    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!(root = %root.display(), "watching for changes");
    Ok((watcher, rx))
}

/// Applies one change and publishes the result when it differs.
pub fn apply(pipeline: &mut Pipeline, change: &ChangeEvent, state: &ServerState) {
    match change {
        ChangeEvent::Source(path) => {
            debug!(path = %path.display(), "source changed");
            match pipeline.refresh() {
                Ok(report) if report.updated => state.publish(pipeline.mocks().clone()),
                Ok(_) => {}
                Err(e) => error!(error = %e, "regeneration failed, keeping previous mocks"),
            }
        }
        ChangeEvent::MockFile => {
            let mocks = pipeline.reload_mocks().clone();
            if *state.snapshot() != mocks {
                state.publish(mocks);
            }
        }
    }
}

/// Consumes changes one at a time until the stream closes.
pub async fn run_updates(mut pipeline: Pipeline, mut changes: UnboundedReceiver<ChangeEvent>, state: ServerState) {
    while let Some(change) = changes.recv().await {
        apply(&mut pipeline, &change, &state);
    }
    debug!("change stream closed");
}
