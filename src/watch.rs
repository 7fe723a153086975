//! Polling folder monitor behind `seatingd watch <folder>`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, SystemTime};

use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    Created(PathBuf),
    Modified(PathBuf),
    Deleted(PathBuf),
}

impl std::fmt::Display for FileEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created(p) => write!(f, "New file created: {}", p.display()),
            Self::Modified(p) => write!(f, "File modified: {}", p.display()),
            Self::Deleted(p) => write!(f, "File deleted: {}", p.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    modified: Option<SystemTime>,
    len: u64,
}

/// Files under a root (directories are not tracked) with their mtime and
/// size at scan time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    files: BTreeMap<PathBuf, Stamp>,
}

impl Snapshot {
    pub fn scan(root: &Path) -> Self {
        let files = WalkDir::new(root)
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::debug!(error = %err, "skipping unreadable entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let meta = e.metadata().ok()?;
                let stamp = Stamp {
                    modified: meta.modified().ok(),
                    len: meta.len(),
                };
                Some((e.into_path(), stamp))
            })
            .collect();
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Changes from `self` to `next`, deletions first, then creations and
    /// modifications in path order. A rename shows up as a delete plus a
    /// create.
    pub fn diff(&self, next: &Snapshot) -> Vec<FileEvent> {
        let mut events: Vec<FileEvent> = self
            .files
            .keys()
            .filter(|p| !next.files.contains_key(*p))
            .map(|p| FileEvent::Deleted(p.clone()))
            .collect();
        for (path, stamp) in &next.files {
            match self.files.get(path) {
                None => events.push(FileEvent::Created(path.clone())),
                Some(prev) if prev != stamp => events.push(FileEvent::Modified(path.clone())),
                Some(_) => {}
            }
        }
        events
    }
}

/// Scans `root` every `interval` until `stop` is raised, reporting each
/// change to `on_event`. Runs on the calling thread.
pub fn monitor(
    root: &Path,
    interval: Duration,
    stop: &AtomicBool,
    mut on_event: impl FnMut(&FileEvent),
) {
    tracing::info!(folder = %root.display(), "monitoring changes in folder");
    let mut current = Snapshot::scan(root);
    while !stop.load(Ordering::Relaxed) {
        thread::sleep(interval);
        let next = Snapshot::scan(root);
        for event in current.diff(&next) {
            on_event(&event);
        }
        current = next;
    }
    tracing::info!("stopping folder monitoring");
}
