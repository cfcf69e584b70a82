//! Change notifications for the configuration file.
//!
//! The watcher only reports that the file changed. Parsing and validation
//! happen once, in `FileConfigProvider::reload`, when the orchestrator
//! reloads.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// Receiver side of a running watch. Drop the `_handle` to stop watching.
pub struct ConfigWatch {
    _handle: RecommendedWatcher,
    changes: mpsc::UnboundedReceiver<()>,
}

impl ConfigWatch {
    /// Wait for the next change, folding any burst of events already queued
    /// into it. `None` once the watcher is gone.
    pub async fn changed(&mut self) -> Option<()> {
        self.changes.recv().await?;
        while self.changes.try_recv().is_ok() {}
        Some(())
    }
}

/// Start watching `path` for edits.
///
/// The parent directory is watched rather than the file itself, so editors
/// that save by writing a temp file and renaming it over the original are
/// still seen.
pub fn watch(path: &Path) -> notify::Result<ConfigWatch> {
    let file_name = path
        .file_name()
        .map(OsString::from)
        .ok_or_else(|| notify::Error::generic("config path has no file name"))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let (tx, changes) = mpsc::unbounded_channel();
    let mut handle = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) if touches(&event, &file_name) => {
                tracing::debug!(kind = ?event.kind, "Config file change detected");
                let _ = tx.send(());
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "Config watch error"),
        },
        notify::Config::default(),
    )?;
    handle.watch(&dir, RecursiveMode::NonRecursive)?;

    tracing::info!(path = %path.display(), "Config watcher started");
    Ok(ConfigWatch {
        _handle: handle,
        changes,
    })
}

fn touches(event: &Event, file_name: &OsString) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
}
