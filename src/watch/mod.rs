//! Model file hot-reload
//!
//! Watches the loaded model file for changes and signals when it should be
//! reloaded, so edits saved from a modeling tool show up without restarting
//! the viewer.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::time::{Duration, Instant};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

/// Watches the loaded model file and signals when it changes
pub struct ModelWatcher {
    /// The file watcher (kept alive to maintain watch)
    _watcher: RecommendedWatcher,
    /// Receiver for file change events
    receiver: Receiver<Result<Event, notify::Error>>,
    /// The watched model file
    path: PathBuf,
    /// Last time we detected a change (for debouncing)
    last_change: Option<Instant>,
    /// Debounce duration (ignore rapid successive changes)
    debounce_duration: Duration,
}

impl ModelWatcher {
    /// Create a watcher for the given model file.
    ///
    /// The parent directory is watched rather than the file itself so that
    /// editors which replace the file on save are still caught.
    pub fn new(model_path: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;

        let watch_dir = match model_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;
        tracing::info!("Model hot-reload enabled, watching: {}", model_path.display());

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            path: model_path.to_path_buf(),
            last_change: None,
            debounce_duration: Duration::from_millis(250),
        })
    }

    /// The watched model file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Poll for model changes.
    ///
    /// Returns true once per (debounced) change to the watched file.
    pub fn poll(&mut self) -> bool {
        // Drain all pending events
        loop {
            match self.receiver.try_recv() {
                Ok(Ok(event)) => {
                    if event.paths.iter().any(|p| p == &self.path) {
                        self.last_change = Some(Instant::now());
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!("Model watcher error: {:?}", e);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::error!("Model watcher channel disconnected");
                    break;
                }
            }
        }

        // Report the change once the file has been quiet for the debounce
        // window, so half-written saves are not loaded
        if let Some(last) = self.last_change {
            if last.elapsed() >= self.debounce_duration {
                self.last_change = None;
                tracing::info!("Model changed: {}", self.path.display());
                return true;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watcher_for_missing_parent_uses_cwd() {
        // A bare filename has no parent component; the watcher should still
        // construct by falling back to the current directory
        let watcher = ModelWatcher::new(Path::new("standalone.obj"));
        assert!(watcher.is_ok());
    }

    #[test]
    fn test_poll_without_changes() {
        let dir = std::env::temp_dir();
        let mut watcher = ModelWatcher::new(&dir.join("never_written.obj")).unwrap();
        assert!(!watcher.poll());
    }
}
