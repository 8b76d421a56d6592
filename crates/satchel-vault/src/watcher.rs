//! File system watcher feeding vault events to the handler.
//!
//! Uses the `notify` crate for cross-platform file system events
//! (FSEvents on macOS, inotify on Linux, ReadDirectoryChanges on
//! Windows). Rename notifications are delivered once per affected entity:
//! a renamed folder additionally emits one event for every descendant,
//! matching the host contract the engines rely on.

use std::fs;
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use satchel_core::SatchelError;

/// Events emitted by the vault watcher. Paths are vault-relative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEvent {
    /// A file appeared.
    Created { path: String },
    /// A file or folder moved.
    Renamed {
        old_path: String,
        new_path: String,
        is_folder: bool,
    },
}

/// Watches a vault directory and emits [`VaultEvent`]s.
pub struct VaultWatcher {
    _watcher: RecommendedWatcher,
    receiver: mpsc::Receiver<VaultEvent>,
}

impl VaultWatcher {
    /// Start watching a vault directory.
    ///
    /// # Errors
    ///
    /// Returns [`SatchelError::Io`] if the watcher cannot be created.
    pub fn start(vault_root: &Path) -> Result<Self, SatchelError> {
        let (tx, rx) = mpsc::channel();
        let root = vault_root.to_path_buf();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            let Ok(event) = res else { return };
            match event.kind {
                EventKind::Create(_) => {
                    for path in &event.paths {
                        if !path.is_file() {
                            continue;
                        }
                        if let Some(rel) = vault_relative(&root, path) {
                            let _ = tx.send(VaultEvent::Created { path: rel });
                        }
                    }
                }
                EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                    if let [from, to] = event.paths.as_slice() {
                        let (Some(old_rel), Some(new_rel)) =
                            (vault_relative(&root, from), vault_relative(&root, to))
                        else {
                            return;
                        };
                        let is_folder = to.is_dir();
                        let _ = tx.send(VaultEvent::Renamed {
                            old_path: old_rel.clone(),
                            new_path: new_rel.clone(),
                            is_folder,
                        });
                        if is_folder {
                            emit_descendants(&tx, to, &old_rel, &new_rel);
                        }
                    }
                }
                _ => {}
            }
        })
        .map_err(|e| SatchelError::Io(std::io::Error::other(e)))?;

        watcher
            .watch(vault_root, RecursiveMode::Recursive)
            .map_err(|e| SatchelError::Io(std::io::Error::other(e)))?;

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
        })
    }

    /// Receive the next event, waiting up to `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<VaultEvent> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Receive the next event without blocking.
    pub fn try_recv(&self) -> Option<VaultEvent> {
        self.receiver.try_recv().ok()
    }
}

/// Vault-relative form of an absolute path. Hidden top-level entries
/// (`.satchel`, `.git`, ...) are not vault content.
fn vault_relative(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let rel = rel.to_string_lossy().replace('\\', "/");
    if rel.is_empty() {
        return None;
    }
    if rel.split('/').next().is_some_and(|c| c.starts_with('.')) {
        return None;
    }
    Some(rel)
}

/// Emit one rename event per descendant of a renamed folder.
fn emit_descendants(tx: &mpsc::Sender<VaultEvent>, new_abs: &Path, old_rel: &str, new_rel: &str) {
    let Ok(entries) = fs::read_dir(new_abs) else {
        return;
    };
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        let child_old = format!("{old_rel}/{name}");
        let child_new = format!("{new_rel}/{name}");
        let is_folder = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let _ = tx.send(VaultEvent::Renamed {
            old_path: child_old.clone(),
            new_path: child_new.clone(),
            is_folder,
        });
        if is_folder {
            emit_descendants(tx, &entry.path(), &child_old, &child_new);
        }
    }
}
