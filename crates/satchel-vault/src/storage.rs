//! Storage adapter contract and implementations.
//!
//! Engines see the vault through this trait only: existence checks,
//! folder creation, listing, and move/rename over vault-relative paths.
//! [`LocalStorage`] maps those paths onto a root directory;
//! [`MemoryStorage`] keeps them in memory for deterministic tests.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use satchel_core::{vpath, SatchelError};

/// Errors surfaced by a storage adapter.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("path not found: {path}")]
    NotFound { path: String },

    #[error("destination already exists: {path}")]
    AlreadyExists { path: String },

    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<StorageError> for SatchelError {
    fn from(err: StorageError) -> Self {
        SatchelError::Vault(err.to_string())
    }
}

/// Result of listing a folder: full vault paths, split by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub files: Vec<String>,
    pub folders: Vec<String>,
}

/// Vault storage operations consumed by the engines.
pub trait Storage {
    /// Whether a file or folder exists at the path.
    fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Create a folder, including missing parents.
    fn mkdir(&self, path: &str) -> Result<(), StorageError>;

    /// List the direct children of a folder.
    fn list(&self, path: &str) -> Result<Listing, StorageError>;

    /// Move or rename a file or folder. Fails when the source is missing
    /// or the destination is occupied.
    fn rename(&self, from: &str, to: &str) -> Result<(), StorageError>;
}

/// Storage over a real directory tree.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a vault path.
    #[must_use]
    pub fn resolve(&self, path: &str) -> PathBuf {
        let rel = path.trim_start_matches('/');
        if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(rel)
        }
    }

    fn io(path: &str, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.to_string(),
            source,
        }
    }
}

impl Storage for LocalStorage {
    fn exists(&self, path: &str) -> Result<bool, StorageError> {
        Ok(self.resolve(path).exists())
    }

    fn mkdir(&self, path: &str) -> Result<(), StorageError> {
        fs::create_dir_all(self.resolve(path)).map_err(|e| Self::io(path, e))
    }

    fn list(&self, path: &str) -> Result<Listing, StorageError> {
        let dir = self.resolve(path);
        let mut listing = Listing::default();
        let entries = fs::read_dir(&dir).map_err(|e| Self::io(path, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| Self::io(path, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let child = vpath::join(vpath::normalize(path).as_str(), &name);
            let file_type = entry.file_type().map_err(|e| Self::io(&child, e))?;
            if file_type.is_dir() {
                listing.folders.push(child);
            } else {
                listing.files.push(child);
            }
        }
        listing.files.sort();
        listing.folders.sort();
        Ok(listing)
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), StorageError> {
        let src = self.resolve(from);
        let dst = self.resolve(to);
        if !src.exists() {
            return Err(StorageError::NotFound {
                path: from.to_string(),
            });
        }
        if dst.exists() {
            return Err(StorageError::AlreadyExists {
                path: to.to_string(),
            });
        }
        fs::rename(&src, &dst).map_err(|e| Self::io(to, e))
    }
}

/// In-memory storage for tests: a set of file paths and folder paths.
/// Folder renames move every descendant, matching real storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RefCell<BTreeSet<String>>,
    folders: RefCell<BTreeSet<String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file, creating its ancestor folders.
    pub fn add_file(&self, path: &str) {
        self.add_ancestors(path);
        self.files.borrow_mut().insert(path.to_string());
    }

    /// Register a folder, creating its ancestors.
    pub fn add_folder(&self, path: &str) {
        self.add_ancestors(path);
        self.folders.borrow_mut().insert(path.to_string());
    }

    #[must_use]
    pub fn has_file(&self, path: &str) -> bool {
        self.files.borrow().contains(path)
    }

    #[must_use]
    pub fn has_folder(&self, path: &str) -> bool {
        self.folders.borrow().contains(path)
    }

    /// Snapshot of all file paths.
    #[must_use]
    pub fn file_paths(&self) -> Vec<String> {
        self.files.borrow().iter().cloned().collect()
    }

    fn add_ancestors(&self, path: &str) {
        let mut folders = self.folders.borrow_mut();
        let mut current = vpath::parent(path);
        while !current.is_empty() {
            folders.insert(current.to_string());
            current = vpath::parent(current);
        }
    }

    fn is_root(path: &str) -> bool {
        path.is_empty() || path == "/"
    }
}

impl Storage for MemoryStorage {
    fn exists(&self, path: &str) -> Result<bool, StorageError> {
        if Self::is_root(path) {
            return Ok(true);
        }
        Ok(self.files.borrow().contains(path) || self.folders.borrow().contains(path))
    }

    fn mkdir(&self, path: &str) -> Result<(), StorageError> {
        if !Self::is_root(path) {
            self.add_folder(path);
        }
        Ok(())
    }

    fn list(&self, path: &str) -> Result<Listing, StorageError> {
        if !Self::is_root(path) && !self.folders.borrow().contains(path) {
            return Err(StorageError::NotFound {
                path: path.to_string(),
            });
        }
        let parent_of = |p: &str| {
            if Self::is_root(path) {
                vpath::parent(p).is_empty()
            } else {
                vpath::parent(p) == path
            }
        };
        Ok(Listing {
            files: self
                .files
                .borrow()
                .iter()
                .filter(|p| parent_of(p))
                .cloned()
                .collect(),
            folders: self
                .folders
                .borrow()
                .iter()
                .filter(|p| parent_of(p))
                .cloned()
                .collect(),
        })
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), StorageError> {
        if self.exists(to)? {
            return Err(StorageError::AlreadyExists {
                path: to.to_string(),
            });
        }
        if self.files.borrow().contains(from) {
            self.files.borrow_mut().remove(from);
            self.files.borrow_mut().insert(to.to_string());
            return Ok(());
        }
        if self.folders.borrow().contains(from) {
            let moved_files: Vec<String> = self
                .files
                .borrow()
                .iter()
                .filter(|p| vpath::is_inside(p, from))
                .cloned()
                .collect();
            let moved_folders: Vec<String> = self
                .folders
                .borrow()
                .iter()
                .filter(|p| *p == from || vpath::is_inside(p, from))
                .cloned()
                .collect();
            for path in moved_files {
                self.files.borrow_mut().remove(&path);
                self.files
                    .borrow_mut()
                    .insert(format!("{to}{}", &path[from.len()..]));
            }
            for path in moved_folders {
                self.folders.borrow_mut().remove(&path);
                let tail = &path[from.len()..];
                self.folders.borrow_mut().insert(format!("{to}{tail}"));
            }
            return Ok(());
        }
        Err(StorageError::NotFound {
            path: from.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.mkdir("Notes/assets").unwrap();
        assert!(storage.exists("Notes/assets").unwrap());

        fs::write(dir.path().join("Notes/assets/a.png"), b"x").unwrap();
        fs::write(dir.path().join("Notes/assets/b.png"), b"y").unwrap();

        let listing = storage.list("Notes/assets").unwrap();
        assert_eq!(
            listing.files,
            vec!["Notes/assets/a.png".to_string(), "Notes/assets/b.png".to_string()]
        );
        assert!(listing.folders.is_empty());

        storage.rename("Notes/assets/a.png", "Notes/assets/c.png").unwrap();
        assert!(storage.exists("Notes/assets/c.png").unwrap());
        assert!(!storage.exists("Notes/assets/a.png").unwrap());
    }

    #[test]
    fn local_rename_rejects_missing_source_and_occupied_destination() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage.mkdir("a").unwrap();
        fs::write(dir.path().join("a/x.png"), b"x").unwrap();
        fs::write(dir.path().join("a/y.png"), b"y").unwrap();

        assert!(matches!(
            storage.rename("a/missing.png", "a/z.png"),
            Err(StorageError::NotFound { .. })
        ));
        assert!(matches!(
            storage.rename("a/x.png", "a/y.png"),
            Err(StorageError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn local_storage_resolves_vault_root_spellings() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        assert!(storage.exists("").unwrap());
        assert!(storage.exists("/").unwrap());
    }

    #[test]
    fn memory_storage_folder_rename_moves_descendants() {
        let storage = MemoryStorage::new();
        storage.add_file("Notes/assets/Intro/a.png");
        storage.add_file("Notes/assets/Intro/b.png");
        storage.add_file("Notes/other.png");

        storage.rename("Notes/assets/Intro", "Notes/assets/Overview").unwrap();
        assert!(storage.has_file("Notes/assets/Overview/a.png"));
        assert!(storage.has_file("Notes/assets/Overview/b.png"));
        assert!(storage.has_file("Notes/other.png"));
        assert!(!storage.has_folder("Notes/assets/Intro"));
    }

    #[test]
    fn memory_storage_rename_conflicts_and_missing_sources_error() {
        let storage = MemoryStorage::new();
        storage.add_file("a/x.png");
        storage.add_file("a/y.png");

        assert!(matches!(
            storage.rename("a/x.png", "a/y.png"),
            Err(StorageError::AlreadyExists { .. })
        ));
        assert!(matches!(
            storage.rename("a/gone.png", "a/z.png"),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn memory_storage_lists_only_direct_children() {
        let storage = MemoryStorage::new();
        storage.add_file("a/x.png");
        storage.add_file("a/sub/deep.png");

        let listing = storage.list("a").unwrap();
        assert_eq!(listing.files, vec!["a/x.png".to_string()]);
        assert_eq!(listing.folders, vec!["a/sub".to_string()]);
    }
}
