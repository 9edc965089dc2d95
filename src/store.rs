//! Reading and writing settings text.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::EditorFontError;

/// Somewhere settings text can be read from and written to
pub trait FileStore {
    /// Whether a file exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Read the whole file as UTF-8
    fn read(&self, path: &Path) -> Result<String, EditorFontError>;

    /// Replace the whole file
    fn write(&self, path: &Path, text: &str) -> Result<(), EditorFontError>;
}

/// The real filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStore;

impl FsStore {
    /// Write to a sibling temp file, then rename it over the target so the
    /// file is either fully written or not modified at all.
    ///
    /// A symlinked settings file is written through: the temp file goes next
    /// to the file the link points at, and the link itself is left alone.
    /// The existing file's permissions carry over to the new one.
    fn atomic_write(path: &Path, text: &str) -> std::io::Result<()> {
        let target = match std::fs::canonicalize(path) {
            Ok(target) => target,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => path.to_path_buf(),
            Err(e) => return Err(e),
        };
        let permissions = std::fs::metadata(&target).ok().map(|m| m.permissions());
        let temp_path = target.with_extension(format!("{}.tmp", std::process::id()));
        if let Err(e) = std::fs::write(&temp_path, text) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e);
        }
        if let Some(permissions) = permissions {
            if let Err(e) = std::fs::set_permissions(&temp_path, permissions) {
                let _ = std::fs::remove_file(&temp_path);
                return Err(e);
            }
        }
        if let Err(e) = std::fs::rename(&temp_path, &target) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e);
        }
        Ok(())
    }
}

impl FileStore for FsStore {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> Result<String, EditorFontError> {
        std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EditorFontError::MissingFile {
                    path: path.to_path_buf(),
                }
            } else {
                e.into()
            }
        })
    }

    fn write(&self, path: &Path, text: &str) -> Result<(), EditorFontError> {
        log::debug!("Writing {}", path.display());
        Ok(Self::atomic_write(path, text)?)
    }
}

/// An in-memory store, for tests and for stubbing out the filesystem
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<HashMap<PathBuf, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding a single file
    pub fn with_file(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let store = Self::new();
        store.insert(path, text);
        store
    }

    /// Add or replace a file
    pub fn insert(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.lock().insert(path.into(), text.into());
    }

    /// The current contents of a file, if present
    pub fn get(&self, path: &Path) -> Option<String> {
        self.lock().get(path).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, String>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.files
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FileStore for MemoryStore {
    fn exists(&self, path: &Path) -> bool {
        self.lock().contains_key(path)
    }

    fn read(&self, path: &Path) -> Result<String, EditorFontError> {
        self.get(path).ok_or_else(|| EditorFontError::MissingFile {
            path: path.to_path_buf(),
        })
    }

    fn write(&self, path: &Path, text: &str) -> Result<(), EditorFontError> {
        self.insert(path, text);
        Ok(())
    }
}
