//! Durable slots for serialized progress.

use std::cell::{Cell, RefCell};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use fs2::FileExt;
use log::debug;

use crate::errors::StorageError;

/// A single named slot holding the serialized progress document.
pub trait ProgressBackend {
    /// Read the slot. `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Replace the slot contents.
    fn save(&mut self, data: &str) -> Result<(), StorageError>;
}

/// Progress slot backed by one JSON file, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressBackend for FileBackend {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(data.trim_start_matches('\0').to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, data: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        write_file_locked(&self.path, data)?;
        debug!("Progress saved to {}", self.path.display());
        Ok(())
    }
}

/// Write `content` to `path` under an exclusive lock via temp file + rename.
fn write_file_locked(path: &Path, content: &str) -> Result<(), StorageError> {
    // Open (or create) the destination to hold the lock for the whole replace
    let lock_file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(path)?;

    lock_file
        .lock_exclusive()
        .map_err(|e| StorageError::Unavailable(format!("lock {}: {}", path.display(), e)))?;

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    let base = path.file_name().and_then(|s| s.to_str()).unwrap_or("progress.json");
    let mut counter = 0u32;
    let tmp_path = loop {
        let candidate = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut tmp) => {
                tmp.write_all(content.as_bytes())?;
                tmp.flush()?;
                let _ = tmp.sync_all();
                break candidate;
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                counter = counter.saturating_add(1);
                continue;
            }
            Err(e) => return Err(e.into()),
        }
    };

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    // Persist the rename (best-effort)
    if let Ok(dir_file) = File::open(dir) {
        let _ = dir_file.sync_all();
    }

    drop(lock_file);
    Ok(())
}

/// In-process slot. Clones share the same slot, so a test can keep a handle
/// after moving one into a store.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slot: Rc<RefCell<Option<String>>>,
    fail_saves: Rc<Cell<bool>>,
    saves: Rc<Cell<usize>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing slot contents.
    pub fn with_contents(data: &str) -> Self {
        let backend = Self::default();
        *backend.slot.borrow_mut() = Some(data.to_string());
        backend
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    /// Make subsequent saves fail (simulates a full or read-only store).
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }
}

impl ProgressBackend for MemoryBackend {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.contents())
    }

    fn save(&mut self, data: &str) -> Result<(), StorageError> {
        if self.fail_saves.get() {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        *self.slot.borrow_mut() = Some(data.to_string());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
