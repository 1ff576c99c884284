//! Storage backends for advisory documents.
//!
//! A storage root is an implicit key-value store: one file per package,
//! file name derived from the package name. [`DocumentStore`] makes that
//! collection explicit so the index's invariants are testable against an
//! in-memory fake without real file I/O.

use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// An addressable collection of named documents.
///
/// Writes are all-or-nothing: after [`write_atomic`](Self::write_atomic)
/// returns, readers see either the full new contents or the prior
/// contents, never a partial write.
pub trait DocumentStore {
    /// All regular-file names in the store, sorted.
    fn list(&self) -> io::Result<Vec<String>>;

    /// Read a document's full contents.
    fn read(&self, name: &str) -> io::Result<String>;

    /// Replace a document's contents in a single all-or-nothing step.
    fn write_atomic(&self, name: &str, contents: &str) -> io::Result<()>;

    /// Whether a document with this name exists.
    fn exists(&self, name: &str) -> bool;
}

/// Whether a [`DirStore`] enforces the single-writer assumption with an
/// advisory file lock.
///
/// The store's semantics never depend on the lock — it only turns a
/// violated single-writer precondition into an early, explicit error.
/// Read-only consumers should open with `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockMode {
    /// Acquire an exclusive lock on `<root>/.lock` for the lifetime of
    /// the store. A second locking open of the same root fails.
    #[default]
    Flock,
    /// No locking.
    None,
}

/// A storage root on disk: one document file per package, plus an
/// advisory `.lock` file when opened with [`LockMode::Flock`].
#[derive(Debug)]
pub struct DirStore {
    root: PathBuf,
    _lock: Option<fs::File>,
}

impl DirStore {
    /// Open a storage root, creating the directory if needed, and acquire
    /// the writer lock.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::AlreadyExists`] if another process holds
    /// the lock on this root.
    pub fn open(root: impl AsRef<Path>) -> io::Result<Self> {
        Self::open_with_lock(root, LockMode::Flock)
    }

    /// Open a storage root with an explicit [`LockMode`].
    pub fn open_with_lock(root: impl AsRef<Path>, lock_mode: LockMode) -> io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        let lock = match lock_mode {
            LockMode::None => None,
            LockMode::Flock => {
                let lock_path = root.join(".lock");
                let file = fs::OpenOptions::new()
                    .create(true)
                    .truncate(false)
                    .write(true)
                    .open(&lock_path)?;
                file.try_lock_exclusive().map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!(
                            "another process holds the lock on advisory store {}",
                            root.display()
                        ),
                    )
                })?;
                Some(file)
            }
        };

        Ok(DirStore { root, _lock: lock })
    }

    /// The storage root path.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DocumentStore for DirStore {
    fn list(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> io::Result<String> {
        fs::read_to_string(self.root.join(name))
    }

    /// Write to a `.tmp` sibling first, sync, then rename over the target.
    /// If the process crashes mid-write, the old file survives intact.
    fn write_atomic(&self, name: &str, contents: &str) -> io::Result<()> {
        let path = self.root.join(name);
        let tmp_path = self.root.join(format!("{name}.tmp"));

        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(contents.as_bytes())?;
        file.sync_data()?;
        drop(file);

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        self.root.join(name).is_file()
    }
}

/// An in-memory store for tests and doctests.
///
/// Clones share the same underlying map, so a test can keep a handle to
/// inspect what an index persisted.
///
/// # Examples
///
/// ```
/// use secfold::{DocumentStore, MemStore};
///
/// let store = MemStore::new();
/// store.write_atomic("curl.advisories.yaml", "contents").unwrap();
/// let handle = store.clone();
/// assert!(handle.exists("curl.advisories.yaml"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    files: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn files(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentStore for MemStore {
    fn list(&self) -> io::Result<Vec<String>> {
        Ok(self.files().keys().cloned().collect())
    }

    fn read(&self, name: &str) -> io::Result<String> {
        self.files().get(name).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no document {name:?}"))
        })
    }

    fn write_atomic(&self, name: &str, contents: &str) -> io::Result<()> {
        self.files().insert(name.to_string(), contents.to_string());
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        self.files().contains_key(name)
    }
}
