//! The storage driver.

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, Metadata};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::atomic::{self, atomic_write, encode_json, read_json};
use crate::config::DriverOptions;
use crate::error::{Result, StoreError};
use crate::logger::Logger;

/// File extension of resource files.
const RESOURCE_EXT: &str = "json";

/// Embedded document store rooted at a directory.
///
/// Resources are stored as individual JSON files grouped by collection:
/// ```text
/// root/
/// └── {collection}/
///     ├── {resource}.json
///     └── {resource}.json.tmp   (only while a write is in flight)
/// ```
///
/// # Concurrency
///
/// Each collection has its own exclusive lock, created on first use and kept
/// for the life of the driver. [`write`](Self::write) and
/// [`delete`](Self::delete) hold it for the whole call, so they are
/// serialized per collection while different collections proceed in
/// parallel. [`read`](Self::read) and [`read_all`](Self::read_all) take no
/// lock. Atomic renames mean they never see a partial file, but a read racing
/// a write may return either version.
///
/// # Example
///
/// ```no_run
/// use docstore::Driver;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Employee {
///     name: String,
/// }
///
/// let db = Driver::new("/var/lib/docstore")?;
/// db.write("employee", "acme", &Employee { name: "Acme".into() })?;
/// let loaded: Employee = db.read("employee", "acme")?;
/// # Ok::<(), docstore::StoreError>(())
/// ```
pub struct Driver {
    dir: PathBuf,
    /// Collection name to lock. Guarded only for lookup and insert.
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    log: Arc<dyn Logger>,
}

impl Driver {
    /// Opens a store at `dir` with default options, creating the directory
    /// and any missing parents if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(dir, DriverOptions::default())
    }

    /// Opens a store at `dir` with the given options.
    ///
    /// The path is made absolute and lexically cleaned first.
    pub fn with_options(dir: impl AsRef<Path>, options: DriverOptions) -> Result<Self> {
        let dir = clean_path(dir.as_ref())?;
        let log = options.into_logger();

        if dir.is_dir() {
            log.debug(format_args!("directory already exists: {}", dir.display()));
        } else {
            log.debug(format_args!("creating directory: {}", dir.display()));
            atomic::create_dir(&dir, true)?;
        }

        Ok(Self {
            dir,
            locks: Mutex::new(HashMap::new()),
            log,
        })
    }

    /// Returns the root directory of the store.
    pub fn root(&self) -> &Path {
        &self.dir
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        self.dir.join(collection)
    }

    fn resource_path(&self, collection: &str, resource: &str) -> PathBuf {
        self.collection_dir(collection)
            .join(format!("{}.{}", resource, RESOURCE_EXT))
    }

    /// Returns the lock for `collection`, creating it on first request.
    ///
    /// The same name always yields the same lock for the life of the driver.
    /// The registry mutex is released before this returns.
    fn collection_lock(&self, collection: &str) -> Arc<Mutex<()>> {
        // The map is never left half-updated, so a poisoned guard is still valid.
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(lock) = locks.get(collection) {
            return Arc::clone(lock);
        }

        self.log
            .trace(format_args!("creating lock for collection {}", collection));
        let lock = Arc::new(Mutex::new(()));
        locks.insert(collection.to_string(), Arc::clone(&lock));
        lock
    }

    /// Persists `value` as `collection/resource`, replacing any prior content.
    ///
    /// The collection directory is created if missing. The encoded value is
    /// committed atomically: a failed write leaves the previous version intact.
    ///
    /// # Errors
    /// - [`StoreError::InvalidArgument`] if either identifier is empty
    /// - [`StoreError::DirectoryError`] if the collection can't be created
    /// - [`StoreError::EncodeError`] if `value` can't be serialized
    /// - [`StoreError::WriteError`] if the temp write or rename fails
    pub fn write<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        resource: &str,
        value: &T,
    ) -> Result<()> {
        require_collection(collection)?;
        require_resource(resource)?;

        let lock = self.collection_lock(collection);
        let _guard = acquire(&lock);

        atomic::create_dir(&self.collection_dir(collection), false)?;

        let bytes = encode_json(value)?;
        let path = self.resource_path(collection, resource);
        if let Err(e) = atomic_write(&path, &bytes) {
            self.log.error(format_args!(
                "failed to commit {}/{}: {}",
                collection, resource, e
            ));
            return Err(e);
        }

        self.log.debug(format_args!(
            "wrote {}/{} ({} bytes)",
            collection,
            resource,
            bytes.len()
        ));
        Ok(())
    }

    /// Loads `collection/resource` and decodes it into `T`.
    ///
    /// Takes no lock.
    ///
    /// # Errors
    /// - [`StoreError::InvalidArgument`] if either identifier is empty
    /// - [`StoreError::NotFound`] if the resource file doesn't exist
    /// - [`StoreError::ReadError`] if the file can't be read
    /// - [`StoreError::DecodeError`] if the content doesn't decode into `T`
    pub fn read<T: DeserializeOwned>(&self, collection: &str, resource: &str) -> Result<T> {
        require_collection(collection)?;
        require_resource(resource)?;

        let path = self.resource_path(collection, resource);
        match read_json(&path) {
            Err(StoreError::ReadError { source, .. })
                if source.kind() == io::ErrorKind::NotFound =>
            {
                Err(StoreError::not_found(
                    "resource",
                    format!("{}/{}", collection, resource),
                ))
            }
            other => other,
        }
    }

    /// Returns the raw JSON text of every resource in `collection`.
    ///
    /// Entries come back in directory listing order, which is not stable.
    /// An existing collection with no resources yields an empty vector.
    /// Takes no lock.
    ///
    /// # Errors
    /// - [`StoreError::InvalidArgument`] if `collection` is empty
    /// - [`StoreError::NotFound`] if the collection directory doesn't exist
    /// - [`StoreError::ReadError`] on the first entry that can't be read
    pub fn read_all(&self, collection: &str) -> Result<Vec<String>> {
        Ok(self
            .load_collection(collection)?
            .into_iter()
            .map(|(_, data)| data)
            .collect())
    }

    /// Like [`read_all`](Self::read_all), decoding each resource into `T`.
    ///
    /// Fails with [`StoreError::DecodeError`] on the first entry that doesn't
    /// decode.
    pub fn read_all_as<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        self.load_collection(collection)?
            .into_iter()
            .map(|(path, data)| {
                serde_json::from_str(&data).map_err(|source| StoreError::DecodeError { path, source })
            })
            .collect()
    }

    fn load_collection(&self, collection: &str) -> Result<Vec<(PathBuf, String)>> {
        require_collection(collection)?;

        let dir = self.collection_dir(collection);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::not_found("collection", collection));
            }
            Err(source) => return Err(StoreError::ReadError { path: dir, source }),
        };

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::ReadError {
                path: dir.clone(),
                source,
            })?;

            let path = entry.path();
            if !is_resource_file(&path) {
                continue;
            }

            match fs::read_to_string(&path) {
                Ok(data) => records.push((path, data)),
                // Deleted after the listing was taken.
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => return Err(StoreError::ReadError { path, source }),
            }
        }

        Ok(records)
    }

    /// Removes `collection/resource`.
    ///
    /// The literal path `collection/resource` is tried first, then
    /// `collection/resource.json`. If the match is a directory it is removed
    /// recursively. Otherwise `collection/resource.json` is removed; it being
    /// already gone is not an error.
    ///
    /// # Errors
    /// - [`StoreError::InvalidArgument`] if either identifier is empty
    /// - [`StoreError::NotFound`] if neither path exists
    /// - [`StoreError::WriteError`] if removal fails
    pub fn delete(&self, collection: &str, resource: &str) -> Result<()> {
        require_collection(collection)?;
        require_resource(resource)?;

        let lock = self.collection_lock(collection);
        let _guard = acquire(&lock);

        let literal = self.collection_dir(collection).join(resource);
        let (path, meta) = match stat(&literal)? {
            Some(found) => found,
            None => {
                return Err(StoreError::not_found(
                    "resource",
                    format!("{}/{}", collection, resource),
                ))
            }
        };

        // A regular file always resolves to the resource file itself, even
        // when a stray entry with the bare name was found first.
        let target = if meta.is_dir() {
            path
        } else {
            atomic::with_suffix(&literal, ".json")
        };
        remove_all(&target).map_err(|source| StoreError::WriteError {
            path: target.clone(),
            source,
        })?;

        self.log.debug(format_args!("deleted {}", target.display()));
        Ok(())
    }
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver").field("dir", &self.dir).finish_non_exhaustive()
    }
}

/// Locks a collection mutex. It guards no data, so poisoning is ignored.
fn acquire(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

fn require_collection(collection: &str) -> Result<()> {
    if collection.is_empty() {
        return Err(StoreError::InvalidArgument("collection is required"));
    }
    Ok(())
}

fn require_resource(resource: &str) -> Result<()> {
    if resource.is_empty() {
        return Err(StoreError::InvalidArgument("resource is required"));
    }
    Ok(())
}

fn is_resource_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == RESOURCE_EXT)
}

/// Removes `path` and anything below it. A missing path is not an error.
fn remove_all(path: &Path) -> io::Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    let removed = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match removed {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Stats `path`, falling back to `path.json`. `None` if neither exists.
fn stat(path: &Path) -> Result<Option<(PathBuf, Metadata)>> {
    let json = atomic::with_suffix(path, ".json");
    for candidate in [path.to_path_buf(), json] {
        match fs::metadata(&candidate) {
            Ok(meta) => return Ok(Some((candidate, meta))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(source) => {
                return Err(StoreError::ReadError {
                    path: candidate,
                    source,
                })
            }
        }
    }
    Ok(None)
}

/// Makes `path` absolute and removes `.` and `..` components lexically.
fn clean_path(path: &Path) -> Result<PathBuf> {
    let path = if path.as_os_str().is_empty() {
        Path::new(".")
    } else {
        path
    };
    let absolute = std::path::absolute(path).map_err(|source| StoreError::DirectoryError {
        path: path.to_path_buf(),
        source,
    })?;

    let mut cleaned = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    Ok(cleaned)
}
