//! Atomic file operations for crash-safe persistence.
//!
//! A record is first written in full to a sibling `<name>.tmp` file, synced,
//! and then renamed over the final path. Rename replaces the target in one
//! filesystem operation, so a reader sees either the previous file or the new
//! one, never a partial write.

use std::ffi::OsString;
use std::fs::{self, DirBuilder, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::{Result, StoreError};

/// Permission bits for directories created by the store.
pub const DIR_MODE: u32 = 0o755;

/// Permission bits for resource files.
pub const FILE_MODE: u32 = 0o644;

/// Suffix appended to a resource file name while it is being written.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Returns the temporary sibling used while writing `path`.
///
/// `employee/acme.json` becomes `employee/acme.json.tmp`.
pub fn temp_path(path: &Path) -> PathBuf {
    with_suffix(path, TEMP_SUFFIX)
}

/// Appends `suffix` to the last component of `path` as-is.
///
/// Unlike [`Path::with_extension`] nothing is replaced, so dots already in
/// the name survive.
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Encodes a value as tab-indented JSON with a trailing newline.
pub fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"\t");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser).map_err(StoreError::EncodeError)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Writes data to a file atomically.
///
/// The parent directory must already exist. If writing or renaming the
/// temporary file fails it is removed and the target is left untouched.
///
/// # Errors
/// Returns [`StoreError::WriteError`] if the write or rename fails.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let tmp = temp_path(path);

    if let Err(source) = write_synced(&tmp, data) {
        let _ = fs::remove_file(&tmp);
        return Err(StoreError::WriteError { path: tmp, source });
    }

    if let Err(source) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(StoreError::WriteError {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = open_for_write(path)?;
    file.write_all(data)?;
    file.flush()?;
    file.sync_all()
}

#[cfg(unix)]
fn open_for_write(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(FILE_MODE)
        .open(path)
}

#[cfg(not(unix))]
fn open_for_write(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

/// Reads and deserializes JSON from a file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read(path).map_err(|source| StoreError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&data).map_err(|source| StoreError::DecodeError {
        path: path.to_path_buf(),
        source,
    })
}

/// Creates a directory with [`DIR_MODE`].
///
/// With `recursive` set, missing parents are created too. Without it, a
/// missing parent is an error. An existing directory is never an error; an
/// existing non-directory at `path` is.
pub fn create_dir(path: &Path, recursive: bool) -> Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(recursive);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }

    match builder.create(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(source) => Err(StoreError::DirectoryError {
            path: path.to_path_buf(),
            source,
        }),
    }
}
