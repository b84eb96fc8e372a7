//! File-backed storage adapter.
//!
//! One file per namespaced key under a data directory
//! (`<dir>/<namespace>/<key>`).  Writes go to a temp file that is renamed
//! over the target, so a reader never sees a half-written value.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{StorageError, StoragePort};

pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Use `root` as the data directory, creating it if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            warn!("FileStorage: cannot create {}: {}", root.display(), e);
            StorageError::IoError
        })?;
        info!("FileStorage: data directory {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, namespace: &str, key: &str) -> PathBuf {
        self.root.join(sanitize(namespace)).join(sanitize(key))
    }
}

/// Keep keys inside their namespace directory.
fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect()
}

/// Sibling of `target` that no sanitized key can name.
fn temp_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push("~tmp");
    target.with_file_name(name)
}

fn map_io(e: &std::io::Error) -> StorageError {
    match e.kind() {
        ErrorKind::NotFound => StorageError::NotFound,
        ErrorKind::StorageFull => StorageError::Full,
        _ => StorageError::IoError,
    }
}

impl StoragePort for FileStorage {
    fn read(&self, namespace: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        fs::read(self.path_for(namespace, key)).map_err(|e| map_io(&e))
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let target = self.path_for(namespace, key);
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir).map_err(|e| map_io(&e))?;
        }
        let tmp = temp_path(&target);
        fs::write(&tmp, data).map_err(|e| {
            warn!("FileStorage: write {} failed: {}", tmp.display(), e);
            map_io(&e)
        })?;
        fs::rename(&tmp, &target).map_err(|e| {
            warn!("FileStorage: rename to {} failed: {}", target.display(), e);
            map_io(&e)
        })
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(namespace, key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(map_io(&e)),
        }
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.path_for(namespace, key).is_file()
    }
}
