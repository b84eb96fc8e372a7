//! In-memory storage adapter.
//!
//! Implements [`StoragePort`] on a shared `HashMap`.  Clones share the same
//! map, so a host (or a test) can keep a handle after giving one to the
//! level store.  Nothing survives the process.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::app::ports::{StorageError, StoragePort};

#[derive(Default)]
struct Inner {
    store: RefCell<HashMap<String, Vec<u8>>>,
    writes: Cell<u64>,
    fail_writes: Cell<bool>,
}

#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Rc<Inner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// Number of successful `write` calls across all clones.
    pub fn write_count(&self) -> u64 {
        self.inner.writes.get()
    }

    /// Make every following write and delete fail with
    /// [`StorageError::IoError`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.set(fail);
    }
}

impl StoragePort for MemoryStorage {
    fn read(&self, namespace: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        self.inner
            .store
            .borrow()
            .get(&Self::composite_key(namespace, key))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.inner.fail_writes.get() {
            return Err(StorageError::IoError);
        }
        self.inner
            .store
            .borrow_mut()
            .insert(Self::composite_key(namespace, key), data.to_vec());
        self.inner.writes.set(self.inner.writes.get() + 1);
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        if self.inner.fail_writes.get() {
            return Err(StorageError::IoError);
        }
        self.inner
            .store
            .borrow_mut()
            .remove(&Self::composite_key(namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.inner
            .store
            .borrow()
            .contains_key(&Self::composite_key(namespace, key))
    }
}
