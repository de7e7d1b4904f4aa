//! In-memory object storage for tests.
//!
//! Object ids are opaque sequence numbers, so callers must go through
//! `resolve` exactly like they would against a real bucket service.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{StorageError, StorageResult};
use crate::ports::outbound::{ObjectLocation, ObjectStorage};

#[derive(Default)]
pub struct InMemoryObjectStorage {
    objects: RwLock<BTreeMap<String, (ObjectLocation, Vec<u8>)>>,
    next_id: AtomicU64,
    failing: AtomicBool,
}

impl InMemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object directly and return its id.
    pub fn insert(&self, bucket: &str, name: &str, bytes: impl Into<Vec<u8>>) -> String {
        let id = (self.next_id.fetch_add(1, Ordering::SeqCst) + 1).to_string();
        let location = ObjectLocation {
            bucket: bucket.to_string(),
            name: name.to_string(),
        };
        self.objects
            .write()
            .insert(id.clone(), (location, bytes.into()));
        id
    }

    /// Contents of `bucket/name`, if stored.
    pub fn get(&self, bucket: &str, name: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .values()
            .find(|(loc, _)| loc.bucket == bucket && loc.name == name)
            .map(|(_, bytes)| bytes.clone())
    }

    /// Contents of the object with `id`, if stored.
    pub fn object(&self, id: &str) -> Option<(ObjectLocation, Vec<u8>)> {
        self.objects.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fail every subsequent call with an I/O error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "storage unavailable",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn resolve(&self, object_id: &str) -> StorageResult<ObjectLocation> {
        self.check_available()?;
        self.objects
            .read()
            .get(object_id)
            .map(|(location, _)| location.clone())
            .ok_or_else(|| StorageError::NotFound(object_id.to_string()))
    }

    async fn download(&self, location: &ObjectLocation) -> StorageResult<Vec<u8>> {
        self.check_available()?;
        self.get(&location.bucket, &location.name)
            .ok_or_else(|| StorageError::NotFound(format!("{}/{}", location.bucket, location.name)))
    }

    async fn upload(&self, bucket: &str, name: &str, bytes: Vec<u8>) -> StorageResult<String> {
        self.check_available()?;
        Ok(self.insert(bucket, name, bytes))
    }
}
