//! # Outbound Ports (Driven Ports)

use async_trait::async_trait;

pub use ep_01_task_store::{TaskStore, TimeSource};
pub use ep_04_sandbox::SandboxLauncher;

use crate::error::StorageResult;

/// Bucket and object name behind an object id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectLocation {
    pub bucket: String,
    pub name: String,
}

/// Blob storage holding workloads, inputs, results and logs.
///
/// Production: `FsObjectStorage`
/// Testing: `InMemoryObjectStorage`
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn resolve(&self, object_id: &str) -> StorageResult<ObjectLocation>;

    async fn download(&self, location: &ObjectLocation) -> StorageResult<Vec<u8>>;

    /// Store `bytes` and return the new object's id.
    async fn upload(&self, bucket: &str, name: &str, bytes: Vec<u8>) -> StorageResult<String>;
}
