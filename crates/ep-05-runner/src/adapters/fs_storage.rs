//! Directory-backed object storage.
//!
//! An object id is `<bucket>/<name>`, stored at `<root>/<bucket>/<name>`.
//! Suitable for a shared volume or a locally mounted bucket.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ep_04_sandbox::domain::safe_relative_path;

use crate::error::{StorageError, StorageResult};
use crate::ports::outbound::{ObjectLocation, ObjectStorage};

#[derive(Debug, Clone)]
pub struct FsObjectStorage {
    root: PathBuf,
}

impl FsObjectStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, bucket: &str, name: &str) -> StorageResult<PathBuf> {
        let id = format!("{bucket}/{name}");
        let bucket = safe_relative_path(bucket)
            .map_err(|_| StorageError::InvalidObjectId(id.clone()))?;
        if bucket.components().count() != 1 {
            return Err(StorageError::InvalidObjectId(id));
        }
        let name = safe_relative_path(name).map_err(|_| StorageError::InvalidObjectId(id))?;
        Ok(self.root.join(bucket).join(name))
    }
}

#[async_trait]
impl ObjectStorage for FsObjectStorage {
    async fn resolve(&self, object_id: &str) -> StorageResult<ObjectLocation> {
        let Some((bucket, name)) = object_id.split_once('/') else {
            return Err(StorageError::InvalidObjectId(object_id.to_string()));
        };
        let path = self.path_of(bucket, name)?;
        if !tokio::fs::try_exists(&path).await? {
            return Err(StorageError::NotFound(object_id.to_string()));
        }
        Ok(ObjectLocation {
            bucket: bucket.to_string(),
            name: name.to_string(),
        })
    }

    async fn download(&self, location: &ObjectLocation) -> StorageResult<Vec<u8>> {
        let path = self.path_of(&location.bucket, &location.name)?;
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                StorageError::NotFound(format!("{}/{}", location.bucket, location.name))
            }
            _ => StorageError::Io(e),
        })
    }

    async fn upload(&self, bucket: &str, name: &str, bytes: Vec<u8>) -> StorageResult<String> {
        let path = self.path_of(bucket, name)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(format!("{bucket}/{name}"))
    }
}
