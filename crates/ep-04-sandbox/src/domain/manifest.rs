//! `manifest.json`: where the entry binary lives and which files go in and
//! come out, all relative to the workload root.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SandboxError, SandboxResult};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Output used when a bare executable ships without a manifest.
pub const DEFAULT_OUTPUT: &str = "output/result.txt";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadManifest {
    pub entry: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
}

impl WorkloadManifest {
    pub fn parse(bytes: &[u8]) -> SandboxResult<Self> {
        let manifest: Self = serde_json::from_slice(bytes)
            .map_err(|e| SandboxError::Manifest(format!("{MANIFEST_FILE}: {e}")))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Manifest for an executable shipped on its own.
    pub fn for_bare_entry(entry: impl Into<String>) -> Self {
        Self {
            entry: entry.into(),
            inputs: Vec::new(),
            outputs: vec![DEFAULT_OUTPUT.to_string()],
        }
    }

    /// Every path must be relative and stay inside the workload root.
    pub fn validate(&self) -> SandboxResult<()> {
        if self.entry.trim().is_empty() {
            return Err(SandboxError::Manifest("entry is empty".into()));
        }
        safe_relative_path(&self.entry)?;
        for path in self.inputs.iter().chain(&self.outputs) {
            safe_relative_path(path)?;
        }
        Ok(())
    }
}

/// Normalize `path` into a relative path with only normal components.
///
/// Rejects absolute paths, `..` and empty paths. `.` components are dropped.
pub fn safe_relative_path(path: &str) -> SandboxResult<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(SandboxError::PathEscape(path.to_string()));
            }
        }
    }
    if normalized.as_os_str().is_empty() {
        return Err(SandboxError::PathEscape(path.to_string()));
    }
    Ok(normalized)
}
