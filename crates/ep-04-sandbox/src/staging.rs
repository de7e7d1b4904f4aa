//! Workload staging on the host filesystem.
//!
//! ```text
//! <staging>/                    executable unpacked (or written) here
//! <staging>/<pkg>/manifest.json optional single top-level directory
//!          ├── entry
//!          ├── input/...        inputs: archives unpacked, files placed
//!          └── output/          parents of declared outputs pre-created
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::archive::{is_archive, unpack_zip};
use crate::domain::{safe_relative_path, WorkloadManifest, MANIFEST_FILE};
use crate::error::{SandboxError, SandboxResult};
use crate::ports::LaunchRequest;

/// A downloaded object ready to be staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedObject {
    /// Object name in storage; only its last segment is used on disk.
    pub name: String,
    pub bytes: Vec<u8>,
}

impl StagedObject {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    fn file_name(&self) -> SandboxResult<PathBuf> {
        let last = self.name.rsplit('/').next().unwrap_or_default();
        safe_relative_path(last)
    }
}

/// A staged workload with every path resolved on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedWorkload {
    pub root: PathBuf,
    pub manifest: WorkloadManifest,
    pub entry: PathBuf,
    pub inputs: Vec<PathBuf>,
    pub outputs: Vec<PathBuf>,
}

impl PreparedWorkload {
    pub fn launch_request(&self, resource_limit: u64) -> LaunchRequest {
        LaunchRequest {
            resource_limit,
            work_dir: self.root.clone(),
            entry: self.entry.clone(),
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
        }
    }
}

/// Stage `executable` and `inputs` under `staging_dir`.
///
/// `staging_dir` is created if needed and should be empty.
pub fn stage_workload(
    staging_dir: &Path,
    executable: &StagedObject,
    inputs: &[StagedObject],
) -> SandboxResult<PreparedWorkload> {
    fs::create_dir_all(staging_dir)?;

    let (root, mut manifest, bare) = if is_archive(&executable.name, &executable.bytes) {
        unpack_zip(&executable.bytes, staging_dir)?;
        let root = locate_manifest(staging_dir)?.ok_or_else(|| {
            SandboxError::Manifest(format!("{MANIFEST_FILE} not found in {}", executable.name))
        })?;
        let manifest = WorkloadManifest::parse(&fs::read(root.join(MANIFEST_FILE))?)?;
        (root, manifest, false)
    } else {
        let entry = executable.file_name()?;
        write_file(&staging_dir.join(&entry), &executable.bytes)?;
        make_executable(&staging_dir.join(&entry))?;
        let manifest = WorkloadManifest::for_bare_entry(entry.to_string_lossy());
        (staging_dir.to_path_buf(), manifest, true)
    };

    for (index, input) in inputs.iter().enumerate() {
        if is_archive(&input.name, &input.bytes) {
            let unpacked = unpack_zip(&input.bytes, &root)?;
            // A bare entry has no manifest naming its inputs; pass every unpacked file.
            if bare {
                manifest.inputs.extend(
                    unpacked
                        .iter()
                        .map(|relative| relative.to_string_lossy().into_owned()),
                );
            }
            debug!("[ep-04] Unpacked input {} ({} files)", input.name, unpacked.len());
            continue;
        }
        let relative = match manifest.inputs.get(index).filter(|_| !bare) {
            Some(declared) => safe_relative_path(declared)?,
            None => Path::new("input").join(input.file_name()?),
        };
        write_file(&root.join(&relative), &input.bytes)?;
        if bare {
            manifest.inputs.push(relative.to_string_lossy().into_owned());
        }
        debug!("[ep-04] Staged input {} at {}", input.name, relative.display());
    }

    let entry = root.join(safe_relative_path(&manifest.entry)?);
    if !entry.is_file() {
        return Err(SandboxError::Manifest(format!(
            "entry {} missing from workload",
            manifest.entry
        )));
    }

    let mut resolved_inputs = Vec::with_capacity(manifest.inputs.len());
    for declared in &manifest.inputs {
        let path = root.join(safe_relative_path(declared)?);
        if !path.exists() {
            return Err(SandboxError::Manifest(format!(
                "declared input {declared} missing after staging"
            )));
        }
        resolved_inputs.push(path);
    }

    let mut resolved_outputs = Vec::with_capacity(manifest.outputs.len());
    for declared in &manifest.outputs {
        let path = root.join(safe_relative_path(declared)?);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        resolved_outputs.push(path);
    }

    Ok(PreparedWorkload {
        root,
        manifest,
        entry,
        inputs: resolved_inputs,
        outputs: resolved_outputs,
    })
}

/// Directory holding `manifest.json`: `dir` itself or its only subdirectory
/// that has one.
pub fn locate_manifest(dir: &Path) -> SandboxResult<Option<PathBuf>> {
    if dir.join(MANIFEST_FILE).is_file() {
        return Ok(Some(dir.to_path_buf()));
    }

    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() && path.join(MANIFEST_FILE).is_file() {
            candidates.push(path);
        }
    }
    match candidates.len() {
        0 => Ok(None),
        1 => Ok(candidates.pop()),
        n => Err(SandboxError::Manifest(format!(
            "{n} candidate {MANIFEST_FILE} files in {}",
            dir.display()
        ))),
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> SandboxResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> SandboxResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> SandboxResult<()> {
    Ok(())
}
