//! Zip handling for workload and input packages.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{SandboxError, SandboxResult};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// True when an object should be unpacked rather than staged as a file.
pub fn is_archive(name: &str, bytes: &[u8]) -> bool {
    name.to_ascii_lowercase().ends_with(".zip") || bytes.starts_with(ZIP_MAGIC)
}

/// Unpack `bytes` into `dst`. Returns the files written, relative to `dst`.
///
/// Entries whose names would leave `dst` abort the whole unpack.
pub fn unpack_zip(bytes: &[u8], dst: &Path) -> SandboxResult<Vec<PathBuf>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut written = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(SandboxError::PathEscape(entry.name().to_string()));
        };
        let target = dst.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = fs::File::create(&target)?;
        std::io::copy(&mut entry, &mut out)?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&target, fs::Permissions::from_mode(mode & 0o777))?;
        }

        debug!("[ep-04] Unpacked {}", relative.display());
        written.push(relative);
    }
    Ok(written)
}

/// Pack `(name, contents)` pairs into an in-memory zip archive.
pub fn pack_zip(files: &[(&str, &[u8])]) -> SandboxResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    for (name, contents) in files {
        writer.start_file(*name, options)?;
        writer.write_all(contents)?;
    }
    Ok(writer.finish()?.into_inner())
}
