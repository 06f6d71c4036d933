//! Output path resolution and plaintext writing.
//!
//! The one promise made here: an existing file is never overwritten. The
//! path is resolved to a free name first, and the write itself uses
//! `create_new` so even a race with another process cannot clobber data.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::VaultError;

/// Picks the path the plaintext will be written to.
///
/// With no requested path the name is derived from the input by stripping
/// its final extension (`photo.jpg.bc` → `photo.jpg`). If the candidate
/// already exists, ` (n)` is inserted before its extension, counting up
/// until a free name is found.
pub fn resolve_output_path(
    encrypted_path: &Path,
    requested: Option<&Path>,
) -> Result<PathBuf, VaultError> {
    let candidate = match requested {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => derive_from_input(encrypted_path)?,
    };

    if !candidate.exists() {
        return Ok(candidate);
    }

    for n in 1..=u32::MAX {
        let numbered = numbered_path(&candidate, n);
        if !numbered.exists() {
            return Ok(numbered);
        }
    }

    Err(VaultError::InvalidParameters(
        "could not find a usable output filepath",
    ))
}

fn derive_from_input(encrypted_path: &Path) -> Result<PathBuf, VaultError> {
    match encrypted_path.file_stem() {
        Some(stem) => Ok(encrypted_path.with_file_name(stem)),
        None => Err(VaultError::InvalidParameters(
            "could not derive an output filepath from the input",
        )),
    }
}

fn numbered_path(path: &Path, n: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    match path.extension() {
        Some(ext) => path.with_file_name(format!("{stem} ({n}).{}", ext.to_string_lossy())),
        None => path.with_file_name(format!("{stem} ({n})")),
    }
}

/// Writes the plaintext and syncs it to disk.
pub fn write_output(path: &Path, data: &[u8]) -> Result<(), VaultError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;

    file.write_all(data)?;
    file.sync_all()?;

    // persist the new directory entry as well
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            File::open(parent)?.sync_all()?;
        }
    }

    Ok(())
}
