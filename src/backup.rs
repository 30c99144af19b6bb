//! Backups of containers written by an older format version.
//!
//! Saving always upgrades to the current version, so before an old file is
//! replaced a copy is kept as `<backup_dir>/<stem>-0x<VERSION>.audt`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AudtError, Result};
use crate::format::VersionTag;

/// File extension of AUDT containers.
pub const EXTENSION: &str = "audt";

/// Path the backup of `source` (stored as `version`) goes to.
pub fn backup_path(source: &Path, version: VersionTag, backup_dir: &Path) -> Result<PathBuf> {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AudtError::invalid(format!("cannot derive a backup name from {}", source.display()))
        })?;
    Ok(backup_dir.join(format!("{stem}-{version}.{EXTENSION}")))
}

/// Copies `source` into `backup_dir`, creating the directory if needed.
///
/// An existing backup with the same name is overwritten.
pub fn backup_file(source: &Path, version: VersionTag, backup_dir: &Path) -> Result<PathBuf> {
    let dest = backup_path(source, version, backup_dir)?;
    fs::create_dir_all(backup_dir)?;
    fs::copy(source, &dest)?;
    log::info!(
        "backed up version {version} file {} to {}",
        source.display(),
        dest.display()
    );
    Ok(dest)
}
