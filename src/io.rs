//! Low-level I/O: the single atomic flush of a finished container.
//!
//! The buffer is written to a temporary file next to the destination and then
//! renamed over it, so a crash mid-write never leaves a half-written container
//! in place of a good one.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::Result;

/// Replaces `path` with `bytes` in one rename.
///
/// With `sync` set, the data is flushed to stable storage before the rename.
pub fn write_atomically(path: &Path, bytes: &[u8], sync: bool) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    if sync {
        tmp.as_file().sync_all()?;
    }
    tmp.persist(path).map_err(|e| e.error)?;

    log::debug!("flushed {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
