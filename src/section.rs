//! Section framing: `[id u32] [payload] [delimiter]`.
//!
//! The payload length is never stored; it is implied by the record layout. The
//! id is checked before the payload and the delimiter after it, which catches
//! both out-of-order reads and decoders that consume the wrong number of bytes.

use crate::codec::{ByteCursor, ByteWriter};
use crate::error::{AudtError, CorruptKind, Result};
use crate::format::{SECTION_DELIMITER, SectionId};

/// Writes `id`, runs `payload` against the same buffer, then appends the delimiter.
pub fn write_section<F>(out: &mut ByteWriter, id: SectionId, payload: F) -> Result<()>
where
    F: FnOnce(&mut ByteWriter) -> Result<()>,
{
    out.write_u32(id.as_u32())?;
    payload(out)?;
    out.write_raw(&SECTION_DELIMITER);
    Ok(())
}

/// Reads a section framed by [`write_section`].
///
/// # Errors
/// [`CorruptKind::SectionIdMismatch`] when the id differs from `expected`,
/// [`CorruptKind::MissingEndOfSectionDelimiter`] when `payload` did not stop
/// exactly on the delimiter, and whatever `payload` itself returns.
pub fn read_section<T, F>(cursor: &mut ByteCursor<'_>, expected: SectionId, payload: F) -> Result<T>
where
    F: FnOnce(&mut ByteCursor<'_>) -> Result<T>,
{
    let actual = cursor.read_u32()?;
    if actual != expected.as_u32() {
        log::warn!(
            "section id mismatch at offset {}: expected {expected}, found {actual}",
            cursor.position() - 4
        );
        return Err(AudtError::Corrupt(CorruptKind::SectionIdMismatch {
            expected,
            actual,
        }));
    }

    let value = payload(cursor)?;

    let delimiter_ok = cursor
        .take(SECTION_DELIMITER.len())
        .map(|bytes| bytes == SECTION_DELIMITER)
        .unwrap_or(false);
    if !delimiter_ok {
        log::warn!("{expected} is not followed by a section delimiter");
        return Err(AudtError::Corrupt(
            CorruptKind::MissingEndOfSectionDelimiter { section: expected },
        ));
    }
    Ok(value)
}
