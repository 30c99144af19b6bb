//! Pluggable compression backend.
//!
//! Only large numeric payloads (note arrays, the quantized transform matrix) go
//! through a [`Compressor`]; scalar fields are written raw. The algorithm's
//! version is recorded in the container header for diagnostics only.

use std::borrow::Cow;
use std::sync::Arc;

use crate::error::{AudtError, Result};

/// Version tag of the LZ4 block stream this crate produces.
pub const LZ4_COMPRESSOR_VERSION: u32 = 1;

/// Upper bound on the LZ4 block expansion ratio, used to reject bogus size prefixes.
const MAX_EXPANSION: usize = 255;

/// Interface for compression algorithms.
///
/// Both directions must be deterministic. `decompress` fails with
/// [`CorruptKind::CorruptPayload`](crate::CorruptKind::CorruptPayload) when the
/// input is not something `compress` could have produced.
pub trait Compressor: Send + Sync + std::fmt::Debug {
    /// Version tag written into the container header.
    fn version(&self) -> u32;

    /// Compresses the data.
    fn compress<'a>(&self, data: &'a [u8]) -> Result<Cow<'a, [u8]>>;

    /// Decompresses the data.
    fn decompress<'a>(&self, data: &'a [u8]) -> Result<Cow<'a, [u8]>>;

    /// Compresses the data and appends it to the output vector.
    ///
    /// The default goes through [`Compressor::compress`]; implementations may
    /// write straight into `output` instead.
    fn compress_append(&self, data: &[u8], output: &mut Vec<u8>) -> Result<()> {
        let compressed = self.compress(data)?;
        output.extend_from_slice(&compressed);
        Ok(())
    }
}

/// LZ4 block compression with the uncompressed size prepended as a
/// little-endian `u32`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz4Compressor;

impl Lz4Compressor {
    fn declared_size(data: &[u8]) -> Result<usize> {
        let Some(prefix) = data.get(..4) else {
            return Err(AudtError::payload(format!(
                "compressed block of {} bytes has no size prefix",
                data.len()
            )));
        };
        let size = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
        let ceiling = (data.len() - 4)
            .saturating_mul(MAX_EXPANSION)
            .saturating_add(16);
        if size > ceiling {
            return Err(AudtError::payload(format!(
                "declared size {size} is impossible for a {} byte block",
                data.len() - 4
            )));
        }
        Ok(size)
    }
}

impl Compressor for Lz4Compressor {
    fn version(&self) -> u32 {
        LZ4_COMPRESSOR_VERSION
    }

    fn compress<'a>(&self, data: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        Ok(Cow::Owned(lz4_flex::compress_prepend_size(data)))
    }

    fn decompress<'a>(&self, data: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        let size = Self::declared_size(data)?;
        let out = lz4_flex::decompress(&data[4..], size)
            .map_err(|e| AudtError::payload(format!("lz4: {e}")))?;
        if out.len() != size {
            return Err(AudtError::payload(format!(
                "lz4 block decoded to {} bytes, header says {size}",
                out.len()
            )));
        }
        Ok(Cow::Owned(out))
    }

    fn compress_append(&self, data: &[u8], output: &mut Vec<u8>) -> Result<()> {
        let uncompressed_len = u32::try_from(data.len())
            .map_err(|_| AudtError::invalid("array too large to compress"))?;
        output.extend_from_slice(&uncompressed_len.to_le_bytes());

        let current_len = output.len();
        let max_size = lz4_flex::block::get_maximum_output_size(data.len());
        output.resize(current_len + max_size, 0);

        match lz4_flex::block::compress_into(data, &mut output[current_len..]) {
            Ok(bytes_written) => {
                output.truncate(current_len + bytes_written);
                Ok(())
            }
            Err(e) => {
                output.truncate(current_len - 4);
                Err(AudtError::Serialization(format!("lz4: {e}")))
            }
        }
    }
}

/// The compressor every writer and reader uses unless told otherwise.
pub fn default_compressor() -> Arc<dyn Compressor> {
    Arc::new(Lz4Compressor)
}

