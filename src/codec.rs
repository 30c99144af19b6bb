//! Primitive codec: scalars, length-prefixed text and bytes, and compressed
//! numeric arrays.
//!
//! [`ByteWriter`] is an append-only buffer owned by whoever is encoding.
//! [`ByteCursor`] walks a borrowed buffer; every advance is bounds-checked and
//! fails with [`CorruptKind::Truncated`] instead of reading past its end.
//!
//! Fixed-width scalars are encoded with `bincode` in big-endian, fixed-int mode,
//! so an `i32` is always exactly four bytes on disk.

use std::sync::Arc;

use bincode::config::{self, Config};
use bincode::{Decode, Encode};

use crate::compression::{Compressor, default_compressor};
use crate::error::{AudtError, CorruptKind, Result};

fn wire_config() -> impl Config {
    config::standard()
        .with_big_endian()
        .with_fixed_int_encoding()
}

fn encode_scalar<T: Encode>(value: T, out: &mut Vec<u8>) -> Result<()> {
    bincode::encode_into_std_write(value, out, wire_config())
        .map(|_| ())
        .map_err(|e| AudtError::Serialization(e.to_string()))
}

fn decode_scalar<T: Decode<()>>(bytes: &[u8]) -> Result<T> {
    bincode::decode_from_slice::<T, _>(bytes, wire_config())
        .map(|(value, _)| value)
        .map_err(|e| AudtError::payload(e.to_string()))
}

/// Converts an in-memory length to the `i32` prefix used on disk.
fn length_prefix(len: usize, what: &str) -> Result<i32> {
    i32::try_from(len).map_err(|_| AudtError::invalid(format!("{what} of {len} bytes is too long")))
}

/// Append-only encoder for one container (or one payload).
#[derive(Debug, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
    compressor: Arc<dyn Compressor>,
}

impl Default for ByteWriter {
    fn default() -> Self {
        Self::new(default_compressor())
    }
}

impl ByteWriter {
    /// Creates an empty writer that compresses arrays with `compressor`.
    pub fn new(compressor: Arc<dyn Compressor>) -> Self {
        Self {
            buf: Vec::new(),
            compressor,
        }
    }

    /// Creates a writer whose buffer already holds `prefix`.
    pub fn with_prefix(prefix: Vec<u8>, compressor: Arc<dyn Compressor>) -> Self {
        Self {
            buf: prefix,
            compressor,
        }
    }

    /// The compressor used by the `write_compressed*` family.
    pub fn compressor(&self) -> &Arc<dyn Compressor> {
        &self.compressor
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// View of the bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the writer and returns its buffer.
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    /// Drops everything written after the first `len` bytes.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
    }

    /// Appends bytes verbatim, without a length prefix.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes a big-endian `u32` (section identifiers).
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        encode_scalar(value, &mut self.buf)
    }

    /// Writes a big-endian `i16`.
    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        encode_scalar(value, &mut self.buf)
    }

    /// Writes a big-endian `i32`.
    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        encode_scalar(value, &mut self.buf)
    }

    /// Writes an IEEE-754 double, big-endian.
    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        encode_scalar(value, &mut self.buf)
    }

    /// Writes `i32 byte_len ‖ utf8 bytes`.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_bytes(value.as_bytes())
    }

    /// Writes `i32 len ‖ bytes`.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_i32(length_prefix(bytes.len(), "byte string")?)?;
        self.write_raw(bytes);
        Ok(())
    }

    /// Compresses `raw` and writes `i32 compressed_len ‖ compressed bytes`.
    pub fn write_compressed(&mut self, raw: &[u8]) -> Result<()> {
        let mut compressed = Vec::new();
        self.compressor.compress_append(raw, &mut compressed)?;
        self.write_bytes(&compressed)
    }

    /// Writes a compressed `f64` array (`i32 count ‖ elements` before compression).
    pub fn write_compressed_f64s(&mut self, values: &[f64]) -> Result<()> {
        let mut raw = Vec::with_capacity(4 + values.len() * 8);
        encode_scalar(length_prefix(values.len(), "f64 array")?, &mut raw)?;
        for v in values {
            encode_scalar(*v, &mut raw)?;
        }
        self.write_compressed(&raw)
    }

    /// Writes a compressed `i32` array (`i32 count ‖ elements` before compression).
    pub fn write_compressed_i32s(&mut self, values: &[i32]) -> Result<()> {
        let mut raw = Vec::with_capacity(4 + values.len() * 4);
        encode_scalar(length_prefix(values.len(), "i32 array")?, &mut raw)?;
        for v in values {
            encode_scalar(*v, &mut raw)?;
        }
        self.write_compressed(&raw)
    }
}

/// Bounds-checked read cursor over a borrowed buffer.
///
/// Positions are absolute offsets into the underlying slice; the cursor never
/// reads at or beyond `end`, which lets the container reader fence off the
/// footer.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    end: usize,
    compressor: Arc<dyn Compressor>,
}

impl<'a> ByteCursor<'a> {
    /// A cursor over all of `data`.
    pub fn new(data: &'a [u8], compressor: Arc<dyn Compressor>) -> Self {
        Self {
            data,
            pos: 0,
            end: data.len(),
            compressor,
        }
    }

    /// A cursor over `data[start..end]` that reports absolute offsets.
    pub fn bounded(
        data: &'a [u8],
        start: usize,
        end: usize,
        compressor: Arc<dyn Compressor>,
    ) -> Result<Self> {
        if start > end || end > data.len() {
            return Err(AudtError::Corrupt(CorruptKind::Truncated {
                offset: start,
                needed: end.saturating_sub(start),
                remaining: data.len().saturating_sub(start),
            }));
        }
        Ok(Self {
            data,
            pos: start,
            end,
            compressor,
        })
    }

    /// Current absolute offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left before the end fence.
    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    /// Whether the cursor has reached its end fence.
    pub fn is_exhausted(&self) -> bool {
        self.pos == self.end
    }

    /// Advances by `n` bytes and returns them.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(AudtError::Corrupt(CorruptKind::Truncated {
                offset: self.pos,
                needed: n,
                remaining,
            }));
        }
        let data = self.data;
        let start = self.pos;
        self.pos += n;
        Ok(&data[start..self.pos])
    }

    /// Reads a big-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32> {
        decode_scalar(self.take(4)?)
    }

    /// Reads a big-endian `i16`.
    pub fn read_i16(&mut self) -> Result<i16> {
        decode_scalar(self.take(2)?)
    }

    /// Reads a big-endian `i32`.
    pub fn read_i32(&mut self) -> Result<i32> {
        decode_scalar(self.take(4)?)
    }

    /// Reads a big-endian `f64`.
    pub fn read_f64(&mut self) -> Result<f64> {
        decode_scalar(self.take(8)?)
    }

    fn read_len(&mut self) -> Result<usize> {
        let at = self.pos;
        let len = self.read_i32()?;
        usize::try_from(len)
            .map_err(|_| AudtError::payload(format!("negative length {len} at offset {at}")))
    }

    /// Reads `i32 len ‖ bytes` and borrows the bytes.
    pub fn read_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_len()?;
        self.take(len)
    }

    /// Reads `i32 len ‖ utf8 bytes`.
    pub fn read_string(&mut self) -> Result<String> {
        let at = self.pos;
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| AudtError::payload(format!("string at offset {at}: {e}")))
    }

    /// Reads a length-prefixed compressed block and decompresses it.
    pub fn read_compressed(&mut self) -> Result<Vec<u8>> {
        let block = self.read_bytes()?;
        Ok(self.compressor.decompress(block)?.into_owned())
    }

    /// Reads an array written by [`ByteWriter::write_compressed_f64s`].
    pub fn read_compressed_f64s(&mut self) -> Result<Vec<f64>> {
        let raw = self.read_compressed()?;
        let mut inner = ByteCursor::new(&raw, Arc::clone(&self.compressor));
        let count = inner.array_count(8)?;
        (0..count).map(|_| inner.read_f64()).collect()
    }

    /// Reads an array written by [`ByteWriter::write_compressed_i32s`].
    pub fn read_compressed_i32s(&mut self) -> Result<Vec<i32>> {
        let raw = self.read_compressed()?;
        let mut inner = ByteCursor::new(&raw, Arc::clone(&self.compressor));
        let count = inner.array_count(4)?;
        (0..count).map(|_| inner.read_i32()).collect()
    }

    /// Reads the element count of a decompressed array and checks it against
    /// the bytes that follow.
    pub(crate) fn array_count(&mut self, width: usize) -> Result<usize> {
        let count = self.read_len()?;
        match count.checked_mul(width) {
            Some(bytes) if bytes == self.remaining() => Ok(count),
            _ => Err(AudtError::payload(format!(
                "array declares {count} elements but carries {} bytes",
                self.remaining()
            ))),
        }
    }
}
