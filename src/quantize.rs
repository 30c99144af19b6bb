//! Lossy 8-bit quantization of transform magnitude matrices.
//!
//! Values are mapped affinely from the matrix's own `[min, max]` range onto
//! `-128..=127`:
//!
//! ```text
//! q  = round((v - min) / (max - min) * 255) - 128
//! v' = min + (q + 128) / 255 * (max - min)
//! ```
//!
//! so the absolute reconstruction error of every cell is at most
//! `(max - min) / 510`. The error stays within `1e-2` only while the range is at
//! most `5.1`; wider matrices lose proportionally more precision. A constant
//! matrix quantizes to all `-128` and comes back exactly.
//!
//! A matrix without cells is always `0x0`; rows of zero length are not kept.

use std::sync::Arc;

use rayon::prelude::*;

use crate::codec::{ByteCursor, ByteWriter};
use crate::compression::Compressor;
use crate::error::{AudtError, Result};

const LEVELS: f64 = 255.0;
const OFFSET: i64 = 128;

/// A quantized, row-major matrix together with the range it was scaled from.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizedMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<i8>,
    min: f64,
    max: f64,
}

impl QuantizedMatrix {
    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Quantized cells, row-major.
    pub fn cells(&self) -> &[i8] {
        &self.cells
    }

    /// Smallest value of the source matrix.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest value of the source matrix.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Reconstructs approximate magnitudes.
    pub fn dequantize(&self) -> Vec<Vec<f64>> {
        let range = self.max - self.min;
        let min = self.min;
        if self.cols == 0 {
            return Vec::new();
        }
        self.cells
            .par_chunks(self.cols)
            .map(|row| {
                row.iter()
                    .map(|&q| min + (f64::from(q) + OFFSET as f64) / LEVELS * range)
                    .collect::<Vec<f64>>()
            })
            .collect()
    }

    /// Serializes as `i32 rows ‖ i32 cols ‖ cells` and compresses the result.
    pub fn pack(&self, compressor: &Arc<dyn Compressor>) -> Result<Vec<u8>> {
        let mut raw = ByteWriter::new(Arc::clone(compressor));
        raw.write_i32(dimension(self.rows)?)?;
        raw.write_i32(dimension(self.cols)?)?;
        let bytes: Vec<u8> = self.cells.iter().map(|&c| c as u8).collect();
        raw.write_raw(&bytes);

        let mut blob = Vec::new();
        compressor.compress_append(raw.as_slice(), &mut blob)?;
        Ok(blob)
    }

    /// Inverse of [`QuantizedMatrix::pack`]; `min` and `max` come from the
    /// transform section that carried the blob.
    pub fn unpack(
        blob: &[u8],
        min: f64,
        max: f64,
        compressor: &Arc<dyn Compressor>,
    ) -> Result<Self> {
        let raw = compressor.decompress(blob)?;
        let mut cursor = ByteCursor::new(&raw, Arc::clone(compressor));
        let rows = read_dimension(&mut cursor)?;
        let cols = read_dimension(&mut cursor)?;
        if (rows == 0) != (cols == 0) {
            return Err(AudtError::payload(format!(
                "degenerate {rows}x{cols} matrix"
            )));
        }
        let expected = rows.checked_mul(cols);
        if expected != Some(cursor.remaining()) {
            return Err(AudtError::payload(format!(
                "{rows}x{cols} matrix carries {} cells",
                cursor.remaining()
            )));
        }
        let count = cursor.remaining();
        let cells = cursor.take(count)?.iter().map(|&b| b as i8).collect();
        Ok(Self {
            rows,
            cols,
            cells,
            min,
            max,
        })
    }
}

fn dimension(n: usize) -> Result<i32> {
    i32::try_from(n).map_err(|_| AudtError::invalid(format!("matrix dimension {n} is too large")))
}

fn read_dimension(cursor: &mut ByteCursor<'_>) -> Result<usize> {
    let n = cursor.read_i32()?;
    usize::try_from(n).map_err(|_| AudtError::payload(format!("negative matrix dimension {n}")))
}

/// Quantizes a rectangular matrix of finite values.
///
/// # Errors
/// [`AudtError::InvalidInput`] for ragged rows or NaN/infinite cells.
pub fn quantize(matrix: &[Vec<f64>]) -> Result<QuantizedMatrix> {
    let cols = matrix.first().map_or(0, Vec::len);
    if let Some(bad) = matrix.iter().position(|row| row.len() != cols) {
        return Err(AudtError::invalid(format!(
            "row {bad} has {} columns, expected {cols}",
            matrix[bad].len()
        )));
    }
    if matrix.par_iter().any(|row| row.iter().any(|v| !v.is_finite())) {
        return Err(AudtError::invalid("matrix contains non-finite values"));
    }
    let rows = if cols == 0 { 0 } else { matrix.len() };

    let (min, max) = if rows == 0 || cols == 0 {
        (0.0, 0.0)
    } else {
        matrix
            .par_iter()
            .map(|row| {
                row.iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                        (lo.min(v), hi.max(v))
                    })
            })
            .reduce(
                || (f64::INFINITY, f64::NEG_INFINITY),
                |a, b| (a.0.min(b.0), a.1.max(b.1)),
            )
    };

    let range = max - min;
    if !range.is_finite() {
        return Err(AudtError::invalid("matrix range overflows f64"));
    }
    let cells: Vec<i8> = matrix
        .par_iter()
        .flat_map_iter(|row| row.iter().map(move |&v| quantize_cell(v, min, range)))
        .collect();

    Ok(QuantizedMatrix {
        rows,
        cols,
        cells,
        min,
        max,
    })
}

fn quantize_cell(v: f64, min: f64, range: f64) -> i8 {
    if range <= 0.0 {
        return i8::MIN;
    }
    let level = ((v - min) / range * LEVELS).round() as i64;
    (level - OFFSET).clamp(i64::from(i8::MIN), i64::from(i8::MAX)) as i8
}

/// Shorthand for `quantize(matrix)?.dequantize()`.
pub fn round_trip(matrix: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    Ok(quantize(matrix)?.dequantize())
}
