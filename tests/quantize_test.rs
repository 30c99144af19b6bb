#![allow(missing_docs)]

mod common;

use audt::compression::{Compressor, default_compressor};
use audt::quantize::{QuantizedMatrix, quantize, round_trip};
use audt::{AudtError, CorruptKind, TransformData};
use common::{assert_close, scenario_matrix};

fn wave(rows: usize, cols: usize) -> Vec<Vec<f64>> {
    (0..rows)
        .map(|r| {
            (0..cols)
                .map(|c| ((r * cols + c) as f64 * 0.37).sin() * 2.5)
                .collect()
        })
        .collect()
}

#[test]
fn dequantized_values_stay_within_tolerance() -> audt::Result<()> {
    let matrix = wave(64, 40);
    let restored = round_trip(&matrix)?;

    assert_eq!(restored.len(), 64);
    for (row, back) in matrix.iter().zip(&restored) {
        assert_eq!(back.len(), 40);
        for (v, r) in row.iter().zip(back) {
            // Range is at most 5.0, so each step is below 0.01.
            assert_close(*r, *v, 1e-2);
        }
    }
    Ok(())
}

#[test]
fn min_and_max_are_the_true_extremes() -> audt::Result<()> {
    let matrix = scenario_matrix();
    let q = quantize(&matrix)?;
    assert_eq!(q.min(), -1.5);
    assert_eq!(q.max(), 1.875);
    assert_eq!((q.rows(), q.cols()), (3, 5));

    // The extremes land on the ends of the byte range and come back exactly.
    assert!(q.cells().contains(&-128));
    assert!(q.cells().contains(&127));
    let restored = q.dequantize();
    assert_eq!(restored[1][1], -1.5);
    assert_close(restored[2][0], 1.875, 1e-12);
    Ok(())
}

#[test]
fn constant_matrix_restores_exactly() -> audt::Result<()> {
    let matrix = vec![vec![0.75; 4]; 3];
    let q = quantize(&matrix)?;
    assert!(q.cells().iter().all(|&c| c == -128));
    assert_eq!(q.dequantize(), matrix);
    Ok(())
}

#[test]
fn empty_matrices_are_allowed() -> audt::Result<()> {
    let q = quantize(&[])?;
    assert_eq!((q.rows(), q.cols(), q.min(), q.max()), (0, 0, 0.0, 0.0));
    assert!(q.dequantize().is_empty());

    // Rows without cells collapse to an empty matrix.
    let no_columns = vec![Vec::new(); 3];
    let q = quantize(&no_columns)?;
    assert_eq!((q.rows(), q.cols()), (0, 0));
    assert!(round_trip(&no_columns)?.is_empty());

    let transform = TransformData::from_magnitudes(&no_columns)?;
    assert!(transform.to_magnitudes()?.is_empty());
    Ok(())
}

#[test]
fn ragged_or_non_finite_input_is_rejected() {
    let ragged = vec![vec![1.0, 2.0], vec![3.0]];
    assert!(matches!(quantize(&ragged), Err(AudtError::InvalidInput(_))));

    let nan = vec![vec![1.0, f64::NAN]];
    assert!(matches!(quantize(&nan), Err(AudtError::InvalidInput(_))));

    let inf = vec![vec![f64::INFINITY]];
    assert!(matches!(quantize(&inf), Err(AudtError::InvalidInput(_))));
}

#[test]
fn pack_and_unpack_preserve_cells() -> audt::Result<()> {
    let compressor = default_compressor();
    let q = quantize(&wave(10, 7))?;
    let blob = q.pack(&compressor)?;
    let back = QuantizedMatrix::unpack(&blob, q.min(), q.max(), &compressor)?;
    assert_eq!(back, q);
    Ok(())
}

#[test]
fn transform_data_wraps_the_packed_matrix() -> audt::Result<()> {
    let matrix = scenario_matrix();
    let transform = TransformData::from_magnitudes(&matrix)?;
    assert_eq!(transform.min(), -1.5);
    assert_eq!(transform.max(), 1.875);

    let restored = transform.to_magnitudes()?;
    for (row, back) in matrix.iter().zip(&restored) {
        for (v, r) in row.iter().zip(back) {
            assert_close(*r, *v, 1e-2);
        }
    }

    let rebuilt = TransformData::from_parts(transform.blob().to_vec(), -1.5, 1.875);
    assert_eq!(rebuilt, transform);
    Ok(())
}

#[test]
fn corrupt_blob_is_reported() {
    let transform = TransformData::from_parts(vec![4, 0, 0, 0, 0xFF], 0.0, 1.0);
    assert!(transform.to_magnitudes().unwrap_err().is_corrupt());
}

/// A blob claiming rows without columns (or the reverse) is rejected before
/// anything is allocated for it.
#[test]
fn degenerate_dimensions_are_corrupt() -> audt::Result<()> {
    let compressor = default_compressor();
    for (rows, cols) in [(i32::MAX, 0i32), (0, 7)] {
        let mut raw = Vec::new();
        raw.extend_from_slice(&rows.to_be_bytes());
        raw.extend_from_slice(&cols.to_be_bytes());
        let mut blob = Vec::new();
        compressor.compress_append(&raw, &mut blob)?;

        assert!(matches!(
            QuantizedMatrix::unpack(&blob, 0.0, 1.0, &compressor),
            Err(AudtError::Corrupt(CorruptKind::CorruptPayload(_)))
        ));
        let transform = TransformData::from_parts(blob, 0.0, 1.0);
        assert!(transform.to_magnitudes().unwrap_err().is_corrupt());
    }
    Ok(())
}
