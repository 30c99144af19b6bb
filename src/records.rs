//! The five logical records of a project and their aggregate.
//!
//! Records are version neutral. Fields that only some layouts can carry are
//! `Option`s; the schema for the target version decides whether a given record
//! is representable (see [`crate::schema`]).

use crate::compression::default_compressor;
use crate::error::{AudtError, Result};
use crate::format::{HEADER_SIZE, VersionTag};
use crate::music::{MusicKey, TimeSignature};
use crate::quantize::{QuantizedMatrix, quantize};
use crate::schema::Schema;

/// Where the mutable tail of the file begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainerMetadata {
    /// Byte offset of the project-info section id. Everything before it
    /// (header, metadata, transform, audio) is immutable and may be copied
    /// verbatim by a partial rewrite.
    pub skippable_bytes: u32,
}

impl ContainerMetadata {
    /// Wraps a raw offset.
    pub fn new(skippable_bytes: u32) -> Self {
        Self { skippable_bytes }
    }

    /// Computes the correct offset for a file holding `transform` and `audio`
    /// under `schema`.
    pub fn for_prefix(schema: &Schema, transform: &TransformData, audio: &AudioData) -> Result<Self> {
        let metadata_len = schema.num_bytes_needed(&Self::default())?;
        let total = HEADER_SIZE
            + metadata_len
            + schema.num_bytes_needed(transform)?
            + schema.num_bytes_needed(audio)?;
        let skippable_bytes = u32::try_from(total)
            .ok()
            .filter(|n| i32::try_from(*n).is_ok())
            .ok_or_else(|| AudtError::invalid(format!("immutable prefix of {total} bytes is too large")))?;
        Ok(Self { skippable_bytes })
    }
}

/// The quantized transform magnitude matrix, stored as a compressed blob.
///
/// Equality compares the blob bytes and the range, never the dequantized values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransformData {
    blob: Vec<u8>,
    min: f64,
    max: f64,
}

impl TransformData {
    /// Quantizes and compresses a magnitude matrix.
    pub fn from_magnitudes(matrix: &[Vec<f64>]) -> Result<Self> {
        let quantized = quantize(matrix)?;
        let blob = quantized.pack(&default_compressor())?;
        Ok(Self {
            blob,
            min: quantized.min(),
            max: quantized.max(),
        })
    }

    /// Wraps an already packed blob.
    pub fn from_parts(blob: Vec<u8>, min: f64, max: f64) -> Self {
        Self { blob, min, max }
    }

    /// Decompresses and dequantizes the matrix.
    pub fn to_magnitudes(&self) -> Result<Vec<Vec<f64>>> {
        Ok(self.quantized()?.dequantize())
    }

    /// Decompresses the matrix without dequantizing it.
    pub fn quantized(&self) -> Result<QuantizedMatrix> {
        QuantizedMatrix::unpack(&self.blob, self.min, self.max, &default_compressor())
    }

    /// The compressed blob as stored on disk.
    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    /// Smallest magnitude before quantization.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest magnitude before quantization.
    pub fn max(&self) -> f64 {
        self.max
    }
}

/// Audio streams, already compressed by the caller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AudioData {
    /// The original audio, as opaque bytes.
    pub original: Vec<u8>,
    /// A slowed playback copy; present in `0x00080001` and later only.
    pub slowed: Option<Vec<u8>>,
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Duration in milliseconds.
    pub duration_ms: u32,
    /// Name of the imported audio file; `0x00050002` only.
    pub file_name: Option<String>,
}

/// Mutable project scalars.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectInfo {
    /// Project name; absent in `0x00050002`.
    pub name: Option<String>,
    /// Musical key.
    pub key: MusicKey,
    /// Time signature.
    pub time_signature: TimeSignature,
    /// Tempo in beats per minute.
    pub bpm: f64,
    /// Offset of the first beat, in seconds.
    pub offset_seconds: f64,
    /// Playback volume.
    pub playback_volume: f64,
    /// Playback position in milliseconds.
    pub current_time_ms: u32,
}

/// One transcribed note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    /// Onset time in seconds.
    pub onset: f64,
    /// Duration in seconds.
    pub duration: f64,
    /// Pitch number.
    pub pitch: i32,
}

/// Transcribed notes as three parallel arrays of equal length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NoteData {
    onsets: Vec<f64>,
    durations: Vec<f64>,
    pitches: Vec<i32>,
}

impl NoteData {
    /// Builds note data from parallel arrays.
    ///
    /// # Errors
    /// [`AudtError::InvalidInput`] when the arrays differ in length.
    pub fn new(onsets: Vec<f64>, durations: Vec<f64>, pitches: Vec<i32>) -> Result<Self> {
        if onsets.len() != durations.len() || onsets.len() != pitches.len() {
            return Err(AudtError::invalid(format!(
                "note arrays differ in length ({}, {}, {})",
                onsets.len(),
                durations.len(),
                pitches.len()
            )));
        }
        Ok(Self {
            onsets,
            durations,
            pitches,
        })
    }

    /// Onset times.
    pub fn onsets(&self) -> &[f64] {
        &self.onsets
    }

    /// Durations.
    pub fn durations(&self) -> &[f64] {
        &self.durations
    }

    /// Pitch numbers.
    pub fn pitches(&self) -> &[i32] {
        &self.pitches
    }

    /// Number of notes.
    pub fn len(&self) -> usize {
        self.onsets.len()
    }

    /// Whether there are no notes.
    pub fn is_empty(&self) -> bool {
        self.onsets.is_empty()
    }

    /// Iterates notes in storage order.
    pub fn iter(&self) -> impl Iterator<Item = Note> + '_ {
        self.onsets
            .iter()
            .zip(&self.durations)
            .zip(&self.pitches)
            .map(|((&onset, &duration), &pitch)| Note {
                onset,
                duration,
                pitch,
            })
    }
}

impl FromIterator<Note> for NoteData {
    fn from_iter<I: IntoIterator<Item = Note>>(iter: I) -> Self {
        let mut notes = Self::default();
        for note in iter {
            notes.onsets.push(note.onset);
            notes.durations.push(note.duration);
            notes.pitches.push(note.pitch);
        }
        notes
    }
}

/// Everything stored in one container.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectData {
    /// Container metadata.
    pub metadata: ContainerMetadata,
    /// Transform magnitudes.
    pub transform: TransformData,
    /// Audio streams.
    pub audio: AudioData,
    /// Project scalars.
    pub project_info: ProjectInfo,
    /// Transcribed notes.
    pub notes: NoteData,
}

impl ProjectData {
    /// Returns a copy whose metadata points at the real project-info offset
    /// for `schema`.
    pub fn with_computed_metadata(mut self, schema: &Schema) -> Result<Self> {
        self.metadata = ContainerMetadata::for_prefix(schema, &self.transform, &self.audio)?;
        Ok(self)
    }
}

/// A project read from disk, together with the version it was stored as.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedProject {
    /// Version tag from the file header.
    pub version: VersionTag,
    /// The decoded records.
    pub data: ProjectData,
}
