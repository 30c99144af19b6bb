//! Format `0x00050002`, the oldest readable version.
//!
//! Layouts that never changed afterwards (container metadata, transform data and
//! note data) are defined here and reused by every later version.

use crate::codec::{ByteCursor, ByteWriter};
use crate::error::{AudtError, Result};
use crate::format::VersionTag;
use crate::music::{MusicKey, TimeSignature};
use crate::records::{AudioData, ContainerMetadata, NoteData, ProjectInfo, TransformData};
use crate::schema::{RecordCodec, Schema, forbid, require, to_i32, to_u32};

/// This version's tag.
pub const VERSION: VersionTag = VersionTag::new(0x0005_0002);

/// The schema for this version.
pub fn schema() -> Schema {
    Schema::new(
        VERSION,
        RecordCodec::new(encode_metadata, decode_metadata),
        RecordCodec::new(encode_transform, decode_transform),
        RecordCodec::new(encode_audio, decode_audio),
        RecordCodec::new(encode_project_info, decode_project_info),
        RecordCodec::new(encode_notes, decode_notes),
    )
}

// --- Shared by all versions ---

pub(crate) fn encode_metadata(r: &ContainerMetadata, w: &mut ByteWriter) -> Result<()> {
    w.write_i32(to_i32(r.skippable_bytes, "skippable bytes")?)
}

pub(crate) fn decode_metadata(c: &mut ByteCursor<'_>) -> Result<ContainerMetadata> {
    let skippable = to_u32(c.read_i32()?, "skippable bytes")?;
    Ok(ContainerMetadata::new(skippable))
}

pub(crate) fn encode_transform(r: &TransformData, w: &mut ByteWriter) -> Result<()> {
    w.write_f64(r.min())?;
    w.write_f64(r.max())?;
    w.write_bytes(r.blob())
}

pub(crate) fn decode_transform(c: &mut ByteCursor<'_>) -> Result<TransformData> {
    let min = c.read_f64()?;
    let max = c.read_f64()?;
    let blob = c.read_bytes()?.to_vec();
    Ok(TransformData::from_parts(blob, min, max))
}

pub(crate) fn encode_notes(r: &NoteData, w: &mut ByteWriter) -> Result<()> {
    w.write_compressed_f64s(r.onsets())?;
    w.write_compressed_f64s(r.durations())?;
    w.write_compressed_i32s(r.pitches())
}

pub(crate) fn decode_notes(c: &mut ByteCursor<'_>) -> Result<NoteData> {
    let onsets = c.read_compressed_f64s()?;
    let durations = c.read_compressed_f64s()?;
    let pitches = c.read_compressed_i32s()?;
    NoteData::new(onsets, durations, pitches).map_err(|e| AudtError::payload(e.to_string()))
}

// --- Reused by later versions ---

/// Writes bpm, offset, volume and playback position.
pub(crate) fn encode_playback(r: &ProjectInfo, w: &mut ByteWriter) -> Result<()> {
    w.write_f64(r.bpm)?;
    w.write_f64(r.offset_seconds)?;
    w.write_f64(r.playback_volume)?;
    w.write_i32(to_i32(r.current_time_ms, "playback position")?)
}

/// Reads what [`encode_playback`] wrote and completes the record.
pub(crate) fn decode_playback(
    c: &mut ByteCursor<'_>,
    name: Option<String>,
    key: MusicKey,
    time_signature: TimeSignature,
) -> Result<ProjectInfo> {
    let bpm = c.read_f64()?;
    let offset_seconds = c.read_f64()?;
    let playback_volume = c.read_f64()?;
    let current_time_ms = to_u32(c.read_i32()?, "playback position")?;
    Ok(ProjectInfo {
        name,
        key,
        time_signature,
        bpm,
        offset_seconds,
        playback_volume,
        current_time_ms,
    })
}

pub(crate) fn encode_key_index(key: MusicKey, w: &mut ByteWriter) -> Result<()> {
    // Thirty keys always fit.
    w.write_i32(key.legacy_index() as i32)
}

pub(crate) fn decode_key_index(c: &mut ByteCursor<'_>) -> Result<MusicKey> {
    let index = c.read_i32()?;
    usize::try_from(index)
        .ok()
        .and_then(MusicKey::from_legacy_index)
        .ok_or_else(|| AudtError::payload(format!("music key index {index} out of range")))
}

/// Writes key index, time-signature index and playback, without a name.
pub(crate) fn encode_indexed_info(r: &ProjectInfo, w: &mut ByteWriter) -> Result<()> {
    encode_key_index(r.key, w)?;
    let ts = r.time_signature.legacy_index().ok_or_else(|| {
        AudtError::invalid(format!(
            "time signature {} has no index in this format",
            r.time_signature
        ))
    })?;
    w.write_i32(ts as i32)?;
    encode_playback(r, w)
}

pub(crate) fn decode_indexed_info(c: &mut ByteCursor<'_>, name: Option<String>) -> Result<ProjectInfo> {
    let key = decode_key_index(c)?;
    let index = c.read_i32()?;
    let time_signature = usize::try_from(index)
        .ok()
        .and_then(TimeSignature::from_legacy_index)
        .ok_or_else(|| AudtError::payload(format!("time signature index {index} out of range")))?;
    decode_playback(c, name, key, time_signature)
}

// --- Specific to this version ---

fn encode_audio(r: &AudioData, w: &mut ByteWriter) -> Result<()> {
    forbid(&r.slowed, "slowed audio", VERSION)?;
    let file_name = require(&r.file_name, "audio file name", VERSION)?;
    w.write_bytes(&r.original)?;
    w.write_f64(r.sample_rate)?;
    w.write_i32(to_i32(r.duration_ms, "audio duration")?)?;
    w.write_string(file_name)
}

fn decode_audio(c: &mut ByteCursor<'_>) -> Result<AudioData> {
    let original = c.read_bytes()?.to_vec();
    let sample_rate = c.read_f64()?;
    let duration_ms = to_u32(c.read_i32()?, "audio duration")?;
    let file_name = c.read_string()?;
    Ok(AudioData {
        original,
        slowed: None,
        sample_rate,
        duration_ms,
        file_name: Some(file_name),
    })
}

fn encode_project_info(r: &ProjectInfo, w: &mut ByteWriter) -> Result<()> {
    forbid(&r.name, "project name", VERSION)?;
    encode_indexed_info(r, w)
}

fn decode_project_info(c: &mut ByteCursor<'_>) -> Result<ProjectInfo> {
    decode_indexed_info(c, None)
}
