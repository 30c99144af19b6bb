//! Format `0x00080001`: adds the slowed audio stream.

use crate::codec::{ByteCursor, ByteWriter};
use crate::error::Result;
use crate::format::VersionTag;
use crate::records::AudioData;
use crate::schema::v0_5_0_2::{
    decode_metadata, decode_notes, decode_transform, encode_metadata, encode_notes,
    encode_transform,
};
use crate::schema::v0_7_0_1::{decode_project_info, encode_project_info};
use crate::schema::{RecordCodec, Schema, forbid, require, to_i32, to_u32};

/// This version's tag.
pub const VERSION: VersionTag = VersionTag::new(0x0008_0001);

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

pub(crate) fn encode_audio(r: &AudioData, w: &mut ByteWriter) -> Result<()> {
    forbid(&r.file_name, "audio file name", VERSION)?;
    let slowed = require(&r.slowed, "slowed audio", VERSION)?;
    w.write_bytes(&r.original)?;
    w.write_bytes(slowed)?;
    w.write_f64(r.sample_rate)?;
    w.write_i32(to_i32(r.duration_ms, "audio duration")?)
}

pub(crate) fn decode_audio(c: &mut ByteCursor<'_>) -> Result<AudioData> {
    let original = c.read_bytes()?.to_vec();
    let slowed = c.read_bytes()?.to_vec();
    let sample_rate = c.read_f64()?;
    let duration_ms = to_u32(c.read_i32()?, "audio duration")?;
    Ok(AudioData {
        original,
        slowed: Some(slowed),
        sample_rate,
        duration_ms,
        file_name: None,
    })
}
