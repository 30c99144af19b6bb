//! Format `0x00070001`: the project gains a name; the audio file name is gone.

use crate::codec::{ByteCursor, ByteWriter};
use crate::error::Result;
use crate::format::VersionTag;
use crate::records::{AudioData, ProjectInfo};
use crate::schema::v0_5_0_2::{
    decode_indexed_info, decode_metadata, decode_notes, decode_transform, encode_indexed_info,
    encode_metadata, encode_notes, encode_transform,
};
use crate::schema::{RecordCodec, Schema, forbid, require, to_i32, to_u32};

/// This version's tag.
pub const VERSION: VersionTag = VersionTag::new(0x0007_0001);

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

fn encode_audio(r: &AudioData, w: &mut ByteWriter) -> Result<()> {
    forbid(&r.slowed, "slowed audio", VERSION)?;
    forbid(&r.file_name, "audio file name", VERSION)?;
    w.write_bytes(&r.original)?;
    w.write_f64(r.sample_rate)?;
    w.write_i32(to_i32(r.duration_ms, "audio duration")?)
}

fn decode_audio(c: &mut ByteCursor<'_>) -> Result<AudioData> {
    let original = c.read_bytes()?.to_vec();
    let sample_rate = c.read_f64()?;
    let duration_ms = to_u32(c.read_i32()?, "audio duration")?;
    Ok(AudioData {
        original,
        slowed: None,
        sample_rate,
        duration_ms,
        file_name: None,
    })
}

/// Name followed by the index-coded layout of `0x00050002`.
pub(crate) fn encode_project_info(r: &ProjectInfo, w: &mut ByteWriter) -> Result<()> {
    let name = require(&r.name, "project name", VERSION)?;
    w.write_string(name)?;
    encode_indexed_info(r, w)
}

pub(crate) fn decode_project_info(c: &mut ByteCursor<'_>) -> Result<ProjectInfo> {
    let name = c.read_string()?;
    decode_indexed_info(c, Some(name))
}
