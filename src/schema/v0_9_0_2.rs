//! Format `0x00090002`: the time signature is stored as beats per bar and beat
//! unit instead of an index, so any signature can be saved.

use crate::codec::{ByteCursor, ByteWriter};
use crate::error::Result;
use crate::format::VersionTag;
use crate::music::TimeSignature;
use crate::records::ProjectInfo;
use crate::schema::v0_5_0_2::{
    decode_key_index, decode_metadata, decode_notes, decode_playback, decode_transform,
    encode_key_index, encode_metadata, encode_notes, encode_playback, encode_transform,
};
use crate::schema::v0_8_0_1::{decode_audio, encode_audio};
use crate::schema::{RecordCodec, Schema, require, to_i16, to_u16};

/// This version's tag.
pub const VERSION: VersionTag = VersionTag::new(0x0009_0002);

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

pub(crate) fn encode_time_signature(ts: TimeSignature, w: &mut ByteWriter) -> Result<()> {
    w.write_i16(to_i16(ts.beats_per_bar, "beats per bar")?)?;
    w.write_i16(to_i16(ts.beat_unit, "beat unit")?)
}

pub(crate) fn decode_time_signature(c: &mut ByteCursor<'_>) -> Result<TimeSignature> {
    let beats_per_bar = to_u16(c.read_i16()?, "beats per bar")?;
    let beat_unit = to_u16(c.read_i16()?, "beat unit")?;
    Ok(TimeSignature::new(beats_per_bar, beat_unit))
}

fn encode_project_info(r: &ProjectInfo, w: &mut ByteWriter) -> Result<()> {
    let name = require(&r.name, "project name", VERSION)?;
    w.write_string(name)?;
    encode_key_index(r.key, w)?;
    encode_time_signature(r.time_signature, w)?;
    encode_playback(r, w)
}

fn decode_project_info(c: &mut ByteCursor<'_>) -> Result<ProjectInfo> {
    let name = c.read_string()?;
    let key = decode_key_index(c)?;
    let time_signature = decode_time_signature(c)?;
    decode_playback(c, Some(name), key, time_signature)
}
