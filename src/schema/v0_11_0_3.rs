//! Format `0x000B0003`, the current version. The key is stored as its stable
//! 16-bit id rather than a list index.

use crate::codec::{ByteCursor, ByteWriter};
use crate::error::{AudtError, Result};
use crate::format::VersionTag;
use crate::music::MusicKey;
use crate::records::ProjectInfo;
use crate::schema::v0_5_0_2::{
    decode_metadata, decode_notes, decode_playback, decode_transform, encode_metadata,
    encode_notes, encode_playback, encode_transform,
};
use crate::schema::v0_8_0_1::{decode_audio, encode_audio};
use crate::schema::v0_9_0_2::{decode_time_signature, encode_time_signature};
use crate::schema::{RecordCodec, Schema, require};

/// This version's tag.
pub const VERSION: VersionTag = VersionTag::new(0x000B_0003);

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

fn encode_project_info(r: &ProjectInfo, w: &mut ByteWriter) -> Result<()> {
    let name = require(&r.name, "project name", VERSION)?;
    w.write_string(name)?;
    w.write_i16(r.key.uuid())?;
    encode_time_signature(r.time_signature, w)?;
    encode_playback(r, w)
}

fn decode_project_info(c: &mut ByteCursor<'_>) -> Result<ProjectInfo> {
    let name = c.read_string()?;
    let uuid = c.read_i16()?;
    let key = MusicKey::from_uuid(uuid)
        .ok_or_else(|| AudtError::payload(format!("unknown music key id {uuid}")))?;
    let time_signature = decode_time_signature(c)?;
    decode_playback(c, Some(name), key, time_signature)
}
