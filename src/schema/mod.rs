//! Versioned record layouts and the version dispatcher.
//!
//! Every format version is a [`Schema`]: a version tag plus one encode/decode
//! function pair per record kind. Each version lives in its own file and its
//! layouts are frozen once released; a new version registers a new schema and
//! reuses whichever older layout functions did not change.
//!
//! ```text
//! 0x00050002  audio + file name, index-coded key and time signature
//! 0x00070001  project name added, audio file name dropped
//! 0x00080001  second (slowed) audio stream
//! 0x00090002  time signature stored as beats/unit
//! 0x000B0003  key stored as its stable id
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use crate::codec::{ByteCursor, ByteWriter};
use crate::error::{AudtError, Result};
use crate::format::{SectionId, VersionTag};
use crate::records::{AudioData, ContainerMetadata, NoteData, ProjectInfo, TransformData};
use crate::section::{read_section, write_section};

pub mod v0_11_0_3;
pub mod v0_5_0_2;
pub mod v0_7_0_1;
pub mod v0_8_0_1;
pub mod v0_9_0_2;

/// Version used for every new project.
pub const CURRENT_VERSION: VersionTag = VersionTag::CURRENT;

/// Encoder and decoder of one record kind in one version.
pub struct RecordCodec<R> {
    /// Writes the payload (no framing).
    pub encode: fn(&R, &mut ByteWriter) -> Result<()>,
    /// Reads the payload (no framing).
    pub decode: fn(&mut ByteCursor<'_>) -> Result<R>,
}

impl<R> RecordCodec<R> {
    /// Pairs an encoder with its decoder.
    pub const fn new(
        encode: fn(&R, &mut ByteWriter) -> Result<()>,
        decode: fn(&mut ByteCursor<'_>) -> Result<R>,
    ) -> Self {
        Self { encode, decode }
    }
}

impl<R> Clone for RecordCodec<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for RecordCodec<R> {}

impl<R> fmt::Debug for RecordCodec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RecordCodec")
    }
}

/// A record kind that can be stored in a section.
pub trait Record: Sized {
    /// The section this record occupies.
    const SECTION: SectionId;

    /// Picks this record's codec out of a schema.
    fn codec(schema: &Schema) -> RecordCodec<Self>;
}

macro_rules! impl_record {
    ($ty:ty, $section:ident, $field:ident) => {
        impl Record for $ty {
            const SECTION: SectionId = SectionId::$section;

            fn codec(schema: &Schema) -> RecordCodec<Self> {
                schema.$field
            }
        }
    };
}

impl_record!(ContainerMetadata, ContainerMetadata, metadata);
impl_record!(TransformData, TransformData, transform);
impl_record!(AudioData, AudioData, audio);
impl_record!(ProjectInfo, ProjectInfo, project_info);
impl_record!(NoteData, NoteData, notes);

/// The complete set of layouts for one format version.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    version: VersionTag,
    metadata: RecordCodec<ContainerMetadata>,
    transform: RecordCodec<TransformData>,
    audio: RecordCodec<AudioData>,
    project_info: RecordCodec<ProjectInfo>,
    notes: RecordCodec<NoteData>,
}

impl Schema {
    /// Assembles a schema from its five codecs.
    pub const fn new(
        version: VersionTag,
        metadata: RecordCodec<ContainerMetadata>,
        transform: RecordCodec<TransformData>,
        audio: RecordCodec<AudioData>,
        project_info: RecordCodec<ProjectInfo>,
        notes: RecordCodec<NoteData>,
    ) -> Self {
        Self {
            version,
            metadata,
            transform,
            audio,
            project_info,
            notes,
        }
    }

    /// The version tag this schema reads and writes.
    pub fn version(&self) -> VersionTag {
        self.version
    }

    /// Writes `record` as a framed section.
    pub fn write<R: Record>(&self, out: &mut ByteWriter, record: &R) -> Result<()> {
        let codec = R::codec(self);
        write_section(out, R::SECTION, |w| (codec.encode)(record, w))
    }

    /// Reads the next framed section as `R`.
    pub fn read<R: Record>(&self, cursor: &mut ByteCursor<'_>) -> Result<R> {
        read_section(cursor, R::SECTION, R::codec(self).decode)
    }

    /// Size of `record`'s framed section under this schema, id and delimiter included.
    pub fn num_bytes_needed<R: Record>(&self, record: &R) -> Result<usize> {
        let mut scratch = ByteWriter::default();
        self.write(&mut scratch, record)?;
        Ok(scratch.len())
    }
}

/// Maps version tags to schemas.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: BTreeMap<VersionTag, Schema>,
}

impl SchemaRegistry {
    /// Creates a registry holding every built-in version.
    pub fn new() -> Self {
        let mut reg = Self::empty();
        reg.register(v0_5_0_2::schema());
        reg.register(v0_7_0_1::schema());
        reg.register(v0_8_0_1::schema());
        reg.register(v0_9_0_2::schema());
        reg.register(v0_11_0_3::schema());
        reg
    }

    /// Creates a registry with no versions.
    pub fn empty() -> Self {
        Self {
            schemas: BTreeMap::new(),
        }
    }

    /// The shared registry of built-in versions.
    pub fn builtin() -> &'static SchemaRegistry {
        static BUILTIN: OnceLock<SchemaRegistry> = OnceLock::new();
        BUILTIN.get_or_init(SchemaRegistry::new)
    }

    /// Registers a schema, replacing any schema with the same version.
    pub fn register(&mut self, schema: Schema) -> Option<Schema> {
        self.schemas.insert(schema.version(), schema)
    }

    /// Looks up the schema for `version`.
    ///
    /// # Errors
    /// [`AudtError::UnsupportedVersion`] when the tag is not registered.
    pub fn get(&self, version: VersionTag) -> Result<&Schema> {
        self.schemas
            .get(&version)
            .ok_or(AudtError::UnsupportedVersion(version))
    }

    /// Registered versions, oldest first.
    pub fn versions(&self) -> impl Iterator<Item = VersionTag> + '_ {
        self.schemas.keys().copied()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Looks `version` up in the built-in registry.
pub fn schema_for(version: VersionTag) -> Result<Schema> {
    SchemaRegistry::builtin().get(version).copied()
}

// Range checks shared by the version files.

pub(crate) fn to_i32(value: u32, what: &str) -> Result<i32> {
    i32::try_from(value).map_err(|_| AudtError::invalid(format!("{what} {value} does not fit the format")))
}

pub(crate) fn to_u32(value: i32, what: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| AudtError::payload(format!("negative {what} ({value})")))
}

pub(crate) fn to_i16(value: u16, what: &str) -> Result<i16> {
    i16::try_from(value).map_err(|_| AudtError::invalid(format!("{what} {value} does not fit the format")))
}

pub(crate) fn to_u16(value: i16, what: &str) -> Result<u16> {
    u16::try_from(value).map_err(|_| AudtError::payload(format!("negative {what} ({value})")))
}

pub(crate) fn require<'a, T>(field: &'a Option<T>, what: &str, version: VersionTag) -> Result<&'a T> {
    field
        .as_ref()
        .ok_or_else(|| AudtError::invalid(format!("{what} is required by version {version}")))
}

pub(crate) fn forbid<T>(field: &Option<T>, what: &str, version: VersionTag) -> Result<()> {
    match field {
        Some(_) => Err(AudtError::invalid(format!(
            "{what} cannot be stored in version {version}"
        ))),
        None => Ok(()),
    }
}
