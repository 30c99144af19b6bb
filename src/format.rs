//! Defines the physical binary layout of AUDT containers.
//!
//! # Layout
//! A container is written front to back in one pass:
//!
//! File: `[Header] [Section 1] [Section 2] ... [Section 5] [Footer]`
//!
//! ## Header (32 bytes)
//! `[ Magic (20) ] [ Format Version (4) ] [ Compressor Version (4) ] [ Delimiter (4) ]`
//!
//! ## Section
//! `[ Section Id (4) ] [ Payload (record specific) ] [ Delimiter (4) ]`
//!
//! ## Footer (12 bytes)
//! `[ End-of-File Marker (8) ] [ Checksum (4) ]`
//!
//! All integers are big-endian.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AudtError, Result};

/// Magic bytes opening every AUDT container.
pub const MAGIC_BYTES: [u8; 20] = [
    b'A', b'U', b'D', b'I', b'T', b'R', b'A', b'N', b'S', b'C', b'R', b'I', b'B', b'E', 0x0E, 0x0F,
    0xA4, 0xD5, 0x1C, 0xED,
];

/// Delimiter written after the header and after every section.
pub const SECTION_DELIMITER: [u8; 4] = [0xE0, 0x5E, 0x05, 0xE5];

/// Marker preceding the checksum at the very end of the file.
pub const EOF_MARKER: [u8; 8] = [0xE0, 0xF0, 0xF1, 0xFE, 0x0F, 0x1F, 0x0E, 0xE0];

/// Magic(20) + Version(4) + CompressorVersion(4) + Delimiter(4) = 32
pub const HEADER_SIZE: usize = 32;

/// EofMarker(8) + Checksum(4) = 12
pub const FOOTER_SIZE: usize = 12;

/// Smallest byte count a container can have.
pub const MIN_CONTAINER_SIZE: usize = HEADER_SIZE + FOOTER_SIZE;

/// Bytes added around every payload: Id(4) + Delimiter(4).
pub const SECTION_OVERHEAD: usize = 8;

/// Modulus of the container checksum (2^31 - 1).
pub const CHECKSUM_MODULUS: i64 = 0x7FFF_FFFF;

/// A 4-byte format version tag.
///
/// Conventionally read as four hex bytes `epoch.major.minor.revision`; the
/// engine only compares tags for equality and looks them up in the registry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionTag(u32);

impl VersionTag {
    /// The version written for new projects.
    pub const CURRENT: Self = Self(0x000B_0003);

    /// Wraps a raw tag value.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value.
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Splits the tag into `[epoch, major, minor, revision]`.
    pub const fn components(&self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl fmt::Debug for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VersionTag({self})")
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// Identifies the logical record stored in a section.
///
/// The discriminants are the on-disk ids, and the declaration order is the
/// canonical order in which sections appear in every version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SectionId {
    /// Skippable-bytes offset for partial rewrites.
    ContainerMetadata = 1,
    /// Quantized, compressed transform magnitudes.
    TransformData = 2,
    /// Compressed audio streams.
    AudioData = 3,
    /// Mutable project scalars.
    ProjectInfo = 4,
    /// Transcribed notes.
    NoteData = 5,
}

impl SectionId {
    /// All sections in canonical order.
    pub const ALL: [SectionId; 5] = [
        Self::ContainerMetadata,
        Self::TransformData,
        Self::AudioData,
        Self::ProjectInfo,
        Self::NoteData,
    ];

    /// The on-disk identifier.
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Maps an on-disk identifier back to a section, if it is one.
    pub fn from_u32(raw: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_u32() == raw)
    }

    /// The section that follows this one in canonical order.
    pub fn next(self) -> Option<Self> {
        Self::from_u32(self.as_u32() + 1)
    }

    /// Human readable name used in reports and errors.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ContainerMetadata => "container-metadata",
            Self::TransformData => "transform-data",
            Self::AudioData => "audio-data",
            Self::ProjectInfo => "project-info-data",
            Self::NoteData => "note-data",
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The fixed 32-byte header at the front of every container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Format version of every section in the file.
    pub version: VersionTag,
    /// Version of the compression library that produced the payloads (diagnostic only).
    pub compressor_version: u32,
}

impl Header {
    /// Creates a new Header.
    pub fn new(version: VersionTag, compressor_version: u32) -> Self {
        Self {
            version,
            compressor_version,
        }
    }

    /// Serializes the header to bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..20].copy_from_slice(&MAGIC_BYTES);
        buf[20..24].copy_from_slice(&self.version.as_u32().to_be_bytes());
        buf[24..28].copy_from_slice(&self.compressor_version.to_be_bytes());
        buf[28..32].copy_from_slice(&SECTION_DELIMITER);
        buf
    }

    /// Parses and validates the header at the front of `bytes`.
    ///
    /// Only the magic and the trailing delimiter are checked here; whether the
    /// version is known is the registry's call.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let Some(head) = bytes.get(..HEADER_SIZE) else {
            return Err(AudtError::format("file smaller than the header"));
        };
        if head[0..20] != MAGIC_BYTES {
            return Err(AudtError::format("invalid magic bytes"));
        }
        if head[28..32] != SECTION_DELIMITER {
            return Err(AudtError::format("header is not terminated by a delimiter"));
        }
        let version = u32::from_be_bytes([head[20], head[21], head[22], head[23]]);
        let compressor_version = u32::from_be_bytes([head[24], head[25], head[26], head[27]]);
        Ok(Self::new(VersionTag::new(version), compressor_version))
    }
}

/// Computes the container checksum over `bytes`.
///
/// Each byte counts as a signed 8-bit value; the sum is reduced modulo 2^31 - 1.
/// The scheme is order independent and cannot see transpositions, but it is what
/// every existing file carries, so it stays as is.
pub fn checksum(bytes: &[u8]) -> i32 {
    let sum: i64 = bytes.iter().map(|&b| i64::from(b as i8)).sum();
    // rem_euclid keeps the value in 0..CHECKSUM_MODULUS, which always fits an i32.
    i32::try_from(sum.rem_euclid(CHECKSUM_MODULUS)).unwrap_or(i32::MAX)
}

/// Builds the footer for a container whose body (header + sections) is `body`.
pub fn footer_for(body: &[u8]) -> [u8; FOOTER_SIZE] {
    let mut buf = [0u8; FOOTER_SIZE];
    buf[0..8].copy_from_slice(&EOF_MARKER);
    let partial = checksum(body) as i64 + checksum(&EOF_MARKER) as i64;
    let sum = i32::try_from(partial.rem_euclid(CHECKSUM_MODULUS)).unwrap_or(i32::MAX);
    buf[8..12].copy_from_slice(&sum.to_be_bytes());
    buf
}

/// Validates the footer of a complete container and returns the stored checksum.
pub fn verify_footer(bytes: &[u8]) -> Result<i32> {
    if bytes.len() < MIN_CONTAINER_SIZE {
        return Err(AudtError::format(format!(
            "file is {} bytes, smaller than header plus footer",
            bytes.len()
        )));
    }
    let checksum_start = bytes.len() - 4;
    let marker_start = bytes.len() - FOOTER_SIZE;
    if bytes[marker_start..checksum_start] != EOF_MARKER {
        return Err(AudtError::format("end-of-file marker mismatch"));
    }
    let stored = i32::from_be_bytes([
        bytes[checksum_start],
        bytes[checksum_start + 1],
        bytes[checksum_start + 2],
        bytes[checksum_start + 3],
    ]);
    let actual = checksum(&bytes[..checksum_start]);
    if stored != actual {
        log::warn!("checksum mismatch: stored {stored}, computed {actual}");
        return Err(AudtError::format(format!(
            "checksum mismatch (stored {stored}, computed {actual})"
        )));
    }
    Ok(stored)
}
