//! Centralized error handling for AUDT containers.
//!
//! Every failure in the engine is reported through [`AudtError`]; nothing in the
//! library panics. The taxonomy separates the one routine outcome from the fatal
//! ones:
//!
//! - **Unsupported version** ([`AudtError::UnsupportedVersion`]): the file (or the
//!   requested target) uses a version tag the registry does not know. This is the
//!   only variant a caller is expected to handle as part of normal flow.
//! - **Corruption** ([`AudtError::Corrupt`]): the bytes on disk are structurally
//!   wrong. The [`CorruptKind`] says where the damage was found. Never retryable.
//! - **I/O** ([`AudtError::Io`]): disk full, permission denied and friends,
//!   propagated unchanged.
//! - **Caller mistakes** ([`AudtError::InvalidInput`]): a record that cannot be
//!   represented in the target layout, sections written out of order, and so on.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use audt::{Audt, AudtError, CorruptKind};
//!
//! match Audt::load("song.audt") {
//!     Ok(project) => println!("loaded a {} project", project.version),
//!     Err(AudtError::UnsupportedVersion(v)) => eprintln!("cannot read version {v}"),
//!     Err(AudtError::Corrupt(CorruptKind::IncorrectContainerFormat(why))) => {
//!         eprintln!("not an AUDT file: {why}")
//!     }
//!     Err(e) => eprintln!("failed: {e}"),
//! }
//! ```

use std::fmt;
use std::io;
use std::sync::Arc;

use crate::format::{SectionId, VersionTag};

/// A specialized `Result` type for AUDT operations.
pub type Result<T> = std::result::Result<T, AudtError>;

/// The master error enum covering all failure domains of the container engine.
///
/// This type is `Clone`; I/O errors are wrapped in an `Arc` so that cloning stays cheap.
#[derive(Debug, Clone)]
pub enum AudtError {
    /// Low-level I/O failure, passed through untouched.
    Io(Arc<io::Error>),

    /// The version tag is not registered.
    ///
    /// Raised when opening a file written by a newer (or pre-release) program, and
    /// when a writer is asked for a version it cannot produce.
    UnsupportedVersion(VersionTag),

    /// The container is structurally damaged. See [`CorruptKind`].
    Corrupt(CorruptKind),

    /// Fixed-width scalar encoding failed inside the primitive codec.
    Serialization(String),

    /// The caller asked for something the format cannot express.
    InvalidInput(String),
}

/// Where and how a container was found to be corrupt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorruptKind {
    /// Header magic, header delimiter, end-of-file marker or checksum mismatch.
    IncorrectContainerFormat(String),

    /// A section started with the wrong identifier.
    SectionIdMismatch {
        /// The section the caller asked for.
        expected: SectionId,
        /// The raw identifier found on disk.
        actual: u32,
    },

    /// A section's payload was not followed by the delimiter constant.
    MissingEndOfSectionDelimiter {
        /// The section whose trailing delimiter was wrong.
        section: SectionId,
    },

    /// A read would have run past the end of the section area.
    Truncated {
        /// Absolute offset of the attempted read.
        offset: usize,
        /// Bytes the read needed.
        needed: usize,
        /// Bytes that were actually left.
        remaining: usize,
    },

    /// A payload failed to decompress or decoded to an impossible value.
    CorruptPayload(String),
}

impl AudtError {
    /// Shorthand for an [`CorruptKind::IncorrectContainerFormat`] error.
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::Corrupt(CorruptKind::IncorrectContainerFormat(msg.into()))
    }

    /// Shorthand for a [`CorruptKind::CorruptPayload`] error.
    pub(crate) fn payload(msg: impl Into<String>) -> Self {
        Self::Corrupt(CorruptKind::CorruptPayload(msg.into()))
    }

    /// Shorthand for an [`AudtError::InvalidInput`] error.
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Returns `true` for any [`AudtError::Corrupt`] variant.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt(_))
    }

    /// Returns `true` when a section id or delimiter check failed.
    pub fn is_section_framing(&self) -> bool {
        matches!(
            self,
            Self::Corrupt(
                CorruptKind::SectionIdMismatch { .. }
                    | CorruptKind::MissingEndOfSectionDelimiter { .. }
            )
        )
    }
}

impl fmt::Display for AudtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O Error: {e}"),
            Self::UnsupportedVersion(v) => write!(f, "Unsupported Version: {v}"),
            Self::Corrupt(kind) => write!(f, "Corrupt Container: {kind}"),
            Self::Serialization(s) => write!(f, "Serialization Error: {s}"),
            Self::InvalidInput(s) => write!(f, "Invalid Input: {s}"),
        }
    }
}

impl fmt::Display for CorruptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncorrectContainerFormat(s) => write!(f, "incorrect container format ({s})"),
            Self::SectionIdMismatch { expected, actual } => write!(
                f,
                "expected section {} ({expected}) but found id {actual}",
                expected.as_u32()
            ),
            Self::MissingEndOfSectionDelimiter { section } => {
                write!(f, "missing end-of-section delimiter after {section}")
            }
            Self::Truncated {
                offset,
                needed,
                remaining,
            } => write!(
                f,
                "read of {needed} bytes at offset {offset} overruns the section area ({remaining} left)"
            ),
            Self::CorruptPayload(s) => write!(f, "corrupt payload ({s})"),
        }
    }
}

impl std::error::Error for AudtError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for AudtError {
    fn from(err: io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}
