//! # AUDT
//!
//! A versioned, checksum-protected binary container for audio transcription
//! projects.
//!
//! ## Overview
//!
//! One `.audt` file holds everything a transcription project needs: the decoded
//! audio (opaque, already compressed by the caller), a large spectrogram-like
//! magnitude matrix, and the small records the user edits all the time (key,
//! tempo, time signature, notes). The crate is the container engine only; it does
//! not decode audio or compute the matrix.
//!
//! ### Key Features
//!
//! *   **Frozen, versioned layouts:** every format version keeps its own byte
//!     layout for each record forever, so files written years ago stay readable.
//!     New projects are always written at [`VersionTag::CURRENT`].
//! *   **Partial rewrites:** the file starts with an immutable prefix (audio and
//!     the compressed matrix) and ends with a small mutable tail. Saving an edit
//!     copies the prefix byte for byte and re-encodes only the tail.
//! *   **Deterministic failure:** a bad magic, end-of-file marker or checksum, an
//!     unknown version, a section in the wrong place, or a payload that does not
//!     decode each map to a distinct [`AudtError`] variant.
//!
//! ## File Format
//!
//! ```text
//! [Header 32b] [Metadata] [Transform] [Audio] [Project Info] [Notes] [Footer 12b]
//!              |<------- immutable prefix ------>|<-- mutable tail -->|
//! ```
//!
//! Each section is `[id u32] [payload] [delimiter]`. The footer is an
//! end-of-file marker and a checksum over every preceding byte. See [`format`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use audt::{Audt, AudtOptions};
//!
//! # fn main() -> audt::Result<()> {
//! let options = AudtOptions::new().backup_dir("backups");
//! let mut project = Audt::load_with("song.audt", &options)?;
//!
//! project.data.project_info.bpm = 128.0;
//! Audt::update_with("song.audt", &project.data.project_info, &project.data.notes, &options)?;
//! # Ok(())
//! # }
//! ```
//!
//! Lower-level control is available through [`ContainerReader`] and
//! [`ContainerWriter`], which read and write one section at a time in canonical
//! order.
//!
//! ### Safety and Error Handling
//!
//! * **No unsafe code:** enforced with `#![deny(unsafe_code)]`.
//! * **No Panics:** No `unwrap()` or `panic!()` calls in the library (enforced by clippy lints).
//! * **Comprehensive Errors:** All failures correspond to an [`AudtError`] type.
//! * **Atomic writes:** a container is flushed once, through a temporary file that
//!   replaces the target, so a failed save never damages the previous file.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

// --- PUBLIC API MODULES ---
pub mod api;
pub mod backup;
pub mod codec;
pub mod compression;
pub mod error;
pub mod format;
pub mod inspector;
pub mod music;
pub mod quantize;
pub mod reader;
pub mod records;
pub mod schema;
pub mod section;
pub mod writer;

// --- INTERNAL IMPLEMENTATION MODULES (Hidden from Docs) ---
#[doc(hidden)]
pub mod io;

// --- RE-EXPORTS ---

pub use compression::{Compressor, Lz4Compressor};

pub use api::{Audt, AudtOptions};
pub use error::{AudtError, CorruptKind, Result};
pub use format::{SectionId, VersionTag};
pub use inspector::{ContainerInspector, ContainerReport};
pub use music::{MusicKey, TimeSignature};
pub use reader::ContainerReader;
pub use records::{
    AudioData, ContainerMetadata, LoadedProject, Note, NoteData, ProjectData, ProjectInfo,
    TransformData,
};
pub use schema::{Schema, SchemaRegistry};
pub use writer::{ContainerWriter, WriteMode};
