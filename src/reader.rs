//! The read side.
//!
//! The whole file is loaded into memory and validated (header, end-of-file
//! marker, checksum, version) before any section is decoded. Sections are then
//! consumed in canonical order through one bounds-checked cursor that stops
//! short of the footer.

use std::path::Path;
use std::sync::Arc;

use crate::codec::ByteCursor;
use crate::compression::{Compressor, default_compressor};
use crate::error::{AudtError, Result};
use crate::format::{FOOTER_SIZE, HEADER_SIZE, Header, MIN_CONTAINER_SIZE, VersionTag, verify_footer};
use crate::records::{
    AudioData, ContainerMetadata, LoadedProject, NoteData, ProjectData, ProjectInfo, TransformData,
};
use crate::schema::{Record, Schema, SchemaRegistry};

/// The main handle for reading an AUDT container.
#[derive(Debug)]
pub struct ContainerReader {
    bytes: Vec<u8>,
    header: Header,
    schema: Schema,
    checksum: i32,
    pos: usize,
    compressor: Arc<dyn Compressor>,
    poisoned: bool,
}

impl ContainerReader {
    /// Reads a file into memory and validates it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        log::debug!("opened {} ({} bytes)", path.display(), bytes.len());
        Self::from_bytes(bytes)
    }

    /// Validates an in-memory container against the built-in versions.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_bytes_with(bytes, SchemaRegistry::builtin())
    }

    /// Validates an in-memory container, resolving its version in `registry`.
    ///
    /// # Errors
    /// [`CorruptKind::IncorrectContainerFormat`](crate::CorruptKind::IncorrectContainerFormat)
    /// for a short file, bad magic, bad header delimiter, bad end-of-file marker or
    /// checksum mismatch (checked in that order), then
    /// [`AudtError::UnsupportedVersion`] for an unknown version tag.
    pub fn from_bytes_with(bytes: Vec<u8>, registry: &SchemaRegistry) -> Result<Self> {
        if bytes.len() < MIN_CONTAINER_SIZE {
            log::warn!("rejecting {} byte file: too short", bytes.len());
            return Err(AudtError::format(format!(
                "file is {} bytes, need at least {MIN_CONTAINER_SIZE}",
                bytes.len()
            )));
        }
        let header = Header::parse(&bytes)?;
        let checksum = verify_footer(&bytes)?;
        let schema = *registry.get(header.version).inspect_err(|_| {
            log::warn!("no schema registered for version {}", header.version);
        })?;
        log::info!(
            "dispatching container version {} (compressor {})",
            header.version,
            header.compressor_version
        );

        Ok(Self {
            bytes,
            header,
            schema,
            checksum,
            pos: HEADER_SIZE,
            compressor: default_compressor(),
            poisoned: false,
        })
    }

    /// Format version from the header.
    pub fn version(&self) -> VersionTag {
        self.header.version
    }

    /// Compression-library version from the header.
    pub fn compressor_version(&self) -> u32 {
        self.header.compressor_version
    }

    /// Checksum stored in (and verified against) the footer.
    pub fn checksum(&self) -> i32 {
        self.checksum
    }

    /// The schema chosen for this file.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Total file length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always `false` for a reader that opened successfully.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Offset of the next unread section.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes between the read position and the footer.
    pub fn remaining(&self) -> usize {
        self.section_end() - self.pos
    }

    /// Whether a previous read failed. A poisoned reader refuses every further read.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// The whole file as loaded.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn section_end(&self) -> usize {
        self.bytes.len() - FOOTER_SIZE
    }

    /// Reads the next section as `R`.
    ///
    /// Reading the wrong kind of record fails with
    /// [`CorruptKind::SectionIdMismatch`](crate::CorruptKind::SectionIdMismatch).
    /// Any failure poisons the reader.
    pub fn read_next<R: Record>(&mut self) -> Result<R> {
        if self.poisoned {
            return Err(AudtError::invalid(
                "reader is unusable after a failed read; reopen the file",
            ));
        }
        let section_end = self.section_end();
        let mut cursor = ByteCursor::bounded(
            &self.bytes,
            self.pos,
            section_end,
            Arc::clone(&self.compressor),
        )?;
        match self.schema.read::<R>(&mut cursor) {
            Ok(record) => {
                self.pos = cursor.position();
                Ok(record)
            }
            Err(e) => {
                log::warn!("reading {} failed at offset {}: {e}", R::SECTION, self.pos);
                self.poisoned = true;
                Err(e)
            }
        }
    }

    /// Reads the container-metadata section.
    pub fn read_metadata(&mut self) -> Result<ContainerMetadata> {
        self.read_next()
    }

    /// Reads the transform-data section.
    pub fn read_transform(&mut self) -> Result<TransformData> {
        self.read_next()
    }

    /// Reads the audio-data section.
    pub fn read_audio(&mut self) -> Result<AudioData> {
        self.read_next()
    }

    /// Reads the project-info section.
    pub fn read_project_info(&mut self) -> Result<ProjectInfo> {
        self.read_next()
    }

    /// Reads the note-data section.
    pub fn read_notes(&mut self) -> Result<NoteData> {
        self.read_next()
    }

    /// Reads all five sections and checks that nothing follows them.
    pub fn read_project(&mut self) -> Result<ProjectData> {
        let data = ProjectData {
            metadata: self.read_metadata()?,
            transform: self.read_transform()?,
            audio: self.read_audio()?,
            project_info: self.read_project_info()?,
            notes: self.read_notes()?,
        };
        let trailing = self.remaining();
        if trailing != 0 {
            self.poisoned = true;
            return Err(AudtError::payload(format!(
                "{trailing} unexpected bytes after the last section"
            )));
        }
        Ok(data)
    }

    /// Reads the whole project and pairs it with the file's version.
    pub fn into_loaded(mut self) -> Result<LoadedProject> {
        let data = self.read_project()?;
        Ok(LoadedProject {
            version: self.version(),
            data,
        })
    }
}
