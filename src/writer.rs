//! The write side.
//!
//! A [`ContainerWriter`] accumulates the header, the sections (in canonical
//! order) and the footer in one owned buffer and flushes it exactly once in
//! [`ContainerWriter::finish`]. Nothing touches the destination before that, so
//! a failure at any earlier point leaves the existing file intact.
//!
//! In update mode the immutable prefix (header, metadata, transform, audio) is
//! copied byte for byte from the existing file and only project info and notes
//! are encoded again.

use std::path::{Path, PathBuf};

use crate::codec::ByteWriter;
use crate::compression::default_compressor;
use crate::error::{AudtError, Result};
use crate::format::{FOOTER_SIZE, Header, SectionId, VersionTag, footer_for};
use crate::io::write_atomically;
use crate::reader::ContainerReader;
use crate::records::{
    AudioData, ContainerMetadata, NoteData, ProjectData, ProjectInfo, TransformData,
};
use crate::schema::{Record, Schema, SchemaRegistry};

/// How the writer was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Every section is encoded.
    Full,
    /// The immutable prefix was copied from an existing file.
    Update,
}

/// Builds one container in memory and flushes it atomically.
#[derive(Debug)]
pub struct ContainerWriter {
    target: Option<PathBuf>,
    schema: Schema,
    out: ByteWriter,
    next: Option<SectionId>,
    mode: WriteMode,
    sync: bool,
}

impl ContainerWriter {
    /// An in-memory writer in full mode; finish with [`ContainerWriter::finish_to_vec`].
    pub fn new(version: VersionTag) -> Result<Self> {
        Self::new_with(version, SchemaRegistry::builtin())
    }

    /// Like [`ContainerWriter::new`], resolving `version` in `registry`.
    pub fn new_with(version: VersionTag, registry: &SchemaRegistry) -> Result<Self> {
        let schema = *registry.get(version)?;
        let compressor = default_compressor();
        let header = Header::new(version, compressor.version());
        let mut out = ByteWriter::new(compressor);
        out.write_raw(&header.to_bytes());
        Ok(Self {
            target: None,
            schema,
            out,
            next: Some(SectionId::ContainerMetadata),
            mode: WriteMode::Full,
            sync: false,
        })
    }

    /// A full-mode writer that will replace `path` on [`ContainerWriter::finish`].
    ///
    /// Fails with [`AudtError::UnsupportedVersion`] before touching the disk.
    pub fn create<P: AsRef<Path>>(path: P, version: VersionTag) -> Result<Self> {
        let mut writer = Self::new(version)?;
        writer.target = Some(path.as_ref().to_path_buf());
        Ok(writer)
    }

    /// An update-mode writer over the existing container at `path`.
    ///
    /// The file is fully verified, must already be `version`, and its
    /// skippable-bytes offset must land exactly on the project-info section.
    /// The writer then expects project info and notes only.
    pub fn update<P: AsRef<Path>>(path: P, version: VersionTag) -> Result<Self> {
        let path = path.as_ref();
        let schema = *SchemaRegistry::builtin().get(version)?;

        let mut existing = ContainerReader::open(path)?;
        if existing.version() != version {
            return Err(AudtError::invalid(format!(
                "cannot update a {} file as {version}; write it in full instead",
                existing.version()
            )));
        }
        let metadata = existing.read_metadata()?;
        // Walks the framed prefix; the blobs are copied, never decompressed.
        existing.read_transform()?;
        existing.read_audio()?;
        let skip = validate_skip(metadata, existing.position())?;

        let prefix = existing.as_bytes()[..skip].to_vec();
        log::debug!(
            "update of {}: reusing {skip} of {} bytes",
            path.display(),
            existing.len()
        );
        Ok(Self {
            target: Some(path.to_path_buf()),
            schema,
            out: ByteWriter::with_prefix(prefix, default_compressor()),
            next: Some(SectionId::ProjectInfo),
            mode: WriteMode::Update,
            sync: false,
        })
    }

    /// Calls `fsync` before the final rename.
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// The version being written.
    pub fn version(&self) -> VersionTag {
        self.schema.version()
    }

    /// Full or update.
    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    /// The section the writer expects next, or `None` once all are written.
    pub fn next_section(&self) -> Option<SectionId> {
        self.next
    }

    /// Bytes accumulated so far.
    pub fn len(&self) -> usize {
        self.out.len()
    }

    /// Never `true`: the header is written on construction.
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Appends `record` as the next section.
    ///
    /// # Errors
    /// [`AudtError::InvalidInput`] when `R` is not the next section in canonical
    /// order or cannot be represented in this version. The buffer is left as it
    /// was before the call.
    pub fn write<R: Record>(&mut self, record: &R) -> Result<()> {
        if self.next != Some(R::SECTION) {
            let expected = self.next.map_or("nothing", SectionId::name);
            return Err(AudtError::invalid(format!(
                "cannot write {} here; expected {expected}",
                R::SECTION
            )));
        }
        let mark = self.out.len();
        if let Err(e) = self.schema.write(&mut self.out, record) {
            self.out.truncate(mark);
            return Err(e);
        }
        self.next = R::SECTION.next();
        Ok(())
    }

    /// Writes the container-metadata section.
    pub fn write_metadata(&mut self, record: &ContainerMetadata) -> Result<()> {
        self.write(record)
    }

    /// Writes the transform-data section.
    pub fn write_transform(&mut self, record: &TransformData) -> Result<()> {
        self.write(record)
    }

    /// Writes the audio-data section.
    pub fn write_audio(&mut self, record: &AudioData) -> Result<()> {
        self.write(record)
    }

    /// Writes the project-info section.
    pub fn write_project_info(&mut self, record: &ProjectInfo) -> Result<()> {
        self.write(record)
    }

    /// Writes the note-data section.
    pub fn write_notes(&mut self, record: &NoteData) -> Result<()> {
        self.write(record)
    }

    /// Writes every section that is still pending, taking records from `data`.
    ///
    /// In update mode only project info and notes are written; the prefix
    /// records in `data` are ignored.
    pub fn write_project(&mut self, data: &ProjectData) -> Result<()> {
        while let Some(section) = self.next {
            match section {
                SectionId::ContainerMetadata => self.write(&data.metadata)?,
                SectionId::TransformData => self.write(&data.transform)?,
                SectionId::AudioData => self.write(&data.audio)?,
                SectionId::ProjectInfo => self.write(&data.project_info)?,
                SectionId::NoteData => self.write(&data.notes)?,
            }
        }
        Ok(())
    }

    /// Appends the footer and returns the finished container.
    pub fn finish_to_vec(self) -> Result<Vec<u8>> {
        if let Some(missing) = self.next {
            return Err(AudtError::invalid(format!(
                "container is incomplete: {missing} was never written"
            )));
        }
        let mut bytes = self.out.into_inner();
        bytes.reserve(FOOTER_SIZE);
        let footer = footer_for(&bytes);
        bytes.extend_from_slice(&footer);
        Ok(bytes)
    }

    /// Appends the footer and atomically replaces the target file.
    ///
    /// Returns the number of bytes written.
    pub fn finish(mut self) -> Result<usize> {
        let Some(target) = self.target.take() else {
            return Err(AudtError::invalid(
                "in-memory writer has no target; use finish_to_vec",
            ));
        };
        let sync = self.sync;
        let mode = self.mode;
        let bytes = self.finish_to_vec()?;
        write_atomically(&target, &bytes, sync)?;
        log::info!(
            "wrote {} ({} bytes, {mode:?} mode)",
            target.display(),
            bytes.len()
        );
        Ok(bytes.len())
    }
}

/// Checks that the stored offset is where the project-info section really starts.
fn validate_skip(metadata: ContainerMetadata, project_info_offset: usize) -> Result<usize> {
    let skip = metadata.skippable_bytes as usize;
    if skip != project_info_offset {
        log::warn!(
            "skippable bytes {skip} do not point at the project-info section (at {project_info_offset})"
        );
        return Err(AudtError::payload(format!(
            "skippable bytes {skip} do not point at the project-info section (at {project_info_offset})"
        )));
    }
    Ok(skip)
}
