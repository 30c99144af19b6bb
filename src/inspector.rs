//! Tools for inspecting the physical structure of AUDT containers.
//! Useful for debugging new format versions and partial rewrites.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::format::{FOOTER_SIZE, HEADER_SIZE, SectionId, VersionTag};
use crate::reader::ContainerReader;

/// A structural report of an AUDT container.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerReport {
    /// Total size of the file.
    pub file_size: usize,
    /// Format version from the header.
    pub version: VersionTag,
    /// Compression-library version from the header.
    pub compressor_version: u32,
    /// Verified checksum from the footer.
    pub checksum: i32,
    /// Offset stored in the container-metadata section.
    pub skippable_bytes: u32,
    /// Whether that offset is where the project-info section actually starts,
    /// i.e. whether the file supports a partial rewrite.
    pub partial_rewrite_ready: bool,
    /// Sections in file order.
    pub sections: Vec<SectionInfo>,
}

/// Placement and a short description of one section.
#[derive(Debug, Clone, Serialize)]
pub struct SectionInfo {
    /// On-disk identifier.
    pub id: u32,
    /// Section name.
    pub name: &'static str,
    /// Absolute offset of the identifier.
    pub offset: usize,
    /// Length including identifier and delimiter.
    pub length: usize,
    /// One-line description of the decoded record.
    pub summary: String,
}

/// The AUDT inspector tool.
#[derive(Debug)]
pub struct ContainerInspector;

impl ContainerInspector {
    /// Analyzes a file and returns a structural report.
    pub fn inspect<P: AsRef<Path>>(path: P) -> Result<ContainerReport> {
        Self::inspect_reader(ContainerReader::open(path)?)
    }

    /// Analyzes an in-memory container.
    pub fn inspect_bytes(bytes: Vec<u8>) -> Result<ContainerReport> {
        Self::inspect_reader(ContainerReader::from_bytes(bytes)?)
    }

    fn inspect_reader(mut reader: ContainerReader) -> Result<ContainerReport> {
        let mut sections = Vec::with_capacity(SectionId::ALL.len());

        let offset = reader.position();
        let metadata = reader.read_metadata()?;
        sections.push(Self::section(
            SectionId::ContainerMetadata,
            offset,
            reader.position(),
            format!("skippable bytes {}", metadata.skippable_bytes),
        ));

        let offset = reader.position();
        let transform = reader.read_transform()?;
        let shape = match transform.quantized() {
            Ok(q) => format!("{}x{} matrix", q.rows(), q.cols()),
            Err(_) => "undecodable matrix".to_string(),
        };
        sections.push(Self::section(
            SectionId::TransformData,
            offset,
            reader.position(),
            format!(
                "{shape}, range [{}, {}], {}b compressed",
                transform.min(),
                transform.max(),
                transform.blob().len()
            ),
        ));

        let offset = reader.position();
        let audio = reader.read_audio()?;
        let slowed = audio
            .slowed
            .as_ref()
            .map(|s| format!(" + {}b slowed", s.len()))
            .unwrap_or_default();
        sections.push(Self::section(
            SectionId::AudioData,
            offset,
            reader.position(),
            format!(
                "{}b audio{slowed}, {} Hz, {} ms",
                audio.original.len(),
                audio.sample_rate,
                audio.duration_ms
            ),
        ));

        let project_info_offset = reader.position();
        let info = reader.read_project_info()?;
        sections.push(Self::section(
            SectionId::ProjectInfo,
            project_info_offset,
            reader.position(),
            format!(
                "{:?}, {}, {}, {} BPM",
                info.name.as_deref().unwrap_or("<unnamed>"),
                info.key,
                info.time_signature,
                info.bpm
            ),
        ));

        let offset = reader.position();
        let notes = reader.read_notes()?;
        sections.push(Self::section(
            SectionId::NoteData,
            offset,
            reader.position(),
            format!("{} notes", notes.len()),
        ));

        Ok(ContainerReport {
            file_size: reader.len(),
            version: reader.version(),
            compressor_version: reader.compressor_version(),
            checksum: reader.checksum(),
            skippable_bytes: metadata.skippable_bytes,
            partial_rewrite_ready: metadata.skippable_bytes as usize == project_info_offset,
            sections,
        })
    }

    fn section(id: SectionId, start: usize, end: usize, summary: String) -> SectionInfo {
        SectionInfo {
            id: id.as_u32(),
            name: id.name(),
            offset: start,
            length: end - start,
            summary,
        }
    }
}

impl fmt::Display for ContainerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== AUDT INSPECTOR REPORT ===")?;
        writeln!(f, "File Size:      {}b", self.file_size)?;
        writeln!(f, "Version:        {}", self.version)?;
        writeln!(f, "Compressor:     {}", self.compressor_version)?;
        writeln!(f, "Checksum:       {}", self.checksum)?;
        writeln!(
            f,
            "Skippable:      {}b{}",
            self.skippable_bytes,
            if self.partial_rewrite_ready { "" } else { " (stale)" }
        )?;
        writeln!(f, "\n[LAYOUT]")?;
        writeln!(f, "├── [header] @0 Size: {HEADER_SIZE}b")?;
        for section in &self.sections {
            writeln!(
                f,
                "├── [{}] @{} Size: {}b | {}",
                section.name, section.offset, section.length, section.summary
            )?;
        }
        writeln!(
            f,
            "└── [footer] @{} Size: {FOOTER_SIZE}b",
            self.file_size.saturating_sub(FOOTER_SIZE)
        )
    }
}
