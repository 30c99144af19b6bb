//! High-level entry points.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backup::backup_file;
use crate::error::Result;
use crate::format::VersionTag;
use crate::inspector::{ContainerInspector, ContainerReport};
use crate::reader::ContainerReader;
use crate::records::{LoadedProject, NoteData, ProjectData, ProjectInfo};
use crate::schema::schema_for;
use crate::writer::ContainerWriter;

/// Settings for [`Audt`] operations, built fluently.
///
/// ```rust
/// use audt::{Audt, VersionTag};
///
/// let options = Audt::builder()
///     .version(VersionTag::CURRENT)
///     .backup_dir("backups")
///     .sync(true);
/// assert!(options.sync);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudtOptions {
    /// Version written by saves and expected by updates.
    pub version: VersionTag,
    /// Where copies of files written by other versions are kept. `None` disables backups.
    pub backup_dir: Option<PathBuf>,
    /// Whether to `fsync` before the final rename.
    pub sync: bool,
}

impl Default for AudtOptions {
    fn default() -> Self {
        Self {
            version: VersionTag::CURRENT,
            backup_dir: None,
            sync: false,
        }
    }
}

impl AudtOptions {
    /// Default options: current version, no backups, no fsync.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target version.
    #[must_use]
    pub fn version(mut self, version: VersionTag) -> Self {
        self.version = version;
        self
    }

    /// Enables backups into `dir`.
    #[must_use]
    pub fn backup_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.backup_dir = Some(dir.into());
        self
    }

    /// Enables or disables `fsync` on flush.
    #[must_use]
    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }
}

/// The main entry point for loading and saving projects.
#[derive(Debug)]
pub struct Audt;

impl Audt {
    /// Starts building [`AudtOptions`].
    pub fn builder() -> AudtOptions {
        AudtOptions::new()
    }

    /// Loads a project with default options.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<LoadedProject> {
        Self::load_with(path, &AudtOptions::default())
    }

    /// Loads a project.
    ///
    /// When the file's version differs from `options.version` and a backup
    /// directory is configured, the file is copied there first.
    pub fn load_with<P: AsRef<Path>>(path: P, options: &AudtOptions) -> Result<LoadedProject> {
        let path = path.as_ref();
        let reader = ContainerReader::open(path)?;
        if reader.version() != options.version
            && let Some(dir) = &options.backup_dir
        {
            backup_file(path, reader.version(), dir)?;
        }
        reader.into_loaded()
    }

    /// Writes `data` in full at the current version.
    ///
    /// The container-metadata record is recomputed, so the result always
    /// supports [`Audt::update`]. Returns the number of bytes written.
    pub fn save<P: AsRef<Path>>(path: P, data: &ProjectData) -> Result<usize> {
        Self::save_with(path, data, &AudtOptions::default())
    }

    /// Writes `data` in full at `options.version`.
    ///
    /// An existing file of another version at `path` is backed up first when a
    /// backup directory is configured.
    pub fn save_with<P: AsRef<Path>>(
        path: P,
        data: &ProjectData,
        options: &AudtOptions,
    ) -> Result<usize> {
        let path = path.as_ref();
        let schema = schema_for(options.version)?;
        let data = data.clone().with_computed_metadata(&schema)?;

        if let Some(dir) = &options.backup_dir {
            Self::backup_outdated(path, options.version, dir)?;
        }

        let mut writer = ContainerWriter::create(path, options.version)?.with_sync(options.sync);
        writer.write_project(&data)?;
        writer.finish()
    }

    /// Rewrites only the project-info and note sections of an existing file.
    pub fn update<P: AsRef<Path>>(path: P, info: &ProjectInfo, notes: &NoteData) -> Result<usize> {
        Self::update_with(path, info, notes, &AudtOptions::default())
    }

    /// Rewrites only the project-info and note sections; the file must already
    /// be `options.version`.
    pub fn update_with<P: AsRef<Path>>(
        path: P,
        info: &ProjectInfo,
        notes: &NoteData,
        options: &AudtOptions,
    ) -> Result<usize> {
        let mut writer = ContainerWriter::update(path, options.version)?.with_sync(options.sync);
        writer.write_project_info(info)?;
        writer.write_notes(notes)?;
        writer.finish()
    }

    /// Returns a structural report of a container.
    pub fn inspect<P: AsRef<Path>>(path: P) -> Result<ContainerReport> {
        ContainerInspector::inspect(path)
    }

    fn backup_outdated(path: &Path, target: VersionTag, dir: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        match ContainerReader::open(path) {
            Ok(existing) if existing.version() != target => {
                backup_file(path, existing.version(), dir)?;
            }
            Ok(_) => {}
            Err(e) => log::warn!("not backing up unreadable {}: {e}", path.display()),
        }
        Ok(())
    }
}
