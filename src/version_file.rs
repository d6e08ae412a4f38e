//! Version file persistence
//!
//! A version file holds exactly one canonical version followed by a newline.
//! Writes go to a temporary sibling and are renamed into place, so readers
//! observe either the old or the new content, never a partial write.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{BumpLevel, SemanticVersion};
use crate::error::{ModbumpError, Result};
use crate::git::TagSource;

/// Version written when no usable tag exists
pub const FALLBACK_VERSION: &str = "0.1.0";

/// Reject paths that cannot name a version file
pub fn validate_path(path: &Path) -> Result<()> {
    let text = path.to_string_lossy();
    if text.is_empty() {
        return Err(ModbumpError::path("version file path is empty"));
    }
    if text.contains('\0') {
        return Err(ModbumpError::path(format!(
            "version file path contains a NUL byte: {:?}",
            text
        )));
    }
    if path.file_name().is_none() {
        return Err(ModbumpError::path(format!(
            "version file path has no file name: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Read and parse the version stored at `path`
///
/// # Returns
/// * `Ok(SemanticVersion)` - Parsed version
/// * `Err(VersionFileNotFound)` - If the file does not exist
/// * `Err(InvalidVersionFormat)` - If the content does not parse
pub fn read_version(path: &Path) -> Result<SemanticVersion> {
    validate_path(path)?;

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ModbumpError::VersionFileNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    SemanticVersion::parse(&content)
}

/// Persist `version` to `path`, creating parent directories as needed
pub fn save_version(path: &Path, version: &SemanticVersion) -> Result<()> {
    validate_path(path)?;

    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent)?;
            parent
        }
        None => Path::new("."),
    };

    write_then_rename(parent, path, &format!("{}\n", version))?;

    debug!(path = %path.display(), version = %version, "saved version file");
    Ok(())
}

/// Write through a uniquely named sibling temp file, then rename it over `path`
///
/// The temp file is removed when any step before the rename fails.
fn write_then_rename(dir: &Path, path: &Path, content: &str) -> Result<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{}.", name))
        .suffix(".tmp")
        .tempfile_in(dir)?;
    temp.write_all(content.as_bytes())?;
    temp.as_file().sync_all()?;

    temp.persist(path).map_err(|e| e.error)?;

    if let Ok(dir) = File::open(dir) {
        let _ = dir.sync_all();
    }
    Ok(())
}

/// Read, bump and write back the version at `path`
///
/// Parse errors propagate verbatim; the file is untouched on any failure.
pub fn update_version(
    path: &Path,
    level: BumpLevel,
    pre_release: &str,
    build_metadata: &str,
    preserve_build: bool,
) -> Result<SemanticVersion> {
    let current = read_version(path)?;
    let next = current.bump(level, pre_release, build_metadata, preserve_build)?;
    save_version(path, &next)?;

    info!(
        path = %path.display(),
        from = %current,
        to = %next,
        level = %level,
        "updated version"
    );
    Ok(next)
}

/// Creates version files, seeding them from an injected tag source
#[derive(Clone)]
pub struct VersionInitializer {
    tag_source: Arc<dyn TagSource>,
}

impl VersionInitializer {
    pub fn new(tag_source: Arc<dyn TagSource>) -> Self {
        VersionInitializer { tag_source }
    }

    /// Create the version file at `path` unless it already exists
    ///
    /// The initial version comes from the tag source when its tag parses,
    /// otherwise [`FALLBACK_VERSION`] is written.
    pub fn initialize(&self, path: &Path) -> Result<()> {
        validate_path(path)?;
        if path.exists() {
            return Ok(());
        }

        let version = self.initial_version();
        save_version(path, &version)?;
        info!(path = %path.display(), version = %version, "created version file");
        Ok(())
    }

    /// Like [`initialize`](Self::initialize), reporting whether a file was created
    ///
    /// Returns `Ok(false)` as soon as the file exists, whether or not its
    /// content is a valid version.
    pub fn initialize_with_feedback(&self, path: &Path) -> Result<bool> {
        validate_path(path)?;
        if path.exists() {
            return Ok(false);
        }

        self.initialize(path)?;
        Ok(true)
    }

    fn initial_version(&self) -> SemanticVersion {
        let fallback = SemanticVersion::new(0, 1, 0);

        match self.tag_source.latest_tag() {
            Ok(tag) => match SemanticVersion::parse(&tag) {
                Ok(version) => version,
                Err(e) => {
                    warn!(tag = %tag, error = %e, "latest tag is not a version, using {}", FALLBACK_VERSION);
                    fallback
                }
            },
            Err(e) => {
                debug!(error = %e, "no tag available, using {}", FALLBACK_VERSION);
                fallback
            }
        }
    }
}
