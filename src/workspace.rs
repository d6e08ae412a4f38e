//! Workspace module discovery
//!
//! A module is any directory under the workspace root that contains a version
//! file. Directories matched by the workspace ignore file are pruned before
//! they are visited; `.git` is always skipped.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::ignore::IgnoreFile;
use crate::version_file::read_version;

/// A versioned unit inside the workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Path relative to the workspace root (root module: directory name)
    pub name: String,
    /// Directory holding the version file
    pub path: PathBuf,
    /// Version as last read or written; empty when the file is unreadable
    pub current_version: String,
}

impl Module {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        current_version: impl Into<String>,
    ) -> Self {
        Module {
            name: name.into(),
            path: path.into(),
            current_version: current_version.into(),
        }
    }

    /// Location of this module's version file
    pub fn version_file(&self, file_name: &str) -> PathBuf {
        self.path.join(file_name)
    }
}

/// Load `<root>/<file_name>`, or an empty matcher when it does not exist
pub fn load_ignore_file(root: &Path, file_name: &str) -> Result<IgnoreFile> {
    let path = root.join(file_name);
    if path.is_file() {
        IgnoreFile::load(&path)
    } else {
        Ok(IgnoreFile::default())
    }
}

/// Find all modules under `root`, in sorted depth-first order
pub fn discover_modules(
    root: &Path,
    version_file_name: &str,
    ignore: &IgnoreFile,
) -> Result<Vec<Module>> {
    let root_name = root
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| ".".to_string());

    let mut modules = Vec::new();
    walk(root, root, &root_name, version_file_name, ignore, &mut modules)?;

    debug!(root = %root.display(), count = modules.len(), "discovered modules");
    Ok(modules)
}

fn walk(
    root: &Path,
    dir: &Path,
    root_name: &str,
    version_file_name: &str,
    ignore: &IgnoreFile,
    modules: &mut Vec<Module>,
) -> Result<()> {
    let version_path = dir.join(version_file_name);
    if version_path.is_file() {
        let relative = relative_path(root, dir);
        let name = if relative.is_empty() {
            root_name.to_string()
        } else {
            relative
        };
        let current_version = match read_version(&version_path) {
            Ok(version) => version.to_string(),
            Err(e) => {
                warn!(module = %name, "unreadable version file: {}", e);
                String::new()
            }
        };
        modules.push(Module::new(name, dir, current_version));
    }

    let mut children: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|entry| entry.path())
        .collect();
    children.sort();

    for child in children {
        if child.file_name().is_some_and(|n| n == ".git") {
            continue;
        }
        let relative = relative_path(root, &child);
        if ignore.matches(&relative) {
            debug!(path = %relative, "skipping ignored directory");
            continue;
        }
        walk(root, &child, root_name, version_file_name, ignore, modules)?;
    }

    Ok(())
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
