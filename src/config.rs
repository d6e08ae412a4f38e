use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::TagPattern;
use crate::error::{ModbumpError, Result};

/// File name looked up in the working directory and the user config directory
pub const CONFIG_FILE_NAME: &str = "modbump.toml";

/// Complete modbump configuration.
///
/// Every field has a default, so an empty file (or no file at all) is valid.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Name of the per-module version file
    #[serde(default = "default_version_file")]
    pub version_file: String,

    /// Name of the workspace ignore file, relative to the workspace root
    #[serde(default = "default_ignore_file")]
    pub ignore_file: String,

    /// Tag pattern for nested modules; supports `{module}` and `{version}`
    #[serde(default = "default_tag_pattern")]
    pub tag_pattern: String,

    /// Tag pattern for the module at the workspace root
    #[serde(default = "default_root_tag_pattern")]
    pub root_tag_pattern: String,

    #[serde(default)]
    pub executor: ExecutorConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

fn default_version_file() -> String {
    "VERSION".to_string()
}

fn default_ignore_file() -> String {
    ".modbumpignore".to_string()
}

fn default_tag_pattern() -> String {
    "{module}/v{version}".to_string()
}

fn default_root_tag_pattern() -> String {
    "v{version}".to_string()
}

/// Execution policy used when the command line does not override it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ExecutorConfig {
    #[serde(default)]
    pub parallel: bool,

    #[serde(default)]
    pub fail_fast: bool,

    /// Upper bound on concurrently processed modules; 0 means unbounded
    #[serde(default)]
    pub max_concurrency: usize,

    /// Deadline for a whole run, in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ExecutorConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// When to emit ANSI colours on the terminal
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Colour only when the stream is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub color: ColorMode,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            version_file: default_version_file(),
            ignore_file: default_ignore_file(),
            tag_pattern: default_tag_pattern(),
            root_tag_pattern: default_root_tag_pattern(),
            executor: ExecutorConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Parse a TOML document and validate it
    pub fn from_toml(content: &str) -> Result<Config> {
        let config: Config =
            toml::from_str(content).map_err(|e| ModbumpError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would only fail later, mid-run
    pub fn validate(&self) -> Result<()> {
        for (key, name) in [
            ("version_file", &self.version_file),
            ("ignore_file", &self.ignore_file),
        ] {
            if name.trim().is_empty() {
                return Err(ModbumpError::config(format!("{} must not be empty", key)));
            }
            if name.contains('/') || name.contains('\\') {
                return Err(ModbumpError::config(format!(
                    "{} must be a plain file name, got '{}'",
                    key, name
                )));
            }
        }
        self.tag_patterns()?;
        Ok(())
    }

    /// Compiled `(root, module)` tag patterns
    pub fn tag_patterns(&self) -> Result<(TagPattern, TagPattern)> {
        Ok((
            TagPattern::new(&self.root_tag_pattern)?,
            TagPattern::new(&self.tag_pattern)?,
        ))
    }
}

/// Loads configuration from file or returns defaults.
///
/// Lookup order:
/// 1. `config_path`, when given (it must exist)
/// 2. `modbump.toml` in the current directory
/// 3. `modbump.toml` in the user config directory
/// 4. [`Config::default`]
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let path = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(),
    };

    let Some(path) = path else {
        return Ok(Config::default());
    };

    let content = fs::read_to_string(&path).map_err(|e| {
        ModbumpError::config(format!("cannot read {}: {}", path.display(), e))
    })?;
    Config::from_toml(&content)
        .map_err(|e| ModbumpError::config(format!("{}: {}", path.display(), e)))
}

fn find_config_file() -> Option<PathBuf> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}
