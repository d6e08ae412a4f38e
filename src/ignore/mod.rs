//! Gitignore-style path exclusion
//!
//! Supports a restricted subset of gitignore syntax:
//! - `name` matches any path component equal to `name` (or glob-matching it)
//! - `name/` matches that directory and everything beneath it
//! - `a/b*.txt` is anchored and matched segment-wise against the whole path
//! - `**` as an anchored segment spans zero or more components
//!
//! Full-line `#` comments and blank lines are skipped. Negation (`!`) is not
//! supported; such lines are used as literal patterns.

mod pattern;

pub use pattern::{path_components, CompiledPattern};

use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::error::{ModbumpError, Result};

/// Parse ignore-file text into trimmed patterns
///
/// Order and duplicates are preserved. A `#` after other content on the same
/// line is part of the pattern.
pub fn parse_ignore_content(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Match a single raw pattern against a relative path
pub fn matches_pattern(pattern: &str, path: &str) -> bool {
    CompiledPattern::compile(pattern).matches(path)
}

/// Precompiled pattern list for matching many paths
#[derive(Debug, Clone, Default)]
pub struct PatternMatcher {
    compiled: Vec<CompiledPattern>,
}

impl PatternMatcher {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        PatternMatcher {
            compiled: patterns
                .iter()
                .map(|p| CompiledPattern::compile(p.as_ref()))
                .collect(),
        }
    }

    /// True if any pattern matches `path`
    pub fn matches(&self, path: &str) -> bool {
        let components = path_components(path);
        self.compiled
            .iter()
            .any(|pattern| pattern.matches_components(&components))
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}

/// A parsed ignore file
#[derive(Debug, Clone, Default)]
pub struct IgnoreFile {
    patterns: Vec<String>,
    matcher: PatternMatcher,
}

impl IgnoreFile {
    pub fn new(patterns: Vec<String>) -> Self {
        let matcher = PatternMatcher::new(&patterns);
        IgnoreFile { patterns, matcher }
    }

    /// Load and parse the ignore file at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ModbumpError::config(format!(
                "Cannot read ignore file {}: {}",
                path.display(),
                e
            ))
        })?;

        let ignore: IgnoreFile = content.parse()?;
        debug!(path = %path.display(), patterns = ignore.patterns.len(), "loaded ignore file");
        Ok(ignore)
    }

    /// True if any pattern excludes `path`
    pub fn matches(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }

    /// Copy of the raw patterns, in file order
    pub fn patterns(&self) -> Vec<String> {
        self.patterns.clone()
    }
}

impl FromStr for IgnoreFile {
    type Err = ModbumpError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(IgnoreFile::new(parse_ignore_content(s)))
    }
}
