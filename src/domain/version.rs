use crate::domain::prerelease::increment_pre_release;
use crate::error::{ModbumpError, Result, VersionComponent};
use std::fmt;
use std::str::FromStr;

/// Semantic version representation
///
/// `pre_release` and `build_metadata` are stored verbatim and are empty unless
/// explicitly set. Every transformation returns a new value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release: String,
    pub build_metadata: String,
}

impl SemanticVersion {
    /// Create a new release version with no pre-release or build metadata
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        SemanticVersion {
            major,
            minor,
            patch,
            pre_release: String::new(),
            build_metadata: String::new(),
        }
    }

    /// Return a copy with the given pre-release identifier
    pub fn with_pre_release(mut self, pre_release: impl Into<String>) -> Self {
        self.pre_release = pre_release.into();
        self
    }

    /// Parse a version string (e.g., "v1.2.3-rc.1+build.5")
    ///
    /// Surrounding whitespace and one leading `v`/`V` are ignored. Build
    /// metadata is everything after the first `+`; the pre-release is
    /// everything after the first `-` that precedes it. Both are kept verbatim.
    ///
    /// # Returns
    /// * `Ok(SemanticVersion)` - Parsed version
    /// * `Err(InvalidVersionFormat)` - Empty input, wrong number of core
    ///   components, or a non-numeric component (named in the error)
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ModbumpError::invalid_format(input));
        }

        let unprefixed = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        let (rest, build_metadata) = match unprefixed.split_once('+') {
            Some((rest, build)) => (rest, build),
            None => (unprefixed, ""),
        };

        let (core, pre_release) = match rest.split_once('-') {
            Some((core, pre)) => (core, pre),
            None => (rest, ""),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() != 3 {
            return Err(ModbumpError::invalid_format(input));
        }

        let major = parse_component(parts[0], input, VersionComponent::Major)?;
        let minor = parse_component(parts[1], input, VersionComponent::Minor)?;
        let patch = parse_component(parts[2], input, VersionComponent::Patch)?;

        Ok(SemanticVersion {
            major,
            minor,
            patch,
            pre_release: pre_release.to_string(),
            build_metadata: build_metadata.to_string(),
        })
    }

    /// Whether this version carries a pre-release identifier
    pub fn is_pre_release(&self) -> bool {
        !self.pre_release.is_empty()
    }

    /// Bump version according to level
    ///
    /// After the numeric bump the pre-release is replaced by `pre_release`
    /// (empty clears it). A non-empty `build_metadata` always wins; otherwise
    /// the current build metadata is kept only when `preserve_build` is set.
    ///
    /// Fails with `VersionOverflow` when the bumped component is `u64::MAX`.
    pub fn bump(
        &self,
        level: BumpLevel,
        pre_release: &str,
        build_metadata: &str,
        preserve_build: bool,
    ) -> Result<Self> {
        let (major, minor, patch) = match level {
            BumpLevel::Major => (self.increment(self.major, VersionComponent::Major)?, 0, 0),
            BumpLevel::Minor => (
                self.major,
                self.increment(self.minor, VersionComponent::Minor)?,
                0,
            ),
            BumpLevel::Patch => (
                self.major,
                self.minor,
                self.increment(self.patch, VersionComponent::Patch)?,
            ),
        };

        let build_metadata = if !build_metadata.is_empty() {
            build_metadata.to_string()
        } else if preserve_build {
            self.build_metadata.clone()
        } else {
            String::new()
        };

        Ok(SemanticVersion {
            major,
            minor,
            patch,
            pre_release: pre_release.to_string(),
            build_metadata,
        })
    }

    /// Bump using a textual level ("patch", "minor" or "major")
    ///
    /// No pre-release or build metadata is carried over.
    pub fn bump_by_label(&self, label: &str) -> Result<Self> {
        let level: BumpLevel = label.parse()?;
        self.bump(level, "", "", false)
    }

    /// Compute the "next" version without an explicit level
    ///
    /// - A pre-release is promoted to its final release (numbers unchanged).
    /// - Below 1.0.0 the minor component is the breaking-change unit, so
    ///   `0.x.y` becomes `0.(x+1).0`. This is a product policy, not a semver rule.
    /// - Otherwise the patch component is incremented.
    pub fn bump_next(&self) -> Result<Self> {
        if self.is_pre_release() {
            return Ok(SemanticVersion::new(self.major, self.minor, self.patch));
        }

        if self.major == 0 {
            let minor = self.increment(self.minor, VersionComponent::Minor)?;
            Ok(SemanticVersion::new(0, minor, 0))
        } else {
            let patch = self.increment(self.patch, VersionComponent::Patch)?;
            Ok(SemanticVersion::new(self.major, self.minor, patch))
        }
    }

    /// Advance the pre-release series named `base`
    ///
    /// A release version is first bumped to the next patch and gets `base.1`.
    /// A pre-release keeps its numbers and gets its iteration incremented
    /// (switching series restarts at `base.1`).
    pub fn bump_pre_release(&self, base: &str) -> Result<Self> {
        if !self.is_pre_release() {
            return self.bump(BumpLevel::Patch, &increment_pre_release("", base)?, "", false);
        }

        let pre_release = increment_pre_release(&self.pre_release, base)?;
        Ok(SemanticVersion::new(self.major, self.minor, self.patch).with_pre_release(pre_release))
    }

    fn increment(&self, value: u64, component: VersionComponent) -> Result<u64> {
        value
            .checked_add(1)
            .ok_or_else(|| ModbumpError::overflow(self.to_string(), component))
    }

    /// Convert to a `semver::Version` for precedence comparisons
    ///
    /// Returns `None` when the verbatim pre-release or build text is not valid
    /// under strict semver rules.
    pub fn to_semver(&self) -> Option<semver::Version> {
        semver::Version::parse(&self.to_string()).ok()
    }
}

fn parse_component(part: &str, input: &str, component: VersionComponent) -> Result<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ModbumpError::invalid_component(input, component));
    }

    part.parse::<u64>()
        .map_err(|_| ModbumpError::invalid_component(input, component))
}

impl FromStr for SemanticVersion {
    type Err = ModbumpError;

    fn from_str(s: &str) -> Result<Self> {
        SemanticVersion::parse(s)
    }
}

/// Canonical text form: `major.minor.patch[-pre][+build]`
///
/// No `v` prefix is ever written even though `parse` accepts one; the
/// asymmetry is intentional so version files always hold the bare form.
impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre_release.is_empty() {
            write!(f, "-{}", self.pre_release)?;
        }
        if !self.build_metadata.is_empty() {
            write!(f, "+{}", self.build_metadata)?;
        }
        Ok(())
    }
}

/// Version bump level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpLevel {
    Major,
    Minor,
    Patch,
}

impl BumpLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpLevel::Major => "major",
            BumpLevel::Minor => "minor",
            BumpLevel::Patch => "patch",
        }
    }
}

impl FromStr for BumpLevel {
    type Err = ModbumpError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "patch" => Ok(BumpLevel::Patch),
            "minor" => Ok(BumpLevel::Minor),
            "major" => Ok(BumpLevel::Major),
            other => Err(ModbumpError::InvalidBumpType(other.to_string())),
        }
    }
}

impl fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
