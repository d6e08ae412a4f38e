//! Pre-release identifier handling
//!
//! Pre-release series are written as `<base>.<iteration>` (e.g. `rc.3`).
//! [`increment_pre_release`] advances a series; [`PreReleaseType`] normalizes
//! the base identifier accepted on the command line.

use crate::error::{ModbumpError, Result, VersionComponent};
use std::fmt;
use std::str::FromStr;

/// Pre-release identifier type (alpha, beta, rc, or custom)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum PreReleaseType {
    /// Alpha pre-release
    Alpha,
    /// Beta pre-release
    Beta,
    /// Release candidate
    ReleaseCandidate,
    /// Custom pre-release identifier
    Custom(String),
}

impl PreReleaseType {
    /// Parse a pre-release base identifier
    ///
    /// Accepts: "alpha", "a", "beta", "b", "rc", or any custom alphanumeric-hyphen string
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl FromStr for PreReleaseType {
    type Err = ModbumpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "alpha" | "a" => Ok(PreReleaseType::Alpha),
            "beta" | "b" => Ok(PreReleaseType::Beta),
            "rc" => Ok(PreReleaseType::ReleaseCandidate),
            other => {
                if !other.is_empty() && other.chars().all(|c| c.is_alphanumeric() || c == '-') {
                    Ok(PreReleaseType::Custom(other.to_string()))
                } else {
                    Err(ModbumpError::invalid_format(format!(
                        "pre-release identifier '{}'",
                        s
                    )))
                }
            }
        }
    }
}

impl fmt::Display for PreReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreReleaseType::Alpha => write!(f, "alpha"),
            PreReleaseType::Beta => write!(f, "beta"),
            PreReleaseType::ReleaseCandidate => write!(f, "rc"),
            PreReleaseType::Custom(s) => write!(f, "{}", s),
        }
    }
}

/// Compute the next pre-release identifier in the `base` series
///
/// - `""`, `"beta"` (other series), `"rc"` or `"rc."` -> `"rc.1"`
/// - `"rc.4"` -> `"rc.5"`
/// - `"rc.x"` (malformed iteration) -> `"rc.1"`
///
/// Fails with [`ModbumpError::VersionOverflow`] when the iteration is already
/// `u64::MAX`.
///
/// # Examples
/// ```
/// use modbump::domain::increment_pre_release;
///
/// assert_eq!(increment_pre_release("alpha.9", "alpha").unwrap(), "alpha.10");
/// assert_eq!(increment_pre_release("", "rc").unwrap(), "rc.1");
/// ```
pub fn increment_pre_release(current: &str, base: &str) -> Result<String> {
    let first = format!("{}.1", base);

    let Some(rest) = current.strip_prefix(base) else {
        return Ok(first);
    };

    let Some(iteration) = rest.strip_prefix('.') else {
        return Ok(first);
    };

    if iteration.is_empty() || !iteration.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(first);
    }

    let Ok(n) = iteration.parse::<u64>() else {
        return Ok(first);
    };

    let next = n
        .checked_add(1)
        .ok_or_else(|| ModbumpError::overflow(current, VersionComponent::PreRelease))?;
    Ok(format!("{}.{}", base, next))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prerelease_type_parse_aliases() {
        assert_eq!(PreReleaseType::parse("a").unwrap(), PreReleaseType::Alpha);
        assert_eq!(PreReleaseType::parse("Beta").unwrap(), PreReleaseType::Beta);
        assert_eq!(
            PreReleaseType::parse("rc").unwrap(),
            PreReleaseType::ReleaseCandidate
        );
    }

    #[test]
    fn test_prerelease_type_parse_custom() {
        let pr = PreReleaseType::parse("nightly-build").unwrap();
        assert_eq!(pr, PreReleaseType::Custom("nightly-build".to_string()));
        assert_eq!(pr.to_string(), "nightly-build");
    }

    #[test]
    fn test_prerelease_type_parse_invalid() {
        assert!(PreReleaseType::parse("invalid!name").is_err());
        assert!(PreReleaseType::parse("invalid.name").is_err());
        assert!(PreReleaseType::parse("").is_err());
    }

    #[test]
    fn test_increment_existing_series() {
        assert_eq!(increment_pre_release("alpha.9", "alpha").unwrap(), "alpha.10");
        assert_eq!(increment_pre_release("rc.1", "rc").unwrap(), "rc.2");
    }

    #[test]
    fn test_increment_starts_new_series() {
        assert_eq!(increment_pre_release("", "rc").unwrap(), "rc.1");
        assert_eq!(increment_pre_release("beta", "alpha").unwrap(), "alpha.1");
        assert_eq!(increment_pre_release("beta.4", "alpha").unwrap(), "alpha.1");
    }

    #[test]
    fn test_increment_bare_base() {
        assert_eq!(increment_pre_release("beta", "beta").unwrap(), "beta.1");
        assert_eq!(increment_pre_release("beta.", "beta").unwrap(), "beta.1");
    }

    #[test]
    fn test_increment_malformed_suffix() {
        assert_eq!(increment_pre_release("rc.x", "rc").unwrap(), "rc.1");
        assert_eq!(increment_pre_release("rc.-2", "rc").unwrap(), "rc.1");
        assert_eq!(increment_pre_release("rc.1.2", "rc").unwrap(), "rc.1");
        assert_eq!(increment_pre_release("rcx.3", "rc").unwrap(), "rc.1");
    }

    #[test]
    fn test_increment_refuses_to_wrap() {
        let err = increment_pre_release("rc.18446744073709551615", "rc").unwrap_err();
        assert_eq!(err.component(), Some(VersionComponent::PreRelease));
        assert!(matches!(err, ModbumpError::VersionOverflow { .. }));

        assert_eq!(
            increment_pre_release("rc.18446744073709551614", "rc").unwrap(),
            "rc.18446744073709551615"
        );
    }
}
