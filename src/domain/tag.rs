use crate::domain::version::SemanticVersion;
use crate::error::{ModbumpError, Result};

/// Tag naming pattern (e.g., "v{version}", "{module}/v{version}")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPattern {
    pub pattern: String,
}

impl TagPattern {
    /// Create a new tag pattern, rejecting patterns without `{version}`
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        if !pattern.contains("{version}") {
            return Err(ModbumpError::config(format!(
                "Tag pattern '{}' must contain a {{version}} placeholder",
                pattern
            )));
        }
        Ok(TagPattern { pattern })
    }

    /// Format a tag for a module version
    /// Example: pattern="{module}/v{version}", module="api", version=1.2.3 -> "api/v1.2.3"
    pub fn format(&self, module: &str, version: &SemanticVersion) -> String {
        self.pattern
            .replace("{module}", module)
            .replace("{version}", &version.to_string())
    }

    /// Literal text preceding the version in this module's tags
    /// Example: pattern="{module}/v{version}", module="api" -> "api/v"
    pub fn prefix(&self, module: &str) -> String {
        let before = self.pattern.split("{version}").next().unwrap_or_default();
        before.replace("{module}", module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_requires_version_placeholder() {
        assert!(TagPattern::new("release").is_err());
        assert!(TagPattern::new("v{version}").is_ok());
    }

    #[test]
    fn test_pattern_prefix() {
        let pattern = TagPattern::new("{module}/v{version}").unwrap();
        assert_eq!(pattern.prefix("api"), "api/v");
        assert_eq!(TagPattern::new("{version}").unwrap().prefix("api"), "");
    }

    #[test]
    fn test_pattern_format() {
        let pattern = TagPattern::new("v{version}").unwrap();
        assert_eq!(pattern.format("root", &SemanticVersion::new(1, 2, 3)), "v1.2.3");
    }

    #[test]
    fn test_pattern_format_with_module() {
        let pattern = TagPattern::new("{module}/v{version}").unwrap();
        let version = SemanticVersion::new(0, 4, 0).with_pre_release("rc.1");
        assert_eq!(pattern.format("services/api", &version), "services/api/v0.4.0-rc.1");
    }
}
