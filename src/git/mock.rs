use crate::error::{ModbumpError, Result};
use crate::git::{TagSink, TagSource};
use std::sync::Mutex;

/// Mock repository for testing without actual git operations
pub struct MockRepository {
    latest: Option<String>,
    created: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            latest: None,
            created: Mutex::new(Vec::new()),
            fail_on: None,
        }
    }

    /// Report `tag` as the latest tag
    pub fn with_latest_tag(mut self, tag: impl Into<String>) -> Self {
        self.latest = Some(tag.into());
        self
    }

    /// Make `create_tag` fail for this tag name
    pub fn failing_on(mut self, tag: impl Into<String>) -> Self {
        self.fail_on = Some(tag.into());
        self
    }

    /// Tags created so far, in creation order
    pub fn created_tags(&self) -> Vec<String> {
        self.created
            .lock()
            .map(|tags| tags.clone())
            .unwrap_or_default()
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl TagSource for MockRepository {
    fn latest_tag(&self) -> Result<String> {
        self.latest
            .clone()
            .ok_or_else(|| ModbumpError::Git(git2::Error::from_str("no tags")))
    }
}

impl TagSink for MockRepository {
    fn create_tag(&self, name: &str) -> Result<()> {
        if self.fail_on.as_deref() == Some(name) {
            return Err(ModbumpError::Git(git2::Error::from_str(&format!(
                "Cannot create tag '{}'",
                name
            ))));
        }

        let mut created = self
            .created
            .lock()
            .map_err(|_| ModbumpError::Git(git2::Error::from_str("mock lock poisoned")))?;
        if created.iter().any(|t| t == name) {
            return Err(ModbumpError::Git(git2::Error::from_str(&format!(
                "tag '{}' already exists",
                name
            ))));
        }
        created.push(name.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_latest_tag() {
        let repo = MockRepository::new().with_latest_tag("v1.4.0");
        assert_eq!(repo.latest_tag().unwrap(), "v1.4.0");
    }

    #[test]
    fn test_mock_repository_default_has_no_tags() {
        let repo = MockRepository::default();
        assert!(repo.latest_tag().is_err());
        assert!(repo.created_tags().is_empty());
    }

    #[test]
    fn test_mock_repository_records_created_tags() {
        let repo = MockRepository::new();
        repo.create_tag("v1.0.0").unwrap();
        repo.create_tag("api/v0.1.0").unwrap();
        assert_eq!(repo.created_tags(), vec!["v1.0.0", "api/v0.1.0"]);
        assert!(repo.create_tag("v1.0.0").is_err());
    }

    #[test]
    fn test_mock_repository_failing_tag() {
        let repo = MockRepository::new().failing_on("v2.0.0");
        assert!(repo.create_tag("v2.0.0").is_err());
        assert!(repo.create_tag("v2.0.1").is_ok());
    }
}
