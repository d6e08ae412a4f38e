use crate::domain::SemanticVersion;
use crate::error::{ModbumpError, Result};
use crate::git::{TagSink, TagSource};
use git2::Repository as Git2Repo;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Wrapper around git2::Repository implementing the tag traits
///
/// `git2::Repository` is `Send` but not `Sync`; the mutex lets one handle be
/// shared by concurrently running operations.
pub struct Git2Repository {
    repo: Mutex<Git2Repo>,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository {
            repo: Mutex::new(repo),
        })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository {
            repo: Mutex::new(repo),
        }
    }

    fn repo(&self) -> Result<MutexGuard<'_, Git2Repo>> {
        self.repo
            .lock()
            .map_err(|_| ModbumpError::Git(git2::Error::from_str("repository lock poisoned")))
    }

    /// Get all tag names in the repository
    pub fn list_tags(&self) -> Result<Vec<String>> {
        let repo = self.repo()?;
        let tags = repo.tag_names(None)?;

        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }

    /// Find the highest-versioned tag starting with `prefix`
    ///
    /// The remainder after the prefix must parse as a version (an optional
    /// `v` is accepted). Precedence follows semver; ties and tags whose
    /// pre-release text is not strict semver fall back to numeric order then name.
    pub fn latest_tag_matching(&self, prefix: &str) -> Result<String> {
        let mut candidates: Vec<(semver::Version, String)> = self
            .list_tags()?
            .into_iter()
            .filter_map(|tag| {
                let rest = tag.strip_prefix(prefix)?;
                let version = SemanticVersion::parse(rest).ok()?;
                let key = version.to_semver().unwrap_or_else(|| {
                    semver::Version::new(version.major, version.minor, version.patch)
                });
                Some((key, tag))
            })
            .collect();

        candidates.sort();

        match candidates.pop() {
            Some((_, tag)) => {
                debug!(prefix, tag = %tag, "resolved latest tag");
                Ok(tag)
            }
            None => Err(ModbumpError::Git(git2::Error::from_str(&format!(
                "no version tags found with prefix '{}'",
                prefix
            )))),
        }
    }
}

impl TagSource for Git2Repository {
    fn latest_tag(&self) -> Result<String> {
        self.latest_tag_matching("")
    }
}

impl TagSink for Git2Repository {
    fn create_tag(&self, name: &str) -> Result<()> {
        let repo = self.repo()?;
        let head = repo.head()?.peel(git2::ObjectType::Commit)?;

        repo.tag_lightweight(name, &head, false).map_err(|e| {
            ModbumpError::Git(git2::Error::from_str(&format!(
                "Cannot create tag '{}': {}",
                name,
                e.message()
            )))
        })?;

        debug!(tag = name, commit = %head.id(), "created tag");
        Ok(())
    }
}
