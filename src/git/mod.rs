//! Git collaborators for version initialization and release tagging
//!
//! The version engine never talks to git directly. It receives a [TagSource]
//! at construction and asks it for the most recent tag when a version file
//! has to be created. Release tagging goes through a [TagSink].
//!
//! - [repository::Git2Repository]: real implementation using the `git2` crate
//! - [mock::MockRepository]: in-memory implementation for tests
//!
//! Any `Fn() -> Result<String>` closure is also a [TagSource], which keeps
//! ad-hoc fakes and prefix-scoped lookups cheap to write:
//!
//! ```rust
//! use modbump::git::TagSource;
//!
//! let source = || Ok::<_, modbump::ModbumpError>("v1.4.0".to_string());
//! assert_eq!(source.latest_tag().unwrap(), "v1.4.0");
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::{ModbumpError, Result};

/// Supplies the most recent tag-like string (e.g. "v1.4.0")
///
/// Any error or unparsable result makes version-file initialization fall back
/// to the default version.
pub trait TagSource: Send + Sync {
    fn latest_tag(&self) -> Result<String>;
}

impl<F> TagSource for F
where
    F: Fn() -> Result<String> + Send + Sync,
{
    fn latest_tag(&self) -> Result<String> {
        self()
    }
}

/// Tag source for directories outside any repository
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTags;

impl TagSource for NoTags {
    fn latest_tag(&self) -> Result<String> {
        Err(ModbumpError::config("no tag source configured"))
    }
}

/// Creates release tags
pub trait TagSink: Send + Sync {
    /// Create a tag named `name` at the current HEAD
    ///
    /// # Returns
    /// * `Ok(())` - Tag created
    /// * `Err` - If the tag already exists or HEAD cannot be resolved
    fn create_tag(&self, name: &str) -> Result<()>;
}
