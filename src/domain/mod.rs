//! Domain logic - pure version rules independent of the filesystem and git

pub mod prerelease;
pub mod tag;
pub mod version;

pub use prerelease::{increment_pre_release, PreReleaseType};
pub use tag::TagPattern;
pub use version::{BumpLevel, SemanticVersion};
