pub mod config;
pub mod domain;
pub mod error;
pub mod executor;
pub mod git;
pub mod ignore;
pub mod ui;
pub mod version_file;
pub mod workspace;

pub use error::{ModbumpError, Result, VersionComponent};
