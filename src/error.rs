use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Numeric part of a version that failed to parse or cannot be incremented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionComponent {
    Major,
    Minor,
    Patch,
    /// Iteration number of a `<base>.<n>` pre-release
    PreRelease,
}

impl fmt::Display for VersionComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionComponent::Major => write!(f, "major"),
            VersionComponent::Minor => write!(f, "minor"),
            VersionComponent::Patch => write!(f, "patch"),
            VersionComponent::PreRelease => write!(f, "pre-release"),
        }
    }
}

/// Unified error type for modbump operations
#[derive(Error, Debug)]
pub enum ModbumpError {
    #[error("Invalid version format: '{input}'{}", component_suffix(.component))]
    InvalidVersionFormat {
        input: String,
        component: Option<VersionComponent>,
    },

    #[error("Version overflow: {component} component of '{version}' is already at its maximum")]
    VersionOverflow {
        version: String,
        component: VersionComponent,
    },

    #[error("Invalid bump type: '{0}' (expected patch, minor or major)")]
    InvalidBumpType(String),

    #[error("Version file not found: {}", .0.display())]
    VersionFileNotFound(PathBuf),

    #[error("Invalid path: {0}")]
    PathValidation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("No modules to process")]
    NoModules,

    #[error("Operation failed for module '{module}': {source}")]
    ModuleFailed {
        module: String,
        #[source]
        source: Arc<anyhow::Error>,
    },

    #[error("Execution cancelled")]
    Cancelled,

    #[error("Execution deadline exceeded")]
    DeadlineExceeded,
}

fn component_suffix(component: &Option<VersionComponent>) -> String {
    match component {
        Some(c) => format!(" - invalid {} version", c),
        None => " - expected X.Y.Z[-pre][+build]".to_string(),
    }
}

/// Convenience type alias for Results in modbump
pub type Result<T> = std::result::Result<T, ModbumpError>;

impl ModbumpError {
    /// Create an invalid-format error for the whole input
    pub fn invalid_format(input: impl Into<String>) -> Self {
        ModbumpError::InvalidVersionFormat {
            input: input.into(),
            component: None,
        }
    }

    /// Create an invalid-format error naming the failing component
    pub fn invalid_component(input: impl Into<String>, component: VersionComponent) -> Self {
        ModbumpError::InvalidVersionFormat {
            input: input.into(),
            component: Some(component),
        }
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ModbumpError::Config(msg.into())
    }

    /// Create a path validation error with context
    pub fn path(msg: impl Into<String>) -> Self {
        ModbumpError::PathValidation(msg.into())
    }

    /// Create an overflow error for a component that cannot be incremented
    pub fn overflow(version: impl Into<String>, component: VersionComponent) -> Self {
        ModbumpError::VersionOverflow {
            version: version.into(),
            component,
        }
    }

    /// The failing component of a parse or overflow error
    pub fn component(&self) -> Option<VersionComponent> {
        match self {
            ModbumpError::InvalidVersionFormat { component, .. } => *component,
            ModbumpError::VersionOverflow { component, .. } => Some(*component),
            _ => None,
        }
    }
}
