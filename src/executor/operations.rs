//! Built-in operations: version bumps and release tags

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tracing::info;

use crate::domain::{BumpLevel, SemanticVersion, TagPattern};
use crate::error::Result;
use crate::executor::{ExecutionContext, Operation};
use crate::git::TagSink;
use crate::version_file::{read_version, save_version, update_version};
use crate::workspace::Module;

/// How a bump computes the next version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BumpKind {
    /// Explicit level with pre-release / build-metadata policy
    Level {
        level: BumpLevel,
        pre_release: String,
        build_metadata: String,
        preserve_build: bool,
    },
    /// Promote a pre-release, otherwise the 0.x-aware default bump
    Next,
    /// Advance (or start) the named pre-release series
    PreRelease { base: String },
}

impl BumpKind {
    /// Plain level bump with no pre-release or build metadata
    pub fn level(level: BumpLevel) -> Self {
        BumpKind::Level {
            level,
            pre_release: String::new(),
            build_metadata: String::new(),
            preserve_build: false,
        }
    }

    pub fn apply(&self, current: &SemanticVersion) -> Result<SemanticVersion> {
        match self {
            BumpKind::Level {
                level,
                pre_release,
                build_metadata,
                preserve_build,
            } => current.bump(*level, pre_release, build_metadata, *preserve_build),
            BumpKind::Next => current.bump_next(),
            BumpKind::PreRelease { base } => current.bump_pre_release(base),
        }
    }
}

/// Reads a module's version file, bumps it and writes it back
#[derive(Debug, Clone)]
pub struct BumpOperation {
    kind: BumpKind,
    version_file: String,
    dry_run: bool,
}

impl BumpOperation {
    pub fn new(kind: BumpKind, version_file: impl Into<String>) -> Self {
        BumpOperation {
            kind,
            version_file: version_file.into(),
            dry_run: false,
        }
    }

    /// Compute new versions without writing them
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

#[async_trait]
impl Operation for BumpOperation {
    async fn execute(&self, ctx: &ExecutionContext, module: &mut Module) -> anyhow::Result<()> {
        ctx.check()?;
        let path = module.version_file(&self.version_file);

        let next = match (&self.kind, self.dry_run) {
            (
                BumpKind::Level {
                    level,
                    pre_release,
                    build_metadata,
                    preserve_build,
                },
                false,
            ) => update_version(&path, *level, pre_release, build_metadata, *preserve_build)
                .with_context(|| format!("bumping {}", path.display()))?,
            _ => {
                let current = read_version(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                let next = self
                    .kind
                    .apply(&current)
                    .with_context(|| format!("bumping {}", path.display()))?;
                if !self.dry_run {
                    save_version(&path, &next)
                        .with_context(|| format!("writing {}", path.display()))?;
                }
                next
            }
        };

        module.current_version = next.to_string();
        Ok(())
    }

    fn name(&self) -> &str {
        match self.kind {
            BumpKind::Level { .. } => "bump",
            BumpKind::Next => "bump-next",
            BumpKind::PreRelease { .. } => "bump-pre-release",
        }
    }
}

/// Creates a release tag for each module's current version
pub struct TagOperation {
    sink: Arc<dyn TagSink>,
    workspace_root: PathBuf,
    root_pattern: TagPattern,
    module_pattern: TagPattern,
    dry_run: bool,
}

impl TagOperation {
    /// `root_pattern` is used for the module at `workspace_root`,
    /// `module_pattern` (with `{module}`) for every other module
    pub fn new(
        sink: Arc<dyn TagSink>,
        workspace_root: impl Into<PathBuf>,
        root_pattern: TagPattern,
        module_pattern: TagPattern,
    ) -> Self {
        TagOperation {
            sink,
            workspace_root: workspace_root.into(),
            root_pattern,
            module_pattern,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Tag name for a module at a version
    pub fn tag_name(&self, module: &Module, version: &SemanticVersion) -> String {
        if module.path == self.workspace_root {
            self.root_pattern.format(&module.name, version)
        } else {
            self.module_pattern.format(&module.name, version)
        }
    }
}

#[async_trait]
impl Operation for TagOperation {
    async fn execute(&self, ctx: &ExecutionContext, module: &mut Module) -> anyhow::Result<()> {
        ctx.check()?;

        let version = SemanticVersion::parse(&module.current_version)
            .with_context(|| format!("module '{}' has no valid version", module.name))?;
        let tag = self.tag_name(module, &version);

        if self.dry_run {
            info!(module = %module.name, tag = %tag, "would create tag");
            return Ok(());
        }

        self.sink
            .create_tag(&tag)
            .with_context(|| format!("tagging module '{}'", module.name))?;
        info!(module = %module.name, tag = %tag, "created tag");
        Ok(())
    }

    fn name(&self) -> &str {
        "tag"
    }
}
