use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use modbump::config::{self, ColorMode, Config};
use modbump::domain::{BumpLevel, PreReleaseType};
use modbump::executor::{
    error_count, has_errors, BumpKind, BumpOperation, ExecutionContext, Executor, Operation,
    TagOperation,
};
use modbump::git::{Git2Repository, NoTags, TagSource};
use modbump::ui::Reporter;
use modbump::version_file::VersionInitializer;
use modbump::workspace::{self, Module};

#[derive(Parser)]
#[command(
    name = "modbump",
    version,
    about = "Bump, initialize and tag module versions across a workspace"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(
        short = 'C',
        long,
        global = true,
        default_value = ".",
        help = "Workspace root directory"
    )]
    root: PathBuf,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,

    #[arg(long, global = true, value_enum, help = "When to use colours")]
    color: Option<ColorMode>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug, Clone, Default)]
struct RunArgs {
    #[arg(short, long, help = "Process modules concurrently")]
    parallel: bool,

    #[arg(long, help = "Stop at the first failing module")]
    fail_fast: bool,

    #[arg(short, long, help = "Maximum concurrent modules in parallel mode")]
    jobs: Option<usize>,

    #[arg(long, help = "Abort the run after this many seconds")]
    timeout: Option<u64>,

    #[arg(long, help = "Preview what would happen without making changes")]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Create a missing version file, seeded from the latest matching tag
    Init {
        #[arg(short, long, help = "Module directory relative to the root")]
        module: Option<String>,
    },
    /// List discovered modules and their versions
    Show,
    /// Bump every module by patch, minor or major
    Bump {
        level: String,

        #[arg(long, default_value = "", help = "Pre-release label for the new version")]
        pre: String,

        #[arg(long, default_value = "", help = "Build metadata for the new version")]
        build: String,

        #[arg(long, help = "Keep existing build metadata when --build is not given")]
        preserve_build: bool,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Release pre-releases, otherwise bump by the default policy
    Next {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Start or advance a pre-release series (alpha, beta, rc, ...)
    Pre {
        base: String,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Tag every module's current version at HEAD
    Tag {
        #[command(flatten)]
        run: RunArgs,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            Reporter::new(args.color.unwrap_or_default()).error(&e.to_string());
            std::process::exit(1);
        }
    };
    let reporter = Reporter::new(args.color.unwrap_or(config.output.color));

    if let Err(e) = run(&args, &config, &reporter).await {
        reporter.error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "modbump=debug" } else { "modbump=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: &Args, config: &Config, reporter: &Reporter) -> Result<()> {
    let root = args.root.as_path();

    match &args.command {
        Command::Init { module } => init(root, module.as_deref(), config, reporter),
        Command::Show => {
            let modules = discover(root, config)?;
            if modules.is_empty() {
                reporter.status(&format!("No '{}' files found", config.version_file));
            } else {
                reporter.modules(&modules);
            }
            Ok(())
        }
        Command::Bump {
            level,
            pre,
            build,
            preserve_build,
            run,
        } => {
            let kind = BumpKind::Level {
                level: level.parse::<BumpLevel>()?,
                pre_release: pre.clone(),
                build_metadata: build.clone(),
                preserve_build: *preserve_build,
            };
            let op = BumpOperation::new(kind, &config.version_file).dry_run(run.dry_run);
            execute(root, config, run, Arc::new(op), reporter).await
        }
        Command::Next { run } => {
            let op = BumpOperation::new(BumpKind::Next, &config.version_file).dry_run(run.dry_run);
            execute(root, config, run, Arc::new(op), reporter).await
        }
        Command::Pre { base, run } => {
            let base = PreReleaseType::parse(base)?.to_string();
            let kind = BumpKind::PreRelease { base };
            let op = BumpOperation::new(kind, &config.version_file).dry_run(run.dry_run);
            execute(root, config, run, Arc::new(op), reporter).await
        }
        Command::Tag { run } => {
            let repo = Git2Repository::open(root).context("tagging needs a git repository")?;
            let (root_pattern, module_pattern) = config.tag_patterns()?;
            let op = TagOperation::new(Arc::new(repo), root, root_pattern, module_pattern)
                .dry_run(run.dry_run);
            execute(root, config, run, Arc::new(op), reporter).await
        }
    }
}

fn discover(root: &Path, config: &Config) -> Result<Vec<Module>> {
    let ignore = workspace::load_ignore_file(root, &config.ignore_file)?;
    let modules = workspace::discover_modules(root, &config.version_file, &ignore)
        .with_context(|| format!("scanning {}", root.display()))?;
    Ok(modules)
}

fn init(root: &Path, module: Option<&str>, config: &Config, reporter: &Reporter) -> Result<()> {
    let (root_pattern, module_pattern) = config.tag_patterns()?;
    let (dir, prefix) = match module {
        Some(name) => (root.join(name), module_pattern.prefix(name)),
        None => (root.to_path_buf(), root_pattern.prefix("")),
    };

    let tag_source: Arc<dyn TagSource> = match Git2Repository::open(root) {
        Ok(repo) => Arc::new(move || -> modbump::Result<String> {
            let tag = repo.latest_tag_matching(&prefix)?;
            Ok(tag.strip_prefix(prefix.as_str()).unwrap_or(&tag).to_string())
        }),
        Err(e) => {
            debug!(error = %e, "not a git repository, tags unavailable");
            Arc::new(NoTags)
        }
    };

    let path = dir.join(&config.version_file);
    let created = VersionInitializer::new(tag_source).initialize_with_feedback(&path)?;
    if created {
        reporter.success(&format!("Created {}", path.display()));
    } else {
        reporter.status(&format!("{} already exists", path.display()));
    }
    Ok(())
}

async fn execute(
    root: &Path,
    config: &Config,
    run: &RunArgs,
    operation: Arc<dyn Operation>,
    reporter: &Reporter,
) -> Result<()> {
    let mut modules = discover(root, config)?;

    let executor = Executor::new(
        run.parallel || config.executor.parallel,
        run.fail_fast || config.executor.fail_fast,
    )
    .with_max_concurrency(run.jobs.unwrap_or(config.executor.max_concurrency));

    let timeout = run
        .timeout
        .map(Duration::from_secs)
        .or_else(|| config.executor.timeout());
    let ctx = match timeout {
        Some(timeout) => ExecutionContext::with_timeout(timeout),
        None => ExecutionContext::new(),
    };

    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling remaining modules");
            interrupt.cancel();
        }
    });

    if run.dry_run {
        reporter.status("Dry run: no files or tags will be written");
    }

    let outcome = executor.run(&ctx, &mut modules, operation).await;
    if !outcome.results.is_empty() {
        reporter.results(&outcome.results);
    }

    if let Some(e) = outcome.error {
        return Err(e.into());
    }
    if has_errors(&outcome.results) {
        anyhow::bail!("{} module(s) failed", error_count(&outcome.results));
    }
    Ok(())
}
