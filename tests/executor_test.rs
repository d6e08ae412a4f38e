// tests/executor_test.rs
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use modbump::domain::{BumpLevel, TagPattern};
use modbump::executor::{
    error_count, has_errors, success_count, BumpKind, BumpOperation, ExecutionContext, Executor,
    Operation, TagOperation,
};
use modbump::git::MockRepository;
use modbump::ignore::IgnoreFile;
use modbump::workspace::{discover_modules, Module};
use modbump::ModbumpError;
use tempfile::TempDir;

fn workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (relative, content) in files {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

fn modules(root: &Path) -> Vec<Module> {
    discover_modules(root, "VERSION", &IgnoreFile::default()).unwrap()
}

fn version_of(root: &Path, module: &str) -> String {
    fs::read_to_string(root.join(module).join("VERSION"))
        .unwrap()
        .trim()
        .to_string()
}

#[tokio::test]
async fn test_sequential_bump_over_workspace() {
    let dir = workspace(&[
        ("a/VERSION", "1.0.0\n"),
        ("b/VERSION", "0.4.2\n"),
        ("c/VERSION", "2.3.4-rc.1\n"),
    ]);
    let mut mods = modules(dir.path());
    let op = Arc::new(BumpOperation::new(BumpKind::level(BumpLevel::Minor), "VERSION"));

    let outcome = Executor::new(false, false)
        .run(&ExecutionContext::new(), &mut mods, op)
        .await;

    assert!(outcome.error.is_none());
    assert_eq!(success_count(&outcome.results), 3);
    assert_eq!(version_of(dir.path(), "a"), "1.1.0");
    assert_eq!(version_of(dir.path(), "b"), "0.5.0");
    assert_eq!(version_of(dir.path(), "c"), "2.4.0");
    assert_eq!(mods[2].current_version, "2.4.0");
}

#[tokio::test]
async fn test_sequential_fail_fast_stops_at_broken_module() {
    let dir = workspace(&[
        ("a/VERSION", "1.0.0\n"),
        ("b/VERSION", "not a version\n"),
        ("c/VERSION", "1.0.0\n"),
    ]);
    let mut mods = modules(dir.path());
    let op = Arc::new(BumpOperation::new(BumpKind::Next, "VERSION"));

    let outcome = Executor::new(false, true)
        .run(&ExecutionContext::new(), &mut mods, op)
        .await;

    assert_eq!(outcome.results.len(), 2);
    assert!(outcome.results[0].success);
    assert!(!outcome.results[1].success);
    match outcome.error {
        Some(ModbumpError::ModuleFailed { ref module, .. }) => assert_eq!(module, "b"),
        other => panic!("expected module failure, got {:?}", other),
    }
    assert_eq!(version_of(dir.path(), "c"), "1.0.0");
}

#[tokio::test]
async fn test_sequential_without_fail_fast_visits_all() {
    let dir = workspace(&[
        ("a/VERSION", "1.0.0\n"),
        ("b/VERSION", "not a version\n"),
        ("c/VERSION", "1.0.0\n"),
    ]);
    let mut mods = modules(dir.path());
    let op = Arc::new(BumpOperation::new(BumpKind::Next, "VERSION"));

    let outcome = Executor::new(false, false)
        .run(&ExecutionContext::new(), &mut mods, op)
        .await;

    assert!(outcome.error.is_none());
    assert_eq!(outcome.results.len(), 3);
    assert!(has_errors(&outcome.results));
    assert_eq!(error_count(&outcome.results), 1);
    assert_eq!(version_of(dir.path(), "c"), "1.0.1");
}

#[tokio::test]
async fn test_parallel_bump_keeps_input_order() {
    let files: Vec<(String, String)> = (0..12)
        .map(|i| (format!("m{:02}/VERSION", i), format!("1.{}.0\n", i)))
        .collect();
    let borrowed: Vec<(&str, &str)> = files
        .iter()
        .map(|(p, c)| (p.as_str(), c.as_str()))
        .collect();
    let dir = workspace(&borrowed);
    let mut mods = modules(dir.path());
    let op = Arc::new(BumpOperation::new(BumpKind::level(BumpLevel::Patch), "VERSION"));

    let outcome = Executor::new(true, false)
        .with_max_concurrency(3)
        .run(&ExecutionContext::new(), &mut mods, op)
        .await;

    assert!(outcome.error.is_none());
    assert_eq!(outcome.results.len(), 12);
    for (i, (result, module)) in outcome.results.iter().zip(&mods).enumerate() {
        assert_eq!(result.module.name, format!("m{:02}", i));
        assert_eq!(result.new_version, format!("1.{}.1", i));
        assert_eq!(module.current_version, result.new_version);
    }
}

#[tokio::test]
async fn test_parallel_fail_fast_reports_a_failing_module() {
    let dir = workspace(&[
        ("a/VERSION", "1.0.0\n"),
        ("b/VERSION", "garbage\n"),
        ("c/VERSION", "also garbage\n"),
        ("d/VERSION", "1.0.0\n"),
    ]);
    let mut mods = modules(dir.path());
    let op = Arc::new(BumpOperation::new(BumpKind::Next, "VERSION"));

    let outcome = Executor::new(true, true)
        .run(&ExecutionContext::new(), &mut mods, op)
        .await;

    assert!(outcome.results.len() <= 4);
    match outcome.error {
        Some(ModbumpError::ModuleFailed { ref module, .. }) => {
            assert!(module == "b" || module == "c", "unexpected module {}", module)
        }
        other => panic!("expected module failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_workspace_is_an_error() {
    let dir = TempDir::new().unwrap();
    let mut mods = modules(dir.path());
    let op = Arc::new(BumpOperation::new(BumpKind::Next, "VERSION"));

    let outcome = Executor::default()
        .run(&ExecutionContext::new(), &mut mods, op)
        .await;

    assert!(outcome.results.is_empty());
    assert!(matches!(outcome.error, Some(ModbumpError::NoModules)));
}

/// Waits until the run is cancelled, then fails
struct Blocking;

#[async_trait]
impl Operation for Blocking {
    async fn execute(&self, ctx: &ExecutionContext, _module: &mut Module) -> anyhow::Result<()> {
        ctx.done().await;
        ctx.check()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "blocking"
    }
}

#[tokio::test]
async fn test_deadline_ends_parallel_run() {
    let mut mods = vec![
        Module::new("a", "/ws/a", "1.0.0"),
        Module::new("b", "/ws/b", "1.0.0"),
    ];
    let ctx = ExecutionContext::with_timeout(Duration::from_millis(50));

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        Executor::new(true, false).run(&ctx, &mut mods, Arc::new(Blocking)),
    )
    .await
    .unwrap();

    assert_eq!(outcome.results.len(), 2);
    assert_eq!(error_count(&outcome.results), 2);
    assert!(matches!(outcome.error, Some(ModbumpError::DeadlineExceeded)));
}

#[tokio::test]
async fn test_tag_run_over_workspace() {
    let dir = workspace(&[
        ("VERSION", "1.0.0\n"),
        ("services/api/VERSION", "0.3.0\n"),
    ]);
    let mut mods = modules(dir.path());
    let sink = Arc::new(MockRepository::new());
    let op = Arc::new(TagOperation::new(
        sink.clone(),
        dir.path(),
        TagPattern::new("v{version}").unwrap(),
        TagPattern::new("{module}/v{version}").unwrap(),
    ));

    let outcome = Executor::new(false, true)
        .run(&ExecutionContext::new(), &mut mods, op)
        .await;

    assert!(outcome.error.is_none());
    assert_eq!(sink.created_tags(), vec!["v1.0.0", "services/api/v0.3.0"]);
}
