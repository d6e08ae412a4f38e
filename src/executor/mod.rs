//! Applies an [`Operation`] to a set of modules
//!
//! Sequential runs visit modules in input order and stop at the first
//! failure when fail-fast is set. Parallel runs start one task per module
//! (optionally bounded by a semaphore) and collect results into slots
//! indexed by input position, so result order never depends on completion
//! order.
//!
//! Under parallel fail-fast the recorded error is whichever failing module
//! reached the shared lock first; which one that is can differ between runs.
//! Without a fail-fast failure, a parallel run still reports a cancelled or
//! expired caller context as its aggregate error (`Cancelled` or
//! `DeadlineExceeded`), the same way a sequential run does.

pub mod context;
pub mod operations;
pub mod result;

pub use context::ExecutionContext;
pub use operations::{BumpKind, BumpOperation, TagOperation};
pub use result::{
    error_count, has_errors, success_count, total_duration, ExecutionResult, RunOutcome,
};

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, debug_span, info, warn, Instrument};

use crate::error::ModbumpError;
use crate::workspace::Module;

/// A unit of work applied to each module
///
/// Implementations must not share mutable state between invocations: the
/// executor may call `execute` concurrently for distinct modules. An
/// operation may update `module.current_version` to reflect what it did.
#[async_trait]
pub trait Operation: Send + Sync {
    async fn execute(&self, ctx: &ExecutionContext, module: &mut Module) -> anyhow::Result<()>;

    /// Operation name for logging and reports
    fn name(&self) -> &str;
}

/// Runs operations over modules with a fixed execution policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Executor {
    parallel: bool,
    fail_fast: bool,
    max_concurrency: Option<usize>,
}

impl Executor {
    pub fn new(parallel: bool, fail_fast: bool) -> Self {
        Executor {
            parallel,
            fail_fast,
            max_concurrency: None,
        }
    }

    /// Cap the number of concurrently running modules in parallel mode
    ///
    /// `0` keeps the default unbounded fan-out.
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = (limit > 0).then_some(limit);
        self
    }

    /// Apply `operation` to every module
    ///
    /// Fails without visiting any module when `modules` is empty. Mutated
    /// `current_version` values are written back into `modules`.
    pub async fn run(
        &self,
        ctx: &ExecutionContext,
        modules: &mut [Module],
        operation: Arc<dyn Operation>,
    ) -> RunOutcome {
        if modules.is_empty() {
            return RunOutcome::failed(ModbumpError::NoModules);
        }

        info!(
            operation = operation.name(),
            modules = modules.len(),
            parallel = self.parallel,
            fail_fast = self.fail_fast,
            "running operation"
        );

        if self.parallel {
            self.run_parallel(ctx, modules, operation).await
        } else {
            self.run_sequential(ctx, modules, operation.as_ref()).await
        }
    }

    async fn run_sequential(
        &self,
        ctx: &ExecutionContext,
        modules: &mut [Module],
        operation: &dyn Operation,
    ) -> RunOutcome {
        let mut results = Vec::with_capacity(modules.len());

        for module in modules.iter_mut() {
            if let Err(e) = ctx.check() {
                warn!(module = %module.name, "stopping: {}", e);
                return RunOutcome {
                    results,
                    error: Some(e),
                };
            }

            let result = execute_operation(ctx, module, operation).await;
            let failure = (!result.success)
                .then(|| result.error.clone())
                .flatten();
            results.push(result);

            if self.fail_fast {
                if let Some(source) = failure {
                    return RunOutcome {
                        results,
                        error: Some(ModbumpError::ModuleFailed {
                            module: module.name.clone(),
                            source,
                        }),
                    };
                }
            }
        }

        RunOutcome {
            results,
            error: None,
        }
    }

    async fn run_parallel(
        &self,
        ctx: &ExecutionContext,
        modules: &mut [Module],
        operation: Arc<dyn Operation>,
    ) -> RunOutcome {
        let run_ctx = ctx.child();
        let state = Arc::new(Mutex::new(ParallelState {
            slots: vec![None; modules.len()],
            first_failure: None,
        }));
        let limiter = self.max_concurrency.map(|n| Arc::new(Semaphore::new(n)));

        let mut handles = Vec::with_capacity(modules.len());
        for (index, module) in modules.iter().enumerate() {
            let mut module = module.clone();
            let operation = Arc::clone(&operation);
            let run_ctx = run_ctx.clone();
            let state = Arc::clone(&state);
            let limiter = limiter.clone();
            let fail_fast = self.fail_fast;

            handles.push(tokio::spawn(async move {
                let _permit = match limiter {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };

                let result = execute_operation(&run_ctx, &mut module, operation.as_ref()).await;

                let mut state = state.lock().await;
                if fail_fast && !result.success {
                    state.record_failure(&run_ctx, &result);
                }
                state.slots[index] = Some(result);
            }));
        }

        for (index, handle) in handles.into_iter().enumerate() {
            if let Err(join_error) = handle.await {
                warn!(module = %modules[index].name, "operation task failed: {}", join_error);
                let result = ExecutionResult {
                    module: modules[index].clone(),
                    old_version: modules[index].current_version.clone(),
                    new_version: modules[index].current_version.clone(),
                    success: false,
                    error: Some(Arc::new(anyhow::anyhow!(
                        "operation task failed: {}",
                        join_error
                    ))),
                    duration: Default::default(),
                };
                let mut state = state.lock().await;
                if self.fail_fast {
                    state.record_failure(&run_ctx, &result);
                }
                state.slots[index] = Some(result);
            }
        }

        let mut state = state.lock().await;
        let results: Vec<ExecutionResult> = state.slots.drain(..).flatten().collect();
        for (module, result) in modules.iter_mut().zip(&results) {
            module.current_version = result.module.current_version.clone();
        }

        let error = match state.first_failure.take() {
            Some((module, source)) => Some(ModbumpError::ModuleFailed { module, source }),
            None => ctx.check().err(),
        };

        RunOutcome { results, error }
    }
}

impl Default for Executor {
    fn default() -> Self {
        Executor::new(false, false)
    }
}

/// Slot storage and fail-fast record shared by parallel units
struct ParallelState {
    slots: Vec<Option<ExecutionResult>>,
    first_failure: Option<(String, Arc<anyhow::Error>)>,
}

impl ParallelState {
    fn record_failure(&mut self, run_ctx: &ExecutionContext, result: &ExecutionResult) {
        if self.first_failure.is_some() {
            return;
        }
        if let Some(error) = &result.error {
            debug!(module = %result.module.name, "fail-fast triggered");
            self.first_failure = Some((result.module.name.clone(), Arc::clone(error)));
            run_ctx.cancel();
        }
    }
}

/// Run `operation` on one module and record what happened
pub async fn execute_operation(
    ctx: &ExecutionContext,
    module: &mut Module,
    operation: &dyn Operation,
) -> ExecutionResult {
    let old_version = module.current_version.clone();
    let started = Instant::now();

    let span = debug_span!("module", name = %module.name, operation = operation.name());
    let outcome = operation.execute(ctx, module).instrument(span).await;

    let duration = started.elapsed();
    let new_version = module.current_version.clone();

    match &outcome {
        Ok(()) => debug!(
            module = %module.name,
            operation = operation.name(),
            from = %old_version,
            to = %new_version,
            elapsed_ms = duration.as_millis() as u64,
            "operation succeeded"
        ),
        Err(e) => warn!(
            module = %module.name,
            operation = operation.name(),
            "operation failed: {:#}",
            e
        ),
    }

    ExecutionResult {
        module: module.clone(),
        old_version,
        new_version,
        success: outcome.is_ok(),
        error: outcome.err().map(Arc::new),
        duration,
    }
}
