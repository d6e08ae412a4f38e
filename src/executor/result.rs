use std::sync::Arc;
use std::time::Duration;

use crate::error::ModbumpError;
use crate::workspace::Module;

/// Outcome of running an operation on one module
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Module state after the operation ran
    pub module: Module,
    pub old_version: String,
    pub new_version: String,
    pub success: bool,
    pub error: Option<Arc<anyhow::Error>>,
    pub duration: Duration,
}

impl ExecutionResult {
    /// True if the operation changed the module's version
    pub fn changed(&self) -> bool {
        self.old_version != self.new_version
    }
}

/// Results of one [`Executor::run`](super::Executor::run) call
///
/// `results` is index-aligned with the input modules (it is a prefix of them
/// when a sequential run stopped early). `error` is the aggregate error: set
/// on cancellation and on fail-fast aborts, never for plain per-module
/// failures.
#[derive(Debug)]
pub struct RunOutcome {
    pub results: Vec<ExecutionResult>,
    pub error: Option<ModbumpError>,
}

impl RunOutcome {
    pub(crate) fn failed(error: ModbumpError) -> Self {
        RunOutcome {
            results: Vec::new(),
            error: Some(error),
        }
    }
}

pub fn has_errors(results: &[ExecutionResult]) -> bool {
    results.iter().any(|r| !r.success)
}

pub fn success_count(results: &[ExecutionResult]) -> usize {
    results.iter().filter(|r| r.success).count()
}

pub fn error_count(results: &[ExecutionResult]) -> usize {
    results.iter().filter(|r| !r.success).count()
}

pub fn total_duration(results: &[ExecutionResult]) -> Duration {
    results.iter().map(|r| r.duration).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, success: bool, millis: u64) -> ExecutionResult {
        ExecutionResult {
            module: Module::new(name, name, "1.0.0"),
            old_version: "1.0.0".to_string(),
            new_version: if success { "1.0.1" } else { "1.0.0" }.to_string(),
            success,
            error: (!success).then(|| Arc::new(anyhow::anyhow!("boom"))),
            duration: Duration::from_millis(millis),
        }
    }

    #[test]
    fn test_aggregates_are_consistent() {
        let results = vec![result("a", true, 5), result("b", false, 7), result("c", true, 3)];

        assert!(has_errors(&results));
        assert_eq!(success_count(&results), 2);
        assert_eq!(error_count(&results), 1);
        assert_eq!(
            success_count(&results) + error_count(&results),
            results.len()
        );
        assert_eq!(total_duration(&results), Duration::from_millis(15));
    }

    #[test]
    fn test_aggregates_on_empty() {
        let results: Vec<ExecutionResult> = Vec::new();
        assert!(!has_errors(&results));
        assert_eq!(success_count(&results), 0);
        assert_eq!(error_count(&results), 0);
        assert_eq!(total_duration(&results), Duration::ZERO);
    }

    #[test]
    fn test_changed() {
        assert!(result("a", true, 1).changed());
        assert!(!result("b", false, 1).changed());
    }
}
