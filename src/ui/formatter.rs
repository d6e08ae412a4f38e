//! Pure formatting functions for terminal output.
//!
//! Everything here returns a `String`; printing happens in the parent module.
//! Colour is decided by the [`Palette`], never by the global console state.

use console::{style, StyledObject};

use crate::config::ColorMode;
use crate::executor::{error_count, success_count, total_duration, ExecutionResult};
use crate::workspace::Module;

/// Applies the configured [`ColorMode`] to styled text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    color: ColorMode,
}

impl Palette {
    pub fn new(color: ColorMode) -> Self {
        Palette { color }
    }

    fn paint<D>(&self, object: StyledObject<D>) -> StyledObject<D> {
        match self.color {
            ColorMode::Auto => object,
            ColorMode::Always => object.force_styling(true),
            ColorMode::Never => object.force_styling(false),
        }
    }
}

pub fn format_error(palette: &Palette, message: &str) -> String {
    format!("{} {}", palette.paint(style("ERROR:").red().bold()), message)
}

pub fn format_success(palette: &Palette, message: &str) -> String {
    format!("{} {}", palette.paint(style("✓").green()), message)
}

pub fn format_status(palette: &Palette, message: &str) -> String {
    format!("{} {}", palette.paint(style("→").yellow()), message)
}

/// One line per module for `show`
pub fn format_module(palette: &Palette, module: &Module) -> String {
    let version = if module.current_version.is_empty() {
        palette.paint(style("(unreadable)".to_string()).red())
    } else {
        palette.paint(style(module.current_version.clone()).cyan())
    };
    format!("  {:<32} {}", module.name, version)
}

/// One line per execution result
///
/// Successful results show the version transition, failed ones the error
/// chain.
pub fn format_result(palette: &Palette, result: &ExecutionResult) -> String {
    let elapsed = result.duration.as_millis();
    if result.success {
        let change = if result.changed() {
            format!(
                "{} → {}",
                display_version(&result.old_version),
                palette.paint(style(result.new_version.clone()).green())
            )
        } else {
            format!("{} (unchanged)", display_version(&result.new_version))
        };
        format!(
            "{} {:<32} {} ({}ms)",
            palette.paint(style("✓").green()),
            result.module.name,
            change,
            elapsed
        )
    } else {
        let reason = result
            .error
            .as_ref()
            .map(|e| format!("{:#}", e))
            .unwrap_or_else(|| "unknown error".to_string());
        format!(
            "{} {:<32} {}",
            palette.paint(style("✗").red().bold()),
            result.module.name,
            palette.paint(style(reason).red())
        )
    }
}

/// Totals line printed after a run
pub fn format_summary(palette: &Palette, results: &[ExecutionResult]) -> String {
    let failed = error_count(results);
    let failed_text = format!("{} failed", failed);
    let failed_text = if failed > 0 {
        palette.paint(style(failed_text).red().bold())
    } else {
        palette.paint(style(failed_text))
    };

    format!(
        "{} modules: {} succeeded, {} in {}ms",
        results.len(),
        palette.paint(style(success_count(results)).green()),
        failed_text,
        total_duration(results).as_millis()
    )
}

fn display_version(version: &str) -> &str {
    if version.is_empty() {
        "(none)"
    } else {
        version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn plain() -> Palette {
        Palette::new(ColorMode::Never)
    }

    fn result(name: &str, old: &str, new: &str, error: Option<&str>) -> ExecutionResult {
        ExecutionResult {
            module: Module::new(name, name, new),
            old_version: old.to_string(),
            new_version: new.to_string(),
            success: error.is_none(),
            error: error.map(|e| Arc::new(anyhow::anyhow!(e.to_string()))),
            duration: Duration::from_millis(4),
        }
    }

    #[test]
    fn test_never_mode_has_no_escapes() {
        let line = format_error(&plain(), "bad thing");
        assert_eq!(line, "ERROR: bad thing");
        assert_eq!(format_status(&plain(), "working"), "→ working");
        assert_eq!(format_success(&plain(), "done"), "✓ done");
    }

    #[test]
    fn test_always_mode_emits_escapes() {
        let line = format_error(&Palette::new(ColorMode::Always), "bad thing");
        assert!(line.contains("\u{1b}["));
        assert!(line.ends_with("bad thing"));
    }

    #[test]
    fn test_format_changed_result() {
        let line = format_result(&plain(), &result("api", "1.2.3", "1.2.4", None));
        assert!(line.starts_with("✓ api"));
        assert!(line.contains("1.2.3 → 1.2.4"));
        assert!(line.ends_with("(4ms)"));
    }

    #[test]
    fn test_format_unchanged_and_failed_results() {
        let unchanged = format_result(&plain(), &result("web", "1.0.0", "1.0.0", None));
        assert!(unchanged.contains("1.0.0 (unchanged)"));

        let failed = format_result(&plain(), &result("cli", "1.0.0", "1.0.0", Some("disk full")));
        assert!(failed.starts_with("✗ cli"));
        assert!(failed.ends_with("disk full"));
    }

    #[test]
    fn test_format_summary() {
        let results = vec![
            result("a", "1.0.0", "1.0.1", None),
            result("b", "1.0.0", "1.0.0", Some("boom")),
        ];
        assert_eq!(
            format_summary(&plain(), &results),
            "2 modules: 1 succeeded, 1 failed in 8ms"
        );
    }

    #[test]
    fn test_format_module() {
        let ok = format_module(&plain(), &Module::new("api", "/ws/api", "2.0.0"));
        assert!(ok.trim_start().starts_with("api"));
        assert!(ok.ends_with("2.0.0"));

        let broken = format_module(&plain(), &Module::new("old", "/ws/old", ""));
        assert!(broken.ends_with("(unreadable)"));
    }
}
