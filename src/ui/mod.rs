//! User-facing output.
//!
//! - `formatter` - pure string formatting
//! - [`Reporter`] - writes formatted lines to stdout/stderr

pub mod formatter;

pub use formatter::Palette;

use crate::config::ColorMode;
use crate::executor::ExecutionResult;
use crate::workspace::Module;

/// Prints command output with a fixed colour policy
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    palette: Palette,
}

impl Reporter {
    pub fn new(color: ColorMode) -> Self {
        Reporter {
            palette: Palette::new(color),
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{}", formatter::format_error(&self.palette, message));
    }

    pub fn success(&self, message: &str) {
        println!("{}", formatter::format_success(&self.palette, message));
    }

    pub fn status(&self, message: &str) {
        println!("{}", formatter::format_status(&self.palette, message));
    }

    pub fn modules(&self, modules: &[Module]) {
        for module in modules {
            println!("{}", formatter::format_module(&self.palette, module));
        }
    }

    /// Per-module lines followed by the totals line
    pub fn results(&self, results: &[ExecutionResult]) {
        for result in results {
            println!("{}", formatter::format_result(&self.palette, result));
        }
        println!();
        println!("{}", formatter::format_summary(&self.palette, results));
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Reporter::new(ColorMode::Auto)
    }
}
