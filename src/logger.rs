//! Console logging for the qbank tools
//!
//! Every diagnostic the tools emit is an operator-facing progress line:
//! - INFO: General information (blue)
//! - SUCCESS: A file was rewritten or converted (green)
//! - WARNING: A unit was skipped (yellow)
//! - ERROR: A unit failed (red, stderr)
//! - DETAIL: Per-record changes (dim, indented)

use colored::*;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

// Keeps multi-line blocks together on the terminal
static OUTPUT_LOCK: Mutex<()> = Mutex::new(());

fn output_lock() -> MutexGuard<'static, ()> {
    OUTPUT_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Logger facade for the qbank tools
pub struct Logger;

impl Logger {
    /// Print application header
    pub fn header(version: &str) {
        let _lock = output_lock();
        println!("{}", "═".repeat(72).bright_blue());
        println!(
            "  {} {}",
            "Qbank Tools".bright_white().bold(),
            format!("v{}", version).bright_blue()
        );
        println!("  {}", "Question bank maintenance utilities".bright_black());
        println!("{}", "═".repeat(72).bright_blue());
    }

    /// Print a general information message
    pub fn info(message: &str) {
        let _lock = output_lock();
        println!("  {} {}", "●".bright_blue(), message);
    }

    /// Print a success message
    pub fn success(message: &str) {
        let _lock = output_lock();
        println!("  {} {}", "✓".bright_green(), message.bright_white());
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        let _lock = output_lock();
        println!("  {} {}", "⚠".bright_yellow(), message.yellow());
    }

    /// Print an error message to stderr
    pub fn error(message: &str) {
        let _lock = output_lock();
        eprintln!("  {} {}", "✗".bright_red(), message.red());
    }

    /// Print a progress/step message
    pub fn progress(step: &str, message: &str) {
        let _lock = output_lock();
        println!("\n  {} {}", step.bright_cyan().bold(), message.bright_white());
    }

    /// Print a sub-item message (indented)
    pub fn detail(message: &str) {
        let _lock = output_lock();
        println!("    · {}", message.bright_black());
    }

    /// Print statistics message
    pub fn stats(label: &str, value: &str) {
        let _lock = output_lock();
        println!("    {} {}", label.bright_white(), value.bright_cyan());
    }

    pub fn file_operation(operation: &str, path: &Path) {
        Self::detail(&format!("{}: {}", operation, path.display()));
    }

    /// Print conversion message
    pub fn conversion(from: &Path, to: &Path) {
        Self::detail(&format!(
            "Converted: {} → {}",
            from.display().to_string().bright_blue(),
            to.display().to_string().bright_green()
        ));
    }

    /// Print workflow start message
    pub fn workflow_start(workflow_type: &str, path: &Path) {
        let _lock = output_lock();
        println!("\n{}", "═".repeat(72).bright_blue());
        println!(
            "  {} {}",
            "Starting:".bright_white().bold(),
            workflow_type.bright_cyan()
        );
        println!(
            "  {} {}",
            "Source:".bright_white(),
            path.display().to_string().bright_blue()
        );
        println!("{}", "═".repeat(72).bright_blue());
    }

    /// Print workflow completion message
    pub fn workflow_complete(summary: &str) {
        let _lock = output_lock();
        println!("\n{}", "═".repeat(72).bright_green());
        println!("  {} {}", "✓".bright_green(), "Done!".bright_white().bold());
        println!("  {}", summary.bright_black());
        println!("{}", "═".repeat(72).bright_green());
    }

    /// Print the per-unit counter line of a batch
    pub fn file_progress(current: usize, total: usize, path: &Path) {
        let _lock = output_lock();
        println!(
            "\n  {} {}",
            format!("[{}/{}]", current, total).bright_cyan().bold(),
            path.display().to_string().bright_white()
        );
    }

    /// Print batch completion summary
    pub fn batch_complete(
        successful: usize,
        unchanged: usize,
        skipped: usize,
        failed: usize,
        total: usize,
        operation: &str,
    ) {
        let _lock = output_lock();
        println!("\n  {} Completed {}:", "✓".bright_green(), operation);
        println!("    {} {} updated", "✓".bright_green(), successful.to_string().bright_green());
        if unchanged > 0 {
            println!("    {} {} unchanged", "●".bright_blue(), unchanged.to_string().bright_white());
        }
        if skipped > 0 {
            println!("    {} {} skipped", "⚠".bright_yellow(), skipped.to_string().yellow());
        }
        if failed > 0 {
            println!("    {} {} failed", "✗".bright_red(), failed.to_string().bright_red());
        }
        println!("    {} {} total", "●".bright_blue(), total.to_string().bright_white());
    }

    /// Print detailed failure list with error messages
    pub fn batch_failures(failures: &[(String, String)]) {
        if failures.is_empty() {
            return;
        }

        let _lock = output_lock();
        eprintln!("\n  {} Failures:", "✗".bright_red().bold());
        for (i, (unit, error)) in failures.iter().enumerate() {
            eprintln!(
                "    {}. {} {}",
                (i + 1).to_string().bright_red(),
                unit.bright_white(),
                "→".bright_black()
            );
            eprintln!("       {}", error.red());
        }
    }
}
