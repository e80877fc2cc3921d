//! Progress reporting for the analyzer
//!
//! Workers expose nothing before the barrier, so the display is a spinner
//! with a status line while the batch runs, then a summary block.

use crate::analyzer::BatchResult;
use crate::stats::Summary;
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a batch runs
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Format a 0..1 ratio as a percentage
fn format_percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

/// Print a header at the start of the batch
pub fn print_header(files: usize, workers: usize, output: &str) {
    println!();
    println!(
        "{} {}",
        style("weblog-stats").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Log files:").bold(), files);
    println!("  {} {}", style("Workers:").bold(), workers);
    println!("  {} {}", style("Output:").bold(), output);
    println!();
}

/// Print a summary of a completed batch
pub fn print_summary(result: &BatchResult) {
    let global = &result.report.global;
    let rankings = &result.report.rankings;

    println!();
    println!("{}", style("Analysis Complete").green().bold());
    println!("{}", style("─".repeat(50)).dim());
    print_totals(global);
    println!(
        "  {} {}",
        style("Busiest:").bold(),
        rankings.busiest_entity.as_deref().unwrap_or("-")
    );
    println!(
        "  {} {}",
        style("Highest errors:").bold(),
        rankings.highest_error_entity.as_deref().unwrap_or("-")
    );
    println!(
        "  {} {:.1}s ({:.0} requests/sec, {} workers)",
        style("Duration:").bold(),
        result.duration.as_secs_f64(),
        result.requests_per_second(),
        result.workers
    );
    println!(
        "  {} {}",
        style("Report:").bold(),
        result.output_path.display()
    );
    println!();
}

/// Print a summary of a serial run
pub fn print_serial_summary(summary: &Summary, duration: Duration, output: &str) {
    println!();
    println!("{}", style("Serial Analysis Complete").green().bold());
    println!("{}", style("─".repeat(50)).dim());
    print_totals(summary);
    println!(
        "  {} {:.1}s",
        style("Duration:").bold(),
        duration.as_secs_f64()
    );
    println!("  {} {}", style("Summary:").bold(), output);
    println!();
}

fn print_totals(summary: &Summary) {
    println!(
        "  {} {}",
        style("Requests:").bold(),
        format_number(summary.total_requests)
    );
    println!(
        "  {} {}",
        style("Total Size:").bold(),
        format_size(summary.total_bytes, BINARY)
    );
    let rate = format_percent(summary.error_rate);
    if summary.error_rate > 0.0 {
        println!("  {} {}", style("Error rate:").yellow().bold(), rate);
    } else {
        println!("  {} {}", style("Error rate:").bold(), rate);
    }
    if let Some(hour) = summary.peak_hour {
        println!("  {} {:02}:00", style("Peak hour:").bold(), hour);
    }
}
