//! Output formatting and styling module.
//!
//! Provides the user-facing lines printed at the end of a run: the per-bucket
//! summary table, the failure list, and the copy/remove counters. Progress
//! and per-file diagnostics go through `log` instead.

use crate::file_organizer::TransferReport;
use colored::*;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Manages CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mediasort::output::OutputFormatter;
    /// OutputFormatter::success("All files copied");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    ///
    /// # Arguments
    ///
    /// * `header` - The header text
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Prints a table of files per bucket.
    ///
    /// # Arguments
    ///
    /// * `bucket_counts` - Bucket names mapped to file counts
    /// * `total_files` - Total number of files shown in the footer
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mediasort::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("2023/07_July".to_string(), 15);
    /// counts.insert("unknown".to_string(), 2);
    /// OutputFormatter::summary_table(&counts, 17);
    /// ```
    pub fn summary_table(bucket_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let max_bucket_len = bucket_counts
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(6); // At least "Folder" width

        println!(
            "{:<width$} | {}",
            "Folder".bold(),
            "Files".bold(),
            width = max_bucket_len
        );
        println!("{}", "-".repeat(max_bucket_len + 10));

        for (bucket, count) in bucket_counts {
            println!(
                "{:<width$} | {} {}",
                bucket,
                count.to_string().green(),
                file_word(*count),
                width = max_bucket_len
            );
        }

        println!("{}", "-".repeat(max_bucket_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            file_word(total_files),
            width = max_bucket_len
        );
    }

    /// Prints every failed file with its reason.
    ///
    /// # Arguments
    ///
    /// * `failures` - Pairs of file path and failure reason
    pub fn failure_list(failures: &[(PathBuf, String)]) {
        if failures.is_empty() {
            return;
        }

        Self::header("FAILED");
        for (path, reason) in failures {
            Self::error(&format!("{}: {}", path.display(), reason));
        }
    }

    /// Prints the table, failures and counters for a finished run.
    ///
    /// # Arguments
    ///
    /// * `report` - The report returned by the organizer
    /// * `dry_run` - If true, only the planned buckets are shown
    pub fn report(report: &TransferReport, dry_run: bool) {
        let planned: usize = report.bucket_counts.values().sum();
        Self::summary_table(&report.bucket_counts, planned);

        if dry_run {
            Self::dry_run_notice("No files were copied or removed.");
            return;
        }

        Self::failure_list(&report.failures);

        println!();
        Self::success(&format!("Copied {} {}.", report.copied, file_word(report.copied)));
        Self::success(&format!(
            "Removed {} {}.",
            report.removed,
            file_word(report.removed)
        ));

        if !report.is_complete_success() {
            Self::warning(&format!(
                "{} {} could not be organized. Please review errors above.",
                report.failures.len(),
                file_word(report.failures.len())
            ));
        }
    }
}

fn file_word(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
