//! Command-line interface module for mediasort.
//!
//! This module handles all CLI-related functionality including:
//! - Flag parsing and defaults
//! - Scan directory validation
//! - Scan and organize orchestration
//! - Final report output

use crate::config::{
    DEFAULT_FILE_ENDINGS, DEFAULT_SCAN_DIR, DEFAULT_TARGET_DIR, OrganizeConfig,
    parse_file_endings,
};
use crate::file_organizer::{FileOrganizer, TransferReport};
use crate::output::OutputFormatter;
use crate::scanner;
use clap::Parser;
use log::info;
use std::path::PathBuf;

/// Command-line flags.
#[derive(Parser, Debug, Clone)]
#[command(
    version,
    about = "Reorganizes image and video files based on their capture date. \
             Files with an unknown capture date are copied into the folder 'unknown'."
)]
pub struct Args {
    /// The <dir> which is recursively scanned for image files
    #[arg(short = 's', long = "scan", value_name = "dir", default_value = DEFAULT_SCAN_DIR)]
    pub scan: PathBuf,

    /// The <dir> where the new files should be copied to
    #[arg(short = 't', long = "target", value_name = "dir", default_value = DEFAULT_TARGET_DIR)]
    pub target: PathBuf,

    /// Set <option> to 0 to keep files and 1 to remove them after copying
    #[arg(
        short = 'r',
        long = "remove",
        value_name = "option",
        default_value_t = 0,
        value_parser = clap::value_parser!(u8).range(0..=1)
    )]
    pub remove: u8,

    /// The file <endings> to search for, separated by ','
    #[arg(short = 'f', long = "file", value_name = "endings", default_value = DEFAULT_FILE_ENDINGS)]
    pub file: String,

    /// Show where files would be copied without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

impl Args {
    /// Converts the parsed flags into a run configuration.
    pub fn into_config(self) -> OrganizeConfig {
        OrganizeConfig {
            scan_dir: self.scan,
            target_dir: self.target,
            remove_source: self.remove == 1,
            file_endings: parse_file_endings(&self.file),
            dry_run: self.dry_run,
        }
    }
}

/// Runs one organize pass with the given configuration.
///
/// Scans `config.scan_dir`, copies every matching file into its bucket below
/// `config.target_dir`, and prints the summary.
///
/// # Errors
///
/// Returns a diagnostic if the scan directory is missing, a file ending is
/// not a valid pattern, or the scan directory cannot be listed. Failures on
/// individual files are not errors; they are part of the returned report.
///
/// # Examples
///
/// ```no_run
/// use mediasort::cli::run_cli;
/// use mediasort::config::OrganizeConfig;
///
/// let config = OrganizeConfig {
///     scan_dir: "/path/to/photos".into(),
///     target_dir: "/path/to/sorted".into(),
///     ..Default::default()
/// };
/// match run_cli(&config) {
///     Ok(report) => println!("Copied {} files", report.copied),
///     Err(e) => eprintln!("{}", e),
/// }
/// ```
pub fn run_cli(config: &OrganizeConfig) -> Result<TransferReport, String> {
    config.validate_scan_dir().map_err(|e| e.to_string())?;

    let filters = config
        .compile_filters()
        .map_err(|e| format!("Error compiling file endings: {}", e))?;

    info!(
        "Scanning folder for files with the following endings: {:?}",
        filters.patterns()
    );

    let entries = scanner::scan(&config.scan_dir, &filters).map_err(|e| e.to_string())?;

    info!(
        "Read {} files from {}",
        entries.len(),
        config.scan_dir.display()
    );

    if config.dry_run {
        OutputFormatter::dry_run_notice(&format!(
            "Analyzing {} files for {}",
            entries.len(),
            config.target_dir.display()
        ));
    } else {
        OutputFormatter::info(&format!(
            "Organizing {} files into {}",
            entries.len(),
            config.target_dir.display()
        ));
    }

    let report = FileOrganizer::new(&config.target_dir, config.remove_source)
        .with_dry_run(config.dry_run)
        .organize(&entries);

    OutputFormatter::report(&report, config.dry_run);

    Ok(report)
}
