//! Run configuration and extension filtering.
//!
//! [`OrganizeConfig`] holds everything a single run needs and is built from
//! the command-line flags. Its file endings are turned into glob patterns
//! (`jpg` becomes `*.jpg`) and compiled once into [`ExtensionFilters`], which
//! the scanner consults for every directory entry.
//!
//! ```
//! use mediasort::config::OrganizeConfig;
//!
//! let config = OrganizeConfig::default();
//! let filters = config.compile_filters().unwrap();
//! assert!(filters.matches("IMG_0001.JPG"));
//! assert!(!filters.matches("notes.txt"));
//! ```

use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};

/// Directory scanned when `--scan` is not given.
pub const DEFAULT_SCAN_DIR: &str = "photos";
/// Directory receiving the buckets when `--target` is not given.
pub const DEFAULT_TARGET_DIR: &str = "sorted";
/// File endings selected when `--file` is not given.
pub const DEFAULT_FILE_ENDINGS: &str = "3gp,mov,mp4,png,jpeg,jpg";

/// Errors that can occur while validating a configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// A file ending produced a glob pattern that does not compile.
    InvalidGlobPattern {
        /// The pattern that failed to compile.
        pattern: String,
        /// Why the glob crate rejected it.
        reason: String,
    },
    /// The scan directory does not exist or is not a directory.
    ScanDirNotFound(PathBuf),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidGlobPattern { pattern, reason } => {
                write!(f, "Invalid file pattern '{}': {}", pattern, reason)
            }
            ConfigError::ScanDirNotFound(path) => {
                write!(f, "Scan folder {} does not exist.", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings for one organize run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizeConfig {
    /// Root directory scanned recursively for media files.
    pub scan_dir: PathBuf,
    /// Root directory the year/month buckets are created in.
    pub target_dir: PathBuf,
    /// Delete each source file after a verified copy.
    pub remove_source: bool,
    /// File endings without the leading `*.`, e.g. `jpg`.
    pub file_endings: Vec<String>,
    /// Only report where files would go.
    pub dry_run: bool,
}

impl Default for OrganizeConfig {
    fn default() -> Self {
        Self {
            scan_dir: PathBuf::from(DEFAULT_SCAN_DIR),
            target_dir: PathBuf::from(DEFAULT_TARGET_DIR),
            remove_source: false,
            file_endings: parse_file_endings(DEFAULT_FILE_ENDINGS),
            dry_run: false,
        }
    }
}

impl OrganizeConfig {
    /// Returns the glob patterns for the configured endings (`*.jpg`, ...).
    pub fn extension_patterns(&self) -> Vec<String> {
        self.file_endings
            .iter()
            .map(|ending| format!("*.{}", ending))
            .collect()
    }

    /// Compiles the configured endings into [`ExtensionFilters`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidGlobPattern`] if an ending contains
    /// glob syntax that does not compile, such as an unclosed `[`.
    pub fn compile_filters(&self) -> Result<ExtensionFilters, ConfigError> {
        ExtensionFilters::new(&self.extension_patterns())
    }

    /// Checks that the scan directory exists and is a directory.
    pub fn validate_scan_dir(&self) -> Result<(), ConfigError> {
        if self.scan_dir.is_dir() {
            Ok(())
        } else {
            Err(ConfigError::ScanDirNotFound(self.scan_dir.clone()))
        }
    }
}

/// Splits a comma-separated list of endings.
///
/// Whitespace around items is trimmed, empty items are dropped, and a
/// leading `*.` or `.` is stripped so `*.jpg`, `.jpg` and `jpg` all mean the
/// same ending.
pub fn parse_file_endings(endings: &str) -> Vec<String> {
    endings
        .split(',')
        .map(str::trim)
        .map(|ending| ending.trim_start_matches("*.").trim_start_matches('.'))
        .filter(|ending| !ending.is_empty())
        .map(str::to_string)
        .collect()
}

/// Compiled extension globs.
///
/// Matching is done against the file name only and ignores ASCII case, so
/// `*.jpg` selects both `a.jpg` and `B.JPG`.
#[derive(Debug, Clone)]
pub struct ExtensionFilters {
    patterns: Vec<Pattern>,
}

impl ExtensionFilters {
    const MATCH_OPTIONS: MatchOptions = MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    /// Compiles each glob pattern.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Pattern::new(pattern).map_err(|e| ConfigError::InvalidGlobPattern {
                    pattern: pattern.to_string(),
                    reason: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// Returns true if the file name matches any pattern.
    pub fn matches(&self, file_name: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.matches_with(file_name, Self::MATCH_OPTIONS))
    }

    /// Returns true if the file name of `path` matches any pattern.
    pub fn matches_path(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| self.matches(&name.to_string_lossy()))
            .unwrap_or(false)
    }

    /// Returns the source text of every compiled pattern.
    pub fn patterns(&self) -> Vec<&str> {
        self.patterns.iter().map(Pattern::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_uses_media_endings() {
        let config = OrganizeConfig::default();
        assert_eq!(
            config.file_endings,
            vec!["3gp", "mov", "mp4", "png", "jpeg", "jpg"]
        );
        assert!(!config.remove_source);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_extension_patterns_prepend_wildcard() {
        let config = OrganizeConfig {
            file_endings: vec!["jpg".to_string(), "png".to_string()],
            ..Default::default()
        };
        assert_eq!(config.extension_patterns(), vec!["*.jpg", "*.png"]);
    }

    #[test]
    fn test_parse_file_endings_strips_prefixes_and_blanks() {
        assert_eq!(
            parse_file_endings(" jpg, *.png,.mov,,  "),
            vec!["jpg", "png", "mov"]
        );
        assert!(parse_file_endings("").is_empty());
    }

    #[test]
    fn test_filters_ignore_case() {
        let filters = ExtensionFilters::new(&["*.jpg"]).unwrap();
        assert!(filters.matches("a.jpg"));
        assert!(filters.matches("A.JPG"));
        assert!(filters.matches("holiday.Jpg"));
        assert!(!filters.matches("a.jpeg"));
        assert!(!filters.matches("a.jpg.txt"));
    }

    #[test]
    fn test_filters_match_path_uses_file_name() {
        let filters = ExtensionFilters::new(&["*.png"]).unwrap();
        assert!(filters.matches_path(Path::new("/some/dir.jpg/c.png")));
        assert!(!filters.matches_path(Path::new("/some/dir.png/c.txt")));
    }

    #[test]
    fn test_empty_filters_match_nothing() {
        let filters = ExtensionFilters::new::<&str>(&[]).unwrap();
        assert!(!filters.matches("a.jpg"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let config = OrganizeConfig {
            file_endings: vec!["[jpg".to_string()],
            ..Default::default()
        };
        let result = config.compile_filters();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidGlobPattern { ref pattern, .. }) if pattern == "*.[jpg"
        ));
    }

    #[test]
    fn test_validate_scan_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = OrganizeConfig {
            scan_dir: temp_dir.path().to_path_buf(),
            ..Default::default()
        };
        assert!(config.validate_scan_dir().is_ok());

        let missing = OrganizeConfig {
            scan_dir: temp_dir.path().join("missing"),
            ..Default::default()
        };
        let err = missing.validate_scan_dir().unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
