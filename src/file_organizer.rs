//! Copying scanned files into date-based bucket directories.
//!
//! Each file is read, its capture timestamp extracted, and a copy placed in
//! `<target>/<year>/<MM>_<MonthName>/` or `<target>/unknown/`. Existing
//! destination files are never overwritten. Sources are only removed after a
//! copy made by this run is confirmed on disk.

use crate::metadata::{self, CaptureTimestamp};
use crate::scanner::FileEntry;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Name of the bucket for files without a usable capture timestamp.
pub const UNKNOWN_BUCKET: &str = "unknown";

/// A progress line is logged every this many files.
const PROGRESS_INTERVAL: usize = 100;

/// The folder a file is routed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DestinationBucket {
    /// `<year>/<MM>_<MonthName>`, e.g. `2023/07_July`.
    Dated {
        year: i32,
        month: u32,
        month_name: String,
    },
    /// `unknown`.
    Unknown,
}

impl DestinationBucket {
    /// Chooses the bucket for an optional capture timestamp.
    ///
    /// # Arguments
    ///
    /// * `timestamp` - The extracted capture timestamp, if any
    pub fn from_timestamp(timestamp: Option<&CaptureTimestamp>) -> Self {
        match timestamp {
            Some(ts) => Self::Dated {
                year: ts.year(),
                month: ts.month(),
                month_name: ts.month_name(),
            },
            None => Self::Unknown,
        }
    }

    /// Path of the bucket relative to the target root.
    pub fn relative_path(&self) -> PathBuf {
        match self {
            Self::Dated {
                year,
                month,
                month_name,
            } => PathBuf::from(year.to_string()).join(format!("{:02}_{}", month, month_name)),
            Self::Unknown => PathBuf::from(UNKNOWN_BUCKET),
        }
    }

    /// Absolute bucket directory below `target_root`.
    ///
    /// # Arguments
    ///
    /// * `target_root` - The root directory that receives all buckets
    pub fn dir_in(&self, target_root: &Path) -> PathBuf {
        target_root.join(self.relative_path())
    }
}

impl std::fmt::Display for DestinationBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dated {
                year,
                month,
                month_name,
            } => write!(f, "{}/{:02}_{}", year, month, month_name),
            Self::Unknown => write!(f, "{}", UNKNOWN_BUCKET),
        }
    }
}

/// Errors that can occur while transferring a single file.
#[derive(Debug)]
pub enum OrganizeError {
    /// Failed to create a bucket directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A file with the same name is already in the bucket.
    DestinationExists { destination: PathBuf },
    /// Failed to copy a file into its bucket.
    CopyFailed {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// Failed to delete the source after copying.
    RemoveFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The path has no file name to copy under.
    MissingFileName { path: PathBuf },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::DestinationExists { destination } => {
                write!(f, "Destination {} already exists", destination.display())
            }
            Self::CopyFailed {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to copy {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::RemoveFailed { path, source } => {
                write!(f, "Failed to remove {}: {}", path.display(), source)
            }
            Self::MissingFileName { path } => {
                write!(f, "Path {} has no file name", path.display())
            }
        }
    }
}

impl std::error::Error for OrganizeError {}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Outcome of an organize run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransferReport {
    /// Number of files copied into a bucket.
    pub copied: usize,
    /// Number of source files deleted after copying.
    pub removed: usize,
    /// Files that could not be copied or removed, with the reason.
    pub failures: Vec<(PathBuf, String)>,
    /// Files per bucket: copied files, or planned files in a dry run.
    pub bucket_counts: BTreeMap<String, usize>,
}

impl TransferReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no copy or removal failed.
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record_bucket(&mut self, bucket: &DestinationBucket) {
        *self.bucket_counts.entry(bucket.to_string()).or_insert(0) += 1;
    }

    fn record_failure(&mut self, path: &Path, error: &OrganizeError) {
        warn!("{}", error);
        self.failures.push((path.to_path_buf(), error.to_string()));
    }
}

/// Copies files into bucket directories below a target root.
#[derive(Debug, Clone)]
pub struct FileOrganizer {
    target_root: PathBuf,
    remove_source: bool,
    dry_run: bool,
}

impl FileOrganizer {
    /// Creates an organizer writing below `target_root`.
    ///
    /// # Arguments
    ///
    /// * `target_root` - The root directory the buckets are created in
    /// * `remove_source` - Delete each source after a verified copy
    pub fn new(target_root: impl Into<PathBuf>, remove_source: bool) -> Self {
        Self {
            target_root: target_root.into(),
            remove_source,
            dry_run: false,
        }
    }

    /// Only log where each file would go; touch nothing on disk.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Transfers every entry in order and tallies the results.
    ///
    /// A failure on one file is recorded in the report and the run moves on
    /// to the next file.
    ///
    /// # Arguments
    ///
    /// * `entries` - The scanned files, processed in order
    ///
    /// # Returns
    ///
    /// A [`TransferReport`] with the copy and removal counters, the failures
    /// and the number of files per bucket.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mediasort::config::ExtensionFilters;
    /// use mediasort::file_organizer::FileOrganizer;
    /// use mediasort::scanner::scan;
    /// use std::path::Path;
    ///
    /// let filters = ExtensionFilters::new(&["*.jpg"]).unwrap();
    /// let entries = scan(Path::new("/path/to/photos"), &filters).unwrap();
    ///
    /// let report = FileOrganizer::new("/path/to/sorted", false).organize(&entries);
    /// println!("Copied {} files", report.copied);
    /// ```
    pub fn organize(&self, entries: &[FileEntry]) -> TransferReport {
        let mut report = TransferReport::new();

        for (i, entry) in entries.iter().enumerate() {
            if i % PROGRESS_INTERVAL == 0 {
                info!(
                    "Processed {} files. Still to go: {}",
                    i,
                    entries.len() - i
                );
            }

            let bucket = Self::bucket_for(&entry.path);

            if self.dry_run {
                info!(
                    "Would copy {} to {}/",
                    entry.path.display(),
                    bucket.dir_in(&self.target_root).display()
                );
                report.record_bucket(&bucket);
                continue;
            }

            let destination = match self.copy_into_bucket(entry, &bucket) {
                Ok(destination) => {
                    report.copied += 1;
                    report.record_bucket(&bucket);
                    destination
                }
                Err(e) => {
                    report.record_failure(&entry.path, &e);
                    continue;
                }
            };

            if self.remove_source {
                match Self::remove_verified(&entry.path, &destination) {
                    Ok(true) => report.removed += 1,
                    Ok(false) => {}
                    Err(e) => report.record_failure(&entry.path, &e),
                }
            }
        }

        info!("Copied {} files.", report.copied);
        info!("Removed {} files.", report.removed);

        report
    }

    /// Reads a file and picks its bucket.
    ///
    /// An unreadable file or one without a valid capture timestamp goes to
    /// the unknown bucket.
    ///
    /// # Arguments
    ///
    /// * `path` - The file to read the capture timestamp from
    pub fn bucket_for(path: &Path) -> DestinationBucket {
        let timestamp = match fs::read(path) {
            Ok(data) => match metadata::extract(&data) {
                Ok(ts) => Some(ts),
                Err(e) => {
                    debug!("{}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                debug!("Cannot read {}: {}", path.display(), e);
                None
            }
        };

        DestinationBucket::from_timestamp(timestamp.as_ref())
    }

    /// Copies `entry` into `bucket` below the target root and returns the
    /// path of the new file.
    ///
    /// The bucket directory and its parents are created when missing.
    ///
    /// # Arguments
    ///
    /// * `entry` - The scanned file to copy
    /// * `bucket` - The bucket chosen for the file
    ///
    /// # Returns
    ///
    /// Returns the destination path, or an `OrganizeError` if the directory
    /// cannot be created, the destination already exists, or the copy fails.
    pub fn copy_into_bucket(
        &self,
        entry: &FileEntry,
        bucket: &DestinationBucket,
    ) -> OrganizeResult<PathBuf> {
        let bucket_dir = bucket.dir_in(&self.target_root);
        fs::create_dir_all(&bucket_dir).map_err(|e| OrganizeError::DirectoryCreationFailed {
            path: bucket_dir.clone(),
            source: e,
        })?;

        let file_name = entry
            .path
            .file_name()
            .ok_or_else(|| OrganizeError::MissingFileName {
                path: entry.path.clone(),
            })?;
        let destination = bucket_dir.join(file_name);

        copy_no_clobber(&entry.path, &destination).map_err(|e| {
            if e.kind() == io::ErrorKind::AlreadyExists {
                OrganizeError::DestinationExists {
                    destination: destination.clone(),
                }
            } else {
                OrganizeError::CopyFailed {
                    source: entry.path.clone(),
                    destination: destination.clone(),
                    source_error: e,
                }
            }
        })?;

        debug!("Copied {} to {}", entry.path.display(), destination.display());
        Ok(destination)
    }

    /// Deletes `source` if both it and its copy at `destination` exist.
    ///
    /// # Arguments
    ///
    /// * `source` - The original file to delete
    /// * `destination` - The copy that must exist first
    ///
    /// # Returns
    ///
    /// Returns `Ok(true)` if the source was deleted, and `Ok(false)` without
    /// touching anything when either file is missing.
    pub fn remove_verified(source: &Path, destination: &Path) -> OrganizeResult<bool> {
        if !(source.exists() && destination.exists()) {
            warn!(
                "Keeping {}: copy not found at {}",
                source.display(),
                destination.display()
            );
            return Ok(false);
        }

        fs::remove_file(source).map_err(|e| OrganizeError::RemoveFailed {
            path: source.to_path_buf(),
            source: e,
        })?;

        Ok(true)
    }
}

/// Copies `entries` below `target_root`, optionally removing each source.
///
/// Shorthand for [`FileOrganizer::organize`].
pub fn organize(entries: &[FileEntry], target_root: &Path, remove_source: bool) -> TransferReport {
    FileOrganizer::new(target_root, remove_source).organize(entries)
}

/// Copies `source` to `destination`, failing with `AlreadyExists` instead of
/// overwriting. A partial copy is deleted on error.
fn copy_no_clobber(source: &Path, destination: &Path) -> io::Result<u64> {
    let mut reader = File::open(source)?;
    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)?;

    let result = io::copy(&mut reader, &mut writer).and_then(|n| writer.sync_all().map(|_| n));
    drop(writer);

    match result {
        Ok(bytes) => {
            let permissions = reader
                .metadata()
                .and_then(|meta| fs::set_permissions(destination, meta.permissions()));
            if let Err(e) = permissions {
                debug!(
                    "Cannot copy permissions to {}: {}",
                    destination.display(),
                    e
                );
            }
            Ok(bytes)
        }
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(destination) {
                debug!(
                    "Cannot remove partial copy {}: {}",
                    destination.display(),
                    cleanup
                );
            }
            Err(e)
        }
    }
}
