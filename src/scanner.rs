//! Recursive discovery of media files.
//!
//! The scanner lists the files of a directory that match the extension
//! filters, then descends into each subdirectory. Symbolic links are never
//! followed or returned. The whole result is collected before the organizer
//! starts.

use crate::config::ExtensionFilters;
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A regular file selected by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute path to the file.
    pub path: PathBuf,
    /// The final path component.
    pub file_name: String,
    /// Extension without the dot, as written on disk.
    pub extension: Option<String>,
}

impl FileEntry {
    fn from_path(path: PathBuf) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_string());

        Self {
            path,
            file_name,
            extension,
        }
    }
}

/// Errors that stop a scan before any file is returned.
#[derive(Debug)]
pub enum ScanError {
    /// The root directory could not be resolved or listed.
    RootUnreadable { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RootUnreadable { path, source } => {
                write!(f, "Cannot read scan folder {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RootUnreadable { source, .. } => Some(source),
        }
    }
}

/// Recursively collects every regular file under `root` whose name matches
/// `filters`.
///
/// Files of a directory come before the contents of its subdirectories.
/// Symbolic links are neither followed nor returned. Entries that cannot be
/// read below the root are logged and skipped.
///
/// # Errors
///
/// Returns [`ScanError::RootUnreadable`] if `root` itself cannot be resolved
/// to an absolute path or listed.
///
/// # Examples
///
/// ```no_run
/// use mediasort::config::ExtensionFilters;
/// use mediasort::scanner::scan;
/// use std::path::Path;
///
/// let filters = ExtensionFilters::new(&["*.jpg"]).unwrap();
/// let entries = scan(Path::new("/path/to/photos"), &filters).unwrap();
/// println!("Found {} photos", entries.len());
/// ```
pub fn scan(root: &Path, filters: &ExtensionFilters) -> Result<Vec<FileEntry>, ScanError> {
    let root_error = |source| ScanError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    };

    let absolute_root = fs::canonicalize(root).map_err(root_error)?;
    debug!("Scanning: {}", absolute_root.display());

    // Files sort before directories, so each folder's own files are yielded
    // before the depth-first walk enters its subfolders.
    let walker = WalkDir::new(&absolute_root)
        .follow_links(false)
        .sort_by(|a, b| a.file_type().is_dir().cmp(&b.file_type().is_dir()));

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(root_error(io::Error::from(err))),
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                continue;
            }
        };

        // Symlinks report their own file type because links are not followed
        if entry.file_type().is_file() && filters.matches_path(entry.path()) {
            files.push(FileEntry::from_path(entry.into_path()));
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn filters(patterns: &[&str]) -> ExtensionFilters {
        ExtensionFilters::new(patterns).expect("Failed to compile filters")
    }

    fn names(entries: &[FileEntry]) -> Vec<String> {
        let mut names: Vec<_> = entries.iter().map(|e| e.file_name.clone()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_scan_filters_by_extension() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join("a.jpg"), b"a").unwrap();
        fs::write(root.join("b.txt"), b"b").unwrap();
        fs::write(root.join("c.PNG"), b"c").unwrap();

        let entries = scan(root, &filters(&["*.jpg", "*.png"])).expect("Scan failed");

        assert_eq!(names(&entries), vec!["a.jpg", "c.PNG"]);
    }

    #[test]
    fn test_scan_recurses_into_nested_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        let deep = root.join("2019").join("trip").join("day1");
        fs::create_dir_all(&deep).unwrap();
        fs::write(root.join("top.jpg"), b"1").unwrap();
        fs::write(root.join("2019").join("mid.jpg"), b"2").unwrap();
        fs::write(deep.join("deep.jpg"), b"3").unwrap();
        fs::write(deep.join("skip.txt"), b"4").unwrap();

        let entries = scan(root, &filters(&["*.jpg"])).expect("Scan failed");

        assert_eq!(names(&entries), vec!["deep.jpg", "mid.jpg", "top.jpg"]);
    }

    #[test]
    fn test_scan_lists_files_before_subdirectories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub").join("inner.jpg"), b"1").unwrap();
        fs::write(root.join("outer.jpg"), b"2").unwrap();

        let entries = scan(root, &filters(&["*.jpg"])).expect("Scan failed");

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].file_name, "outer.jpg");
        assert_eq!(entries[1].file_name, "inner.jpg");
    }

    #[test]
    fn test_scan_walks_each_level_files_first() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        let level2 = root.join("b_dir").join("c_dir");
        fs::create_dir_all(&level2).unwrap();
        fs::write(level2.join("3.jpg"), b"3").unwrap();
        fs::write(root.join("b_dir").join("2.jpg"), b"2").unwrap();
        fs::write(root.join("z_top.jpg"), b"1").unwrap();

        let entries = scan(root, &filters(&["*.jpg"])).expect("Scan failed");

        let order: Vec<_> = entries.iter().map(|e| e.file_name.as_str()).collect();
        assert_eq!(order, vec!["z_top.jpg", "2.jpg", "3.jpg"]);
    }

    #[test]
    fn test_scan_entries_are_absolute() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("a.mov"), b"1").unwrap();

        let entries = scan(temp_dir.path(), &filters(&["*.mov"])).expect("Scan failed");

        assert_eq!(entries.len(), 1);
        assert!(entries[0].path.is_absolute());
        assert_eq!(entries[0].extension.as_deref(), Some("mov"));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_symlinks() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().join("root");
        let elsewhere = temp_dir.path().join("elsewhere");
        fs::create_dir(&root).unwrap();
        fs::create_dir(&elsewhere).unwrap();
        fs::write(elsewhere.join("linked.jpg"), b"1").unwrap();
        fs::write(root.join("real.jpg"), b"2").unwrap();
        symlink(elsewhere.join("linked.jpg"), root.join("alias.jpg")).unwrap();
        symlink(&elsewhere, root.join("linked_dir")).unwrap();

        let entries = scan(&root, &filters(&["*.jpg"])).expect("Scan failed");

        assert_eq!(names(&entries), vec!["real.jpg"]);
    }

    #[test]
    fn test_scan_missing_root_is_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result = scan(&temp_dir.path().join("missing"), &filters(&["*.jpg"]));
        assert!(matches!(result, Err(ScanError::RootUnreadable { .. })));
    }
}
