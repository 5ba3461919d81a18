//! mediasort - Copy photos and videos into date-based folders
//!
//! This library scans a directory tree for media files, reads the EXIF
//! capture timestamp of each one, and copies it into
//! `<target>/<year>/<MM>_<MonthName>/`, or `<target>/unknown/` when no
//! timestamp is available. Sources can optionally be removed after a
//! verified copy.

pub mod cli;
pub mod config;
pub mod file_organizer;
pub mod metadata;
pub mod output;
pub mod scanner;

pub use config::{ConfigError, ExtensionFilters, OrganizeConfig};
pub use file_organizer::{DestinationBucket, FileOrganizer, TransferReport, organize};
pub use metadata::{CaptureTimestamp, ExtractError, extract};
pub use scanner::{FileEntry, scan};

pub use cli::{Args, run_cli};
