//! Capture timestamp extraction.
//!
//! The EXIF container formats (JPEG APP1, TIFF, PNG `eXIf`, WebP, HEIF) are
//! decoded by the `exif` crate. This module only asks it for the
//! `DateTimeOriginal` field of the primary image and parses the value with
//! the fixed EXIF layout `yyyy:MM:dd hh:mm:ss`.

use chrono::{Datelike, NaiveDateTime, Timelike};
use exif::{In, Reader, Tag, Value};
use std::io::Cursor;

/// chrono format of an EXIF date-time value.
const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";
const EXIF_DATETIME_LEN: usize = 19;

/// The moment a photo or video was recorded, as written by the device.
///
/// Always a complete, valid calendar date and time. A value that cannot be
/// parsed completely never becomes a `CaptureTimestamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaptureTimestamp(NaiveDateTime);

impl CaptureTimestamp {
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month number, 1 through 12.
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// English month name, e.g. `July`.
    pub fn month_name(&self) -> String {
        self.0.format("%B").to_string()
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }
}

impl std::fmt::Display for CaptureTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(EXIF_DATETIME_FORMAT))
    }
}

/// Why no capture timestamp could be recovered from a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The container or its EXIF block could not be decoded.
    ParseError(String),
    /// The file carries no `DateTimeOriginal` field.
    NoSuchField,
    /// The data ended before the EXIF block was complete.
    Truncated,
    /// The field exists but is not a valid `yyyy:MM:dd hh:mm:ss` value.
    InvalidTimestamp(String),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParseError(reason) => write!(f, "Error parsing EXIF: {}", reason),
            Self::NoSuchField => write!(f, "No DateTimeOriginal field"),
            Self::Truncated => write!(f, "EXIF data is truncated"),
            Self::InvalidTimestamp(value) => write!(f, "Invalid capture timestamp '{}'", value),
        }
    }
}

impl std::error::Error for ExtractError {}

impl From<exif::Error> for ExtractError {
    fn from(err: exif::Error) -> Self {
        match err {
            // the container readers report EOF as "Broken JPEG file" etc.
            exif::Error::InvalidFormat(reason)
                if reason.starts_with("Broken ") || reason.starts_with("Truncated") =>
            {
                Self::Truncated
            }
            exif::Error::NotFound(_) => Self::NoSuchField,
            other => Self::ParseError(other.to_string()),
        }
    }
}

/// Extracts the capture timestamp from the complete contents of a file.
///
/// # Errors
///
/// Returns an [`ExtractError`] describing why no timestamp is available.
/// Callers treat every error the same way: the file has no known date.
///
/// # Examples
///
/// ```
/// use mediasort::metadata::{extract, ExtractError};
///
/// // Plain text has no recognizable image container.
/// assert!(matches!(extract(b"hello"), Err(ExtractError::ParseError(_))));
/// ```
pub fn extract(data: &[u8]) -> Result<CaptureTimestamp, ExtractError> {
    let exif = Reader::new().read_from_container(&mut Cursor::new(data))?;

    let field = exif
        .get_field(Tag::DateTimeOriginal, In::PRIMARY)
        .ok_or(ExtractError::NoSuchField)?;

    let raw = match field.value {
        Value::Ascii(ref values) => values.first().ok_or(ExtractError::NoSuchField)?,
        _ => {
            return Err(ExtractError::InvalidTimestamp(
                field.display_value().to_string(),
            ));
        }
    };

    let text = String::from_utf8_lossy(raw);
    parse_capture_timestamp(&text).ok_or_else(|| ExtractError::InvalidTimestamp(text.to_string()))
}

/// Parses an EXIF date-time string such as `2023:07:04 10:15:30`.
///
/// The value must be exactly `yyyy:MM:dd hh:mm:ss` with every digit present
/// and every component in range. One trailing NUL is ignored. Anything else
/// yields `None`.
pub fn parse_capture_timestamp(value: &str) -> Option<CaptureTimestamp> {
    let value = value.strip_suffix('\0').unwrap_or(value);
    if value.len() != EXIF_DATETIME_LEN {
        return None;
    }

    let well_formed = value.bytes().enumerate().all(|(i, b)| match i {
        4 | 7 | 13 | 16 => b == b':',
        10 => b == b' ',
        _ => b.is_ascii_digit(),
    });
    if !well_formed {
        return None;
    }

    let datetime = NaiveDateTime::parse_from_str(value, EXIF_DATETIME_FORMAT).ok()?;
    // chrono encodes a leap second (`:60`) as an extra second of nanoseconds
    if datetime.nanosecond() != 0 {
        return None;
    }

    Some(CaptureTimestamp(datetime))
}
