//! The individual evidence strategies.
//!
//! Tag and filename parsing return `None` when they don't apply; only
//! the filesystem strategy can fail, and only on a stat error.

use super::{CaptureTime, ResolvedTimestamp, TimestampSource};
use crate::error::ResolveError;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

const TAG_FORMAT: &str = "%Y:%m:%d %H:%M:%S";
const TAG_FORMAT_WITH_OFFSET: &str = "%Y:%m:%d %H:%M:%S%#z";

/// Parse a tag value of the form `YYYY:MM:DD HH:MM:SS[offset]`
///
/// If the offset-aware form fails, everything after the last `.` is
/// dropped (sub-second fractions, and any offset behind them) and the
/// rest is parsed without an offset.
pub fn parse_tag_timestamp(raw: &str) -> Option<CaptureTime> {
    let value = raw.trim();

    if let Ok(datetime) = DateTime::parse_from_str(value, TAG_FORMAT_WITH_OFFSET) {
        return Some(CaptureTime::with_offset(datetime));
    }

    let truncated = match value.rfind('.') {
        Some(idx) => &value[..idx],
        None => value,
    };
    NaiveDateTime::parse_from_str(truncated.trim_end(), TAG_FORMAT)
        .ok()
        .map(CaptureTime::naive)
}

/// Parse a `YYYY-MM-DD HH.MM.SS` file stem
///
/// The stem must split into exactly one date part and one time part
/// on a single space, each with exactly three numeric fields.
pub fn parse_filename_timestamp(path: &Path) -> Option<CaptureTime> {
    let stem = path.file_stem()?.to_str()?;

    let (date, time) = stem.split_once(' ')?;
    let date: Vec<&str> = date.split('-').collect();
    let time: Vec<&str> = time.split('.').collect();
    if date.len() != 3 || time.len() != 3 {
        return None;
    }

    let year: i32 = date[0].parse().ok()?;
    let month: u32 = date[1].parse().ok()?;
    let day: u32 = date[2].parse().ok()?;
    let hour: u32 = time[0].parse().ok()?;
    let minute: u32 = time[1].parse().ok()?;
    let second: u32 = time[2].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(hour, minute, second)
        .map(CaptureTime::naive)
}

/// Filesystem birth time, falling back to modification time
///
/// Converted to the host's local time zone.
pub fn stat_timestamp(path: &Path) -> Result<ResolvedTimestamp, ResolveError> {
    let metadata = fs::metadata(path).map_err(|e| ResolveError::Stat {
        path: path.to_path_buf(),
        source: e,
    })?;

    let (time, source) = match metadata.created() {
        Ok(created) => (created, TimestampSource::BirthTime),
        Err(_) => {
            let modified = metadata.modified().map_err(|e| ResolveError::Stat {
                path: path.to_path_buf(),
                source: e,
            })?;
            (modified, TimestampSource::ModifiedTime)
        }
    };

    Ok(ResolvedTimestamp {
        time: CaptureTime::naive(local_time(time)),
        source,
    })
}

fn local_time(time: SystemTime) -> NaiveDateTime {
    let datetime: DateTime<Local> = time.into();
    datetime.naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use std::fs::File;
    use tempfile::TempDir;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn plain_tag_value() {
        let time = parse_tag_timestamp("2021:06:15 14:30:00").unwrap();
        assert_eq!(time, CaptureTime::naive(at(2021, 6, 15, 14, 30, 0)));
    }

    #[test]
    fn tag_value_with_offset() {
        let time = parse_tag_timestamp("2021:06:15 14:30:00+02:00").unwrap();
        assert_eq!(time.local, at(2021, 6, 15, 14, 30, 0));
        assert_eq!(time.offset, FixedOffset::east_opt(2 * 3600));

        let compact = parse_tag_timestamp("2021:06:15 14:30:00-0500").unwrap();
        assert_eq!(compact.offset, FixedOffset::west_opt(5 * 3600));
    }

    #[test]
    fn tag_value_with_zulu() {
        let time = parse_tag_timestamp("2021:06:15 14:30:00Z").unwrap();
        assert_eq!(time.offset, FixedOffset::east_opt(0));
    }

    #[test]
    fn fraction_is_dropped() {
        let time = parse_tag_timestamp("2023:04:01 10:00:00.50").unwrap();
        assert_eq!(time, CaptureTime::naive(at(2023, 4, 1, 10, 0, 0)));

        let with_offset = parse_tag_timestamp("2023:04:01 10:00:00.123+02:00").unwrap();
        assert_eq!(with_offset, CaptureTime::naive(at(2023, 4, 1, 10, 0, 0)));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert!(parse_tag_timestamp("  2021:06:15 14:30:00 ").is_some());
    }

    #[test]
    fn bad_tag_values() {
        assert!(parse_tag_timestamp("").is_none());
        assert!(parse_tag_timestamp("0000:00:00 00:00:00").is_none());
        assert!(parse_tag_timestamp("2021-06-15 14:30:00").is_none());
        assert!(parse_tag_timestamp("2021:13:15 14:30:00").is_none());
        assert!(parse_tag_timestamp("yesterday").is_none());
    }

    #[test]
    fn filename_pattern() {
        let time = parse_filename_timestamp(Path::new("/dump/2019-12-31 23.59.58.mov")).unwrap();
        assert_eq!(time, CaptureTime::naive(at(2019, 12, 31, 23, 59, 58)));
    }

    #[test]
    fn filename_single_digit_fields() {
        let time = parse_filename_timestamp(Path::new("2019-1-2 3.4.5.jpg")).unwrap();
        assert_eq!(time.local, at(2019, 1, 2, 3, 4, 5));
    }

    #[test]
    fn filename_deviations_are_skipped() {
        for name in [
            "IMG_0001.jpg",
            "2019-12-31_23.59.58.jpg",
            "2019-12-31 23-59-58.jpg",
            "2019-12-31 23.59.jpg",
            "2019-12 23.59.58.jpg",
            "2019-12-31 23.59.58 copy.jpg",
            "2019-12-aa 23.59.58.jpg",
            "2019-02-30 10.00.00.jpg",
            "2019-12-31 25.00.00.jpg",
        ] {
            assert!(parse_filename_timestamp(Path::new(name)).is_none(), "{}", name);
        }
    }

    #[test]
    fn stat_uses_birth_or_modified_time() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clip.mp4");
        File::create(&path).unwrap();

        let metadata = fs::metadata(&path).unwrap();
        let expected = metadata
            .created()
            .or_else(|_| metadata.modified())
            .map(local_time)
            .unwrap();

        let resolved = stat_timestamp(&path).unwrap();
        assert_eq!(resolved.time.local, expected);
        assert!(resolved.time.offset.is_none());
    }
}
