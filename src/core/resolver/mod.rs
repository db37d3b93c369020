//! # Resolver Module
//!
//! Decides the capture moment of a media file.
//!
//! Evidence is tried in a fixed order and the first usable answer wins:
//! 1. Date tags, by priority (`Content Create Date`, `Date/Time Original`,
//!    `Create Date`, `Date Created`, then any configured extras)
//! 2. A `YYYY-MM-DD HH.MM.SS` filename
//! 3. Filesystem birth time, else modification time
//!
//! The tag order decides ambiguous files, so it must not be reshuffled.

mod strategies;

pub use strategies::{parse_filename_timestamp, parse_tag_timestamp, stat_timestamp};

use crate::core::metadata::TagMap;
use crate::error::ResolveError;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize, Serializer};
use std::path::Path;

/// Date tags in priority order
pub const DEFAULT_DATE_TAGS: &[&str] = &[
    "Content Create Date",
    "Date/Time Original",
    "Create Date",
    "Date Created",
];

/// A resolved wall-clock time, optionally with its UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTime {
    /// Local wall-clock time at the capture location
    pub local: NaiveDateTime,
    /// UTC offset, when the evidence carried one
    pub offset: Option<FixedOffset>,
}

impl CaptureTime {
    pub fn naive(local: NaiveDateTime) -> Self {
        Self {
            local,
            offset: None,
        }
    }

    pub fn with_offset(datetime: DateTime<FixedOffset>) -> Self {
        Self {
            local: datetime.naive_local(),
            offset: Some(*datetime.offset()),
        }
    }

    pub fn year(&self) -> i32 {
        self.local.year()
    }

    pub fn month(&self) -> u32 {
        self.local.month()
    }

    pub fn day(&self) -> u32 {
        self.local.day()
    }

    pub fn hour(&self) -> u32 {
        self.local.hour()
    }

    pub fn minute(&self) -> u32 {
        self.local.minute()
    }

    pub fn second(&self) -> u32 {
        self.local.second()
    }

    /// `YYYY-MM-DD_HH-MM-SS`
    pub fn file_stem(&self) -> String {
        self.local.format("%Y-%m-%d_%H-%M-%S").to_string()
    }
}

impl std::fmt::Display for CaptureTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{}{}", self.local.format("%Y-%m-%dT%H:%M:%S"), offset),
            None => write!(f, "{}", self.local.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

impl Serialize for CaptureTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Which piece of evidence produced a timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum TimestampSource {
    /// A metadata tag, with the label as stored in the tag map
    Tag(String),
    Filename,
    BirthTime,
    ModifiedTime,
}

impl std::fmt::Display for TimestampSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimestampSource::Tag(label) => write!(f, "tag `{}`", label),
            TimestampSource::Filename => write!(f, "filename"),
            TimestampSource::BirthTime => write!(f, "file creation time"),
            TimestampSource::ModifiedTime => write!(f, "file modification time"),
        }
    }
}

/// Output of the resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTimestamp {
    pub time: CaptureTime,
    pub source: TimestampSource,
}

/// The ordered strategy chain
#[derive(Debug, Clone)]
pub struct TimestampResolver {
    date_tags: Vec<String>,
}

impl TimestampResolver {
    /// Resolver with the default tag priority
    pub fn new() -> Self {
        Self {
            date_tags: DEFAULT_DATE_TAGS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Append extra tag labels after the default ones
    pub fn with_extra_tags(mut self, extra: &[String]) -> Self {
        self.date_tags.extend(extra.iter().cloned());
        self
    }

    pub fn date_tags(&self) -> &[String] {
        &self.date_tags
    }

    /// Resolve the capture time of `path` given its tags
    ///
    /// Fails only if the file cannot be stat'ed once the tag and
    /// filename strategies have come up empty.
    pub fn resolve(&self, path: &Path, tags: &TagMap) -> Result<ResolvedTimestamp, ResolveError> {
        if let Some(resolved) = self.from_tags(path, tags) {
            return Ok(resolved);
        }

        if let Some(time) = parse_filename_timestamp(path) {
            tracing::debug!(path = %path.display(), "timestamp from filename");
            return Ok(ResolvedTimestamp {
                time,
                source: TimestampSource::Filename,
            });
        }

        report_date_tags(path, tags);
        stat_timestamp(path)
    }

    fn from_tags(&self, path: &Path, tags: &TagMap) -> Option<ResolvedTimestamp> {
        self.date_tags.iter().find_map(|wanted| {
            let (label, raw) = tags.find(wanted)?;
            match parse_tag_timestamp(raw) {
                Some(time) => {
                    tracing::debug!(path = %path.display(), tag = label, value = raw, "timestamp from tag");
                    Some(ResolvedTimestamp {
                        time,
                        source: TimestampSource::Tag(label.to_string()),
                    })
                }
                None => {
                    tracing::debug!(path = %path.display(), tag = label, value = raw, "unparsable date tag");
                    None
                }
            }
        })
    }
}

impl Default for TimestampResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Tags that look like dates but are not about the file itself
///
/// Listed when falling back to the filesystem, so a missing label can
/// be added to the priority list.
pub fn candidate_date_tags(tags: &TagMap) -> Vec<(&str, &str)> {
    tags.iter()
        .filter(|(key, _)| {
            let key = key.to_lowercase();
            key.contains("date") && !key.contains("file")
        })
        .collect()
}

fn report_date_tags(path: &Path, tags: &TagMap) {
    let candidates = candidate_date_tags(tags);
    if candidates.is_empty() {
        tracing::warn!(path = %path.display(), "no usable date evidence, using filesystem time");
        return;
    }
    let listing = candidates
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("; ");
    tracing::warn!(
        path = %path.display(),
        tags = %listing,
        "no usable date evidence, using filesystem time; unrecognized date tags present"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs::File;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;
    use tracing_subscriber::fmt::MakeWriter;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    /// Log sink for checking warnings
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    /// Run `f` with warnings captured into the returned buffer
    fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();
        let value = tracing::subscriber::with_default(subscriber, f);
        (value, buffer.contents())
    }

    fn touch(dir: &TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        File::create(&path).unwrap();
        path
    }

    #[test]
    fn tag_wins_over_filename() {
        let dir = TempDir::new().unwrap();
        let path = touch(&dir, "2019-12-31 23.59.58.jpg");
        let tags: TagMap = [("Create Date", "2021:06:15 14:30:00")].into_iter().collect();

        let resolved = TimestampResolver::new().resolve(&path, &tags).unwrap();
        assert_eq!(resolved.time.local, at(2021, 6, 15, 14, 30, 0));
        assert_eq!(resolved.source, TimestampSource::Tag("Create Date".to_string()));
    }

    #[test]
    fn tag_priority_is_respected() {
        let dir = TempDir::new().unwrap();
        let path = touch(&dir, "a.mov");
        let tags: TagMap = [
            ("Create Date", "2020:01:01 00:00:00"),
            ("Date/Time Original", "2019:01:01 00:00:00"),
            ("Content Create Date", "2018:01:01 00:00:00+01:00"),
        ]
        .into_iter()
        .collect();

        let resolved = TimestampResolver::new().resolve(&path, &tags).unwrap();
        assert_eq!(resolved.time.local, at(2018, 1, 1, 0, 0, 0));
        assert!(resolved.time.offset.is_some());
    }

    #[test]
    fn unparsable_tag_falls_to_next() {
        let dir = TempDir::new().unwrap();
        let path = touch(&dir, "a.jpg");
        let tags: TagMap = [
            ("Date/Time Original", "0000:00:00 00:00:00"),
            ("Create Date", "2021:06:15 14:30:00"),
        ]
        .into_iter()
        .collect();

        let resolved = TimestampResolver::new().resolve(&path, &tags).unwrap();
        assert_eq!(resolved.time.local, at(2021, 6, 15, 14, 30, 0));
        assert_eq!(resolved.source, TimestampSource::Tag("Create Date".to_string()));
    }

    #[test]
    fn fractional_seconds_are_stripped() {
        let dir = TempDir::new().unwrap();
        let path = touch(&dir, "a.jpg");
        let tags: TagMap = [("Date/Time Original", "2023:04:01 10:00:00.50")]
            .into_iter()
            .collect();

        let resolved = TimestampResolver::new().resolve(&path, &tags).unwrap();
        assert_eq!(resolved.time, CaptureTime::naive(at(2023, 4, 1, 10, 0, 0)));
    }

    #[test]
    fn filename_used_without_tags() {
        let dir = TempDir::new().unwrap();
        let path = touch(&dir, "2019-12-31 23.59.58.mov");

        let resolved = TimestampResolver::new().resolve(&path, &TagMap::new()).unwrap();
        assert_eq!(resolved.time.local, at(2019, 12, 31, 23, 59, 58));
        assert_eq!(resolved.source, TimestampSource::Filename);
    }

    #[test]
    fn stat_fallback_never_fails_for_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = touch(&dir, "IMG_0001.xyz");
        let tags: TagMap = [("Camera Model Name", "X100V")].into_iter().collect();

        let resolved = TimestampResolver::new().resolve(&path, &tags).unwrap();
        assert!(matches!(
            resolved.source,
            TimestampSource::BirthTime | TimestampSource::ModifiedTime
        ));
    }

    #[test]
    fn stat_fallback_warns_with_unrecognized_date_tags() {
        let dir = TempDir::new().unwrap();
        let path = touch(&dir, "IMG_0001.jpg");
        let tags: TagMap = [
            ("Media Create Date", "2020:01:01 00:00:00"),
            ("File Modification Date/Time", "2024:01:01 00:00:00"),
            ("Make", "Canon"),
        ]
        .into_iter()
        .collect();

        let (resolved, logs) = capture_warnings(|| TimestampResolver::new().resolve(&path, &tags));

        assert!(resolved.is_ok());
        assert!(logs.contains("WARN"), "{}", logs);
        assert!(logs.contains("using filesystem time"), "{}", logs);
        assert!(logs.contains("IMG_0001.jpg"), "{}", logs);
        assert!(logs.contains("Media Create Date=2020:01:01 00:00:00"), "{}", logs);
        assert!(!logs.contains("File Modification"), "{}", logs);
    }

    #[test]
    fn stat_fallback_warns_without_any_tags() {
        let dir = TempDir::new().unwrap();
        let path = touch(&dir, "scan.png");

        let (_, logs) = capture_warnings(|| TimestampResolver::new().resolve(&path, &TagMap::new()));

        assert!(logs.contains("no usable date evidence"), "{}", logs);
    }

    #[test]
    fn tag_resolution_is_quiet() {
        let dir = TempDir::new().unwrap();
        let path = touch(&dir, "a.jpg");
        let tags: TagMap = [("Create Date", "2021:06:15 14:30:00")].into_iter().collect();

        let (_, logs) = capture_warnings(|| TimestampResolver::new().resolve(&path, &tags));

        assert!(logs.is_empty(), "{}", logs);
    }

    #[test]
    fn stat_fallback_fails_for_missing_file() {
        let result = TimestampResolver::new()
            .resolve(Path::new("/nonexistent/IMG_0001.jpg"), &TagMap::new());
        assert!(matches!(result, Err(ResolveError::Stat { .. })));
    }

    #[test]
    fn extra_tags_come_after_defaults() {
        let dir = TempDir::new().unwrap();
        let path = touch(&dir, "a.jpg");
        let resolver = TimestampResolver::new().with_extra_tags(&["Track Create Date".to_string()]);
        assert_eq!(resolver.date_tags().last().map(String::as_str), Some("Track Create Date"));

        let tags: TagMap = [
            ("Track Create Date", "2015:05:05 05:05:05"),
            ("Date Created", "2016:06:06 06:06:06"),
        ]
        .into_iter()
        .collect();
        let resolved = resolver.resolve(&path, &tags).unwrap();
        assert_eq!(resolved.time.local, at(2016, 6, 6, 6, 6, 6));

        let only_extra: TagMap = [("Track Create Date", "2015:05:05 05:05:05")].into_iter().collect();
        let resolved = resolver.resolve(&path, &only_extra).unwrap();
        assert_eq!(resolved.time.local, at(2015, 5, 5, 5, 5, 5));
    }

    #[test]
    fn resolving_twice_is_stable() {
        let dir = TempDir::new().unwrap();
        let path = touch(&dir, "holiday.png");
        let resolver = TimestampResolver::new();

        let first = resolver.resolve(&path, &TagMap::new()).unwrap();
        let second = resolver.resolve(&path, &TagMap::new()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn candidate_tags_exclude_file_dates() {
        let tags: TagMap = [
            ("File Modification Date/Time", "2024:01:01 00:00:00"),
            ("Media Create Date", "2020:01:01 00:00:00"),
            ("Make", "Canon"),
        ]
        .into_iter()
        .collect();
        let candidates = candidate_date_tags(&tags);
        assert_eq!(candidates, vec![("Media Create Date", "2020:01:01 00:00:00")]);
    }

    #[test]
    fn file_stem_format() {
        let time = CaptureTime::naive(at(2021, 6, 5, 4, 3, 2));
        assert_eq!(time.file_stem(), "2021-06-05_04-03-02");
    }
}
