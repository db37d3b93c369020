//! Types for the organize module.

use crate::core::classifier::MediaKind;
use crate::core::resolver::{CaptureTime, TimestampSource};
use crate::events::ImportSummary;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What to do when the planned destination is already taken
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Append `_1`, `_2`, ... to the stem until the name is free
    #[default]
    Rename,
    /// Report the file as failed and leave it in place
    Skip,
}

/// Operation mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    /// Move files into the library
    #[default]
    Move,
    /// Copy files into the library (keep originals)
    Copy,
}

/// Where a file should end up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedMove {
    /// `<root>/<YYYY>/<MM>`
    pub directory: PathBuf,
    /// `YYYY-MM-DD_HH-MM-SS.<ext>`
    pub filename: String,
}

impl PlannedMove {
    pub fn destination(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

/// Final state of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum FileStatus {
    /// Moved or copied into the library
    Placed,
    /// Would have been placed (dry run)
    Planned,
    /// Left alone on purpose
    Skipped { reason: String },
    /// Could not be processed; left in place
    Failed { message: String },
}

/// Per-file entry of an import report
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    pub source: PathBuf,
    pub kind: MediaKind,
    pub destination: Option<PathBuf>,
    pub captured_at: Option<CaptureTime>,
    pub evidence: Option<TimestampSource>,
    /// True when a counter suffix was added to avoid a clash
    pub renamed: bool,
    pub content_hash: Option<String>,
    #[serde(flatten)]
    pub status: FileStatus,
}

impl FileRecord {
    pub fn new(source: PathBuf, kind: MediaKind) -> Self {
        Self {
            source,
            kind,
            destination: None,
            captured_at: None,
            evidence: None,
            renamed: false,
            content_hash: None,
            status: FileStatus::Failed {
                message: "not processed".to_string(),
            },
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, FileStatus::Failed { .. })
    }
}

/// Outcome of a complete run
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub id: String,
    pub source_root: PathBuf,
    pub target_root: PathBuf,
    pub dry_run: bool,
    pub files: Vec<FileRecord>,
    /// Walk errors (unreadable directories)
    pub scan_errors: Vec<String>,
    pub summary: ImportSummary,
}

impl ImportReport {
    pub fn failures(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.iter().filter(|f| f.is_failure())
    }

    /// True when any file failed or part of the tree couldn't be read
    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0 || !self.scan_errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_joins_directory_and_filename() {
        let planned = PlannedMove {
            directory: PathBuf::from("/library/2021/06"),
            filename: "2021-06-15_14-30-00.jpg".to_string(),
        };
        assert_eq!(
            planned.destination(),
            PathBuf::from("/library/2021/06/2021-06-15_14-30-00.jpg")
        );
    }

    #[test]
    fn defaults_move_and_rename() {
        assert_eq!(OperationMode::default(), OperationMode::Move);
        assert_eq!(CollisionPolicy::default(), CollisionPolicy::Rename);
    }

    #[test]
    fn record_status_serializes_flat() {
        let mut record = FileRecord::new(PathBuf::from("/dump/a.jpg"), MediaKind::Image);
        record.status = FileStatus::Skipped {
            reason: "already organized".to_string(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"status\":\"skipped\""));
        assert!(json.contains("already organized"));
        assert!(!record.is_failure());
    }
}
