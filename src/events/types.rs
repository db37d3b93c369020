//! Event type definitions for progress reporting.

use crate::core::classifier::MediaKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by an import run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Source walk events
    Scan(ScanEvent),
    /// Per-file import events
    Import(ImportEvent),
}

/// Events during the source walk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Walking has started
    Started { root: PathBuf },
    /// An entry could not be read but walking continues
    Error { path: PathBuf, message: String },
    /// Walking completed
    Completed { total_files: usize },
}

/// Events while files are resolved and moved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ImportEvent {
    /// Processing of a file has begun
    FileStarted {
        index: usize,
        total: usize,
        path: PathBuf,
        kind: MediaKind,
    },
    /// The file was placed at its destination
    FilePlaced {
        source: PathBuf,
        destination: PathBuf,
        /// Human-readable evidence used for the timestamp
        evidence: String,
    },
    /// The file was left where it is
    FileSkipped { path: PathBuf, reason: String },
    /// The file could not be processed and was left in place
    FileFailed { path: PathBuf, message: String },
    /// The run was aborted before finishing
    Aborted { message: String },
    /// All files have been handled
    Completed { summary: ImportSummary },
}

/// Counts for a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Files found by the walk
    pub total_files: usize,
    /// Files moved or copied into the library (or planned, in a dry run)
    pub placed: usize,
    /// Files that needed a counter suffix to avoid a clash
    pub renamed_on_collision: usize,
    /// Files already at their destination
    pub skipped: usize,
    /// Files that failed, including collisions under the skip policy
    pub failed: usize,
    /// Library directories created during the run
    pub folders_created: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Import(ImportEvent::FilePlaced {
            source: PathBuf::from("/dump/IMG_0001.JPG"),
            destination: PathBuf::from("/library/2021/06/2021-06-15_14-30-00.jpg"),
            evidence: "tag `Create Date`".to_string(),
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Import(ImportEvent::FilePlaced { destination, .. }) => {
                assert!(destination.ends_with("2021-06-15_14-30-00.jpg"));
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn summary_is_serializable() {
        let summary = ImportSummary {
            total_files: 1000,
            placed: 990,
            renamed_on_collision: 3,
            skipped: 4,
            failed: 6,
            folders_created: 12,
            duration_ms: 5000,
        };

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"failed\":6"));
    }
}
