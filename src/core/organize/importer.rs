//! The import driver: walk, resolve, plan, place.

use super::executor::{place_file, DirectoryMaker};
use super::planner::{plan, DestinationClaims};
use super::types::*;
use crate::core::classifier::TypeRegistry;
use crate::core::media::MediaFile;
use crate::core::metadata::{ExternalTagReader, TagReader};
use crate::core::resolver::TimestampResolver;
use crate::core::scanner::{ScanConfig, SourceWalker};
use crate::error::PhotoOrgError;
use crate::events::{null_sender, Event, EventSender, ImportEvent, ImportSummary, ScanEvent};
use std::path::PathBuf;
use std::time::Instant;
use uuid::Uuid;

/// Configuration for an import run
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Root to scan
    pub source: PathBuf,
    /// Root of the dated library
    pub target: PathBuf,
    pub scan: ScanConfig,
    pub collision: CollisionPolicy,
    pub operation: OperationMode,
    /// Resolve and plan only; touch nothing
    pub dry_run: bool,
    /// Record a SHA-256 of every file in the report
    pub compute_hash: bool,
}

impl ImportConfig {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            scan: ScanConfig::default(),
            collision: CollisionPolicy::default(),
            operation: OperationMode::default(),
            dry_run: false,
            compute_hash: false,
        }
    }
}

/// Builder for [`Importer`]
pub struct ImporterBuilder {
    config: ImportConfig,
    registry: TypeRegistry,
    reader: Option<Box<dyn TagReader>>,
    resolver: TimestampResolver,
}

impl ImporterBuilder {
    pub fn new(config: ImportConfig) -> Self {
        Self {
            config,
            registry: TypeRegistry::new(),
            reader: None,
            resolver: TimestampResolver::new(),
        }
    }

    pub fn registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Set the tag reader (defaults to exiftool)
    pub fn reader(mut self, reader: Box<dyn TagReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn resolver(mut self, resolver: TimestampResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn build(self) -> Importer {
        Importer {
            config: self.config,
            registry: self.registry,
            reader: self
                .reader
                .unwrap_or_else(|| Box::new(ExternalTagReader::default())),
            resolver: self.resolver,
        }
    }
}

/// Moves a source tree into a dated library
pub struct Importer {
    config: ImportConfig,
    registry: TypeRegistry,
    reader: Box<dyn TagReader>,
    resolver: TimestampResolver,
}

/// Per-run mutable state
struct RunState {
    claims: DestinationClaims,
    dirs: DirectoryMaker,
}

impl Importer {
    pub fn builder(config: ImportConfig) -> ImporterBuilder {
        ImporterBuilder::new(config)
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Run the import without events
    pub fn run(&self) -> Result<ImportReport, PhotoOrgError> {
        self.run_with_events(&null_sender())
    }

    /// Run the import, reporting progress through `events`
    ///
    /// Per-file problems are recorded in the report and the run goes on;
    /// the file stays where it was. Only an unreadable source root or a
    /// missing tag tool end the run early with an error.
    pub fn run_with_events(&self, events: &EventSender) -> Result<ImportReport, PhotoOrgError> {
        let start = Instant::now();
        let source = &self.config.source;

        events.send(Event::Scan(ScanEvent::Started {
            root: source.clone(),
        }));
        let scanned = SourceWalker::new(self.config.scan.clone()).scan(source)?;
        for error in &scanned.errors {
            events.send(Event::Scan(ScanEvent::Error {
                path: error.path().to_path_buf(),
                message: error.to_string(),
            }));
        }
        let total = scanned.files.len();
        events.send(Event::Scan(ScanEvent::Completed { total_files: total }));
        tracing::info!(source = %source.display(), files = total, "starting import");

        let mut state = RunState {
            claims: DestinationClaims::new(self.config.collision),
            dirs: DirectoryMaker::new(),
        };
        let mut summary = ImportSummary {
            total_files: total,
            ..Default::default()
        };
        let mut records = Vec::with_capacity(total);

        for (index, path) in scanned.files.into_iter().enumerate() {
            let mut file = MediaFile::new(path, &self.registry);
            events.send(Event::Import(ImportEvent::FileStarted {
                index,
                total,
                path: file.path().to_path_buf(),
                kind: file.kind(),
            }));

            let mut record = FileRecord::new(file.path().to_path_buf(), file.kind());
            match self.import_file(&mut file, &mut record, &mut state) {
                Ok(()) => {}
                Err(PhotoOrgError::Metadata(e)) if e.is_environment_failure() => {
                    tracing::error!(error = %e, "aborting import");
                    events.send(Event::Import(ImportEvent::Aborted {
                        message: e.to_string(),
                    }));
                    return Err(PhotoOrgError::Metadata(e));
                }
                Err(e) => {
                    tracing::error!(path = %file.path().display(), error = %e, "leaving file in place");
                    record.status = FileStatus::Failed {
                        message: e.to_string(),
                    };
                }
            }

            tally(&mut summary, &record);
            events.send(Event::Import(record_event(&record)));
            records.push(record);
        }

        summary.folders_created = state.dirs.created();
        summary.duration_ms = start.elapsed().as_millis() as u64;
        events.send(Event::Import(ImportEvent::Completed {
            summary: summary.clone(),
        }));
        tracing::info!(
            placed = summary.placed,
            skipped = summary.skipped,
            failed = summary.failed,
            "import finished"
        );

        Ok(ImportReport {
            id: Uuid::new_v4().to_string(),
            source_root: self.config.source.clone(),
            target_root: self.config.target.clone(),
            dry_run: self.config.dry_run,
            files: records,
            scan_errors: scanned.errors.iter().map(|e| e.to_string()).collect(),
            summary,
        })
    }

    fn import_file(
        &self,
        file: &mut MediaFile,
        record: &mut FileRecord,
        state: &mut RunState,
    ) -> Result<(), PhotoOrgError> {
        let resolved = file
            .captured_at(self.reader.as_ref(), &self.resolver)?
            .clone();
        record.captured_at = Some(resolved.time);
        record.evidence = Some(resolved.source.clone());

        if self.config.compute_hash {
            match file.content_hash() {
                Ok(hash) => record.content_hash = Some(hash.to_string()),
                Err(e) => tracing::warn!(path = %file.path().display(), error = %e, "could not hash file"),
            }
        }

        let planned = plan(&self.config.target, &resolved.time, file.extension());
        let claim = state.claims.claim(planned.destination(), file.path())?;
        record.destination = Some(claim.path.clone());

        if claim.is_in_place(file.path()) {
            tracing::debug!(path = %file.path().display(), "already organized");
            record.status = FileStatus::Skipped {
                reason: "already organized".to_string(),
            };
            return Ok(());
        }
        record.renamed = claim.renamed;

        if self.config.dry_run {
            tracing::info!(
                source = %file.path().display(),
                destination = %claim.path.display(),
                evidence = %resolved.source,
                "would place"
            );
            record.status = FileStatus::Planned;
            return Ok(());
        }

        let placed = state
            .dirs
            .ensure(&planned.directory)
            .and_then(|()| place_file(file.path(), &claim.path, self.config.operation));
        if let Err(e) = placed {
            state.claims.release(&claim.path);
            return Err(e.into());
        }
        tracing::info!(
            source = %file.path().display(),
            destination = %claim.path.display(),
            evidence = %resolved.source,
            "placed"
        );
        record.status = FileStatus::Placed;
        Ok(())
    }
}

fn tally(summary: &mut ImportSummary, record: &FileRecord) {
    match record.status {
        FileStatus::Placed | FileStatus::Planned => {
            summary.placed += 1;
            if record.renamed {
                summary.renamed_on_collision += 1;
            }
        }
        FileStatus::Skipped { .. } => summary.skipped += 1,
        FileStatus::Failed { .. } => summary.failed += 1,
    }
}

fn record_event(record: &FileRecord) -> ImportEvent {
    match (&record.status, &record.destination) {
        (FileStatus::Placed | FileStatus::Planned, Some(destination)) => ImportEvent::FilePlaced {
            source: record.source.clone(),
            destination: destination.clone(),
            evidence: record
                .evidence
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_default(),
        },
        (FileStatus::Skipped { reason }, _) => ImportEvent::FileSkipped {
            path: record.source.clone(),
            reason: reason.clone(),
        },
        (FileStatus::Failed { message }, _) => ImportEvent::FileFailed {
            path: record.source.clone(),
            message: message.clone(),
        },
        (_, None) => ImportEvent::FileFailed {
            path: record.source.clone(),
            message: "no destination".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::StaticTagReader;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_file(path: &Path, content: &[u8]) {
        fs::File::create(path).unwrap().write_all(content).unwrap();
    }

    #[test]
    fn empty_source_produces_empty_report() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("dump");
        fs::create_dir(&source).unwrap();

        let importer = Importer::builder(ImportConfig::new(&source, temp.path().join("lib")))
            .reader(Box::new(StaticTagReader::new()))
            .build();
        let report = importer.run().unwrap();

        assert_eq!(report.summary.total_files, 0);
        assert!(!report.has_failures());
    }

    #[test]
    fn missing_source_is_an_error() {
        let importer = Importer::builder(ImportConfig::new("/nonexistent/dump", "/nonexistent/lib"))
            .reader(Box::new(StaticTagReader::new()))
            .build();
        assert!(matches!(importer.run(), Err(PhotoOrgError::Scan(_))));
    }

    #[test]
    fn missing_tag_tool_aborts_before_moving() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("dump");
        fs::create_dir(&source).unwrap();
        let photo = source.join("IMG_0001.JPG");
        write_file(&photo, b"jpeg");

        let importer = Importer::builder(ImportConfig::new(&source, temp.path().join("lib")))
            .reader(Box::new(ExternalTagReader::new("photo-org-no-such-tag-tool")))
            .build();

        let err = importer.run().unwrap_err();
        assert!(matches!(err, PhotoOrgError::Metadata(ref e) if e.is_environment_failure()));
        assert!(photo.exists());
    }

    #[cfg(unix)]
    #[test]
    fn failing_tag_tool_skips_the_file() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("dump");
        fs::create_dir(&source).unwrap();
        let photo = source.join("IMG_0001.JPG");
        write_file(&photo, b"jpeg");

        let importer = Importer::builder(ImportConfig::new(&source, temp.path().join("lib")))
            .reader(Box::new(ExternalTagReader::new("false")))
            .build();

        let report = importer.run().unwrap();
        assert_eq!(report.summary.failed, 1);
        assert!(report.has_failures());
        assert!(photo.exists());
    }

    #[test]
    fn events_are_emitted() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("dump");
        fs::create_dir(&source).unwrap();
        write_file(&source.join("2019-12-31 23.59.58.mov"), b"mov");

        let importer = Importer::builder(ImportConfig::new(&source, temp.path().join("lib")))
            .reader(Box::new(StaticTagReader::new()))
            .build();

        let (sender, receiver) = crate::events::EventChannel::new();
        importer.run_with_events(&sender).unwrap();
        drop(sender);

        let events = receiver.drain();
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::Import(ImportEvent::FilePlaced { .. }))));
        assert!(matches!(
            events.last(),
            Some(Event::Import(ImportEvent::Completed { .. }))
        ));
    }
}
