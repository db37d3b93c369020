//! # Media Module
//!
//! One file under consideration during an import.
//!
//! The expensive facts about a file (tags, capture time, content hash)
//! are held in explicit `Option` fields. Each is filled the first time
//! its accessor runs and returned from the field afterwards, so a run
//! never invokes the tag reader or re-reads the file twice. Tests can
//! inject tags up front with [`MediaFile::with_tags`].

use crate::core::classifier::{MediaKind, TypeRegistry};
use crate::core::metadata::{lookup_tags, TagMap, TagReader};
use crate::core::resolver::{ResolvedTimestamp, TimestampResolver};
use crate::error::{MetadataError, PhotoOrgError};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// A discovered media file
#[derive(Debug, Clone)]
pub struct MediaFile {
    path: PathBuf,
    extension: String,
    kind: MediaKind,
    tags: Option<TagMap>,
    captured_at: Option<ResolvedTimestamp>,
    content_hash: Option<String>,
}

impl MediaFile {
    /// Build a file entry and classify it
    pub fn new(path: impl Into<PathBuf>, registry: &TypeRegistry) -> Self {
        let path = path.into();
        let kind = registry.classify(&path);
        Self::with_kind(path, kind)
    }

    /// Build a file entry with a known kind
    pub fn with_kind(path: impl Into<PathBuf>, kind: MediaKind) -> Self {
        let path = path.into();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        Self {
            path,
            extension,
            kind,
            tags: None,
            captured_at: None,
            content_hash: None,
        }
    }

    /// Preset the tag map instead of reading it
    pub fn with_tags(mut self, tags: TagMap) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lower-cased extension without the dot; empty if the file has none
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Tags, read through `reader` on first access
    pub fn tags(&mut self, reader: &dyn TagReader) -> Result<&TagMap, MetadataError> {
        let tags = match self.tags.take() {
            Some(tags) => tags,
            None => lookup_tags(reader, &self.path, self.kind)?,
        };
        Ok(self.tags.insert(tags))
    }

    /// Capture time, resolved on first access
    pub fn captured_at(
        &mut self,
        reader: &dyn TagReader,
        resolver: &TimestampResolver,
    ) -> Result<&ResolvedTimestamp, PhotoOrgError> {
        let resolved = match self.captured_at.take() {
            Some(resolved) => resolved,
            None => {
                let tags = self.tags(reader)?.clone();
                resolver.resolve(&self.path, &tags)?
            }
        };
        Ok(self.captured_at.insert(resolved))
    }

    /// The capture time if it has already been resolved
    pub fn resolved(&self) -> Option<&ResolvedTimestamp> {
        self.captured_at.as_ref()
    }

    /// SHA-256 of the file contents as lowercase hex, computed on first access
    pub fn content_hash(&mut self) -> io::Result<&str> {
        let hash = match self.content_hash.take() {
            Some(hash) => hash,
            None => hash_file(&self.path)?,
        };
        Ok(self.content_hash.insert(hash).as_str())
    }
}

/// Stream a file through SHA-256
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}
