//! # Metadata Module
//!
//! Tag lookup for media files.
//!
//! Tags are exposed as a flat `label → value` map regardless of which
//! reader produced them. Labels follow exiftool's human-readable style
//! (`Date/Time Original`, `Create Date`), and lookups by label ignore
//! case, spacing and punctuation so `DateTimeOriginal` finds the same
//! entry.
//!
//! ## Readers
//! - `ExternalTagReader` - runs exiftool (or a compatible program) per file
//! - `BuiltinExifReader` - in-process EXIF parsing via kamadak-exif
//! - `StaticTagReader` - fixed tags, for testing

mod builtin;
mod external;

pub use builtin::BuiltinExifReader;
pub use external::{parse_tag_output, ExternalTagReader};

use crate::core::classifier::MediaKind;
use crate::error::MetadataError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Map of tag label to raw value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagMap {
    entries: BTreeMap<String, String>,
}

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag. A later insert of the same label replaces the earlier one.
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(label.into(), value.into());
    }

    /// Exact-label lookup
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries.get(label).map(String::as_str)
    }

    /// Lookup ignoring case, whitespace and punctuation in the label
    ///
    /// Returns the stored label together with its value.
    pub fn find(&self, label: &str) -> Option<(&str, &str)> {
        let wanted = normalize_label(label);
        self.entries
            .iter()
            .find(|(key, _)| normalize_label(key) == wanted)
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Merge `other` into `self`; keys from `other` win on conflict
    pub fn merge(&mut self, other: TagMap) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = TagMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Reduce a label to lowercase alphanumerics
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Trait for tag readers
///
/// Implement this trait to plug in another extraction backend (or a
/// fake one for tests).
pub trait TagReader: Send + Sync {
    /// Read the general tag set of a file
    ///
    /// A file without tags yields an empty map, not an error.
    fn read_tags(&self, path: &Path) -> Result<TagMap, MetadataError>;

    /// Read media-container (audio/video) tags
    ///
    /// Only consulted for video files. Readers that have no separate
    /// container view return an empty map.
    fn read_container_tags(&self, _path: &Path) -> Result<TagMap, MetadataError> {
        Ok(TagMap::new())
    }
}

/// Read every tag for a file of the given kind
///
/// For videos the container tags are merged over the general ones.
pub fn lookup_tags(
    reader: &dyn TagReader,
    path: &Path,
    kind: MediaKind,
) -> Result<TagMap, MetadataError> {
    let mut tags = reader.read_tags(path)?;
    if kind == MediaKind::Video {
        let container = reader.read_container_tags(path)?;
        tracing::debug!(
            path = %path.display(),
            container_tags = container.len(),
            "merging container tags"
        );
        tags.merge(container);
    }
    Ok(tags)
}

/// Reader returning preset tags
///
/// Files without an entry get an empty map.
#[derive(Debug, Clone, Default)]
pub struct StaticTagReader {
    tags: HashMap<PathBuf, TagMap>,
    container_tags: HashMap<PathBuf, TagMap>,
}

impl StaticTagReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags(mut self, path: impl Into<PathBuf>, tags: TagMap) -> Self {
        self.tags.insert(path.into(), tags);
        self
    }

    pub fn with_container_tags(mut self, path: impl Into<PathBuf>, tags: TagMap) -> Self {
        self.container_tags.insert(path.into(), tags);
        self
    }
}

impl TagReader for StaticTagReader {
    fn read_tags(&self, path: &Path) -> Result<TagMap, MetadataError> {
        Ok(self.tags.get(path).cloned().unwrap_or_default())
    }

    fn read_container_tags(&self, path: &Path) -> Result<TagMap, MetadataError> {
        Ok(self.container_tags.get(path).cloned().unwrap_or_default())
    }
}
