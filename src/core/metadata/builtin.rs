//! In-process EXIF reader using kamadak-exif.
//!
//! Covers JPEG, TIFF (and TIFF-based RAW), HEIF, PNG and WebP. Files
//! without an EXIF block, including most videos, produce an empty map
//! so resolution falls through to the filename and filesystem.

use super::{TagMap, TagReader};
use crate::error::MetadataError;
use exif::{Exif, Field, In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Reads EXIF directly from the file bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinExifReader;

impl BuiltinExifReader {
    pub fn new() -> Self {
        Self
    }
}

impl TagReader for BuiltinExifReader {
    fn read_tags(&self, path: &Path) -> Result<TagMap, MetadataError> {
        let file = File::open(path).map_err(|e| MetadataError::Exif {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut bufreader = BufReader::new(&file);
        let exif = match Reader::new().read_from_container(&mut bufreader) {
            Ok(exif) => exif,
            Err(exif::Error::NotFound(_))
            | Err(exif::Error::InvalidFormat(_))
            | Err(exif::Error::NotSupported(_)) => {
                tracing::debug!(path = %path.display(), "no EXIF block");
                return Ok(TagMap::new());
            }
            Err(e) => {
                return Err(MetadataError::Exif {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        };

        Ok(collect_tags(&exif))
    }
}

fn collect_tags(exif: &Exif) -> TagMap {
    let mut tags = TagMap::new();

    for field in exif.fields().filter(|f| f.ifd_num == In::PRIMARY) {
        let value = match get_string_value(&field.value) {
            Some(s) => s,
            None => field.display_value().with_unit(exif).to_string(),
        };
        tags.insert(label_for(field.tag), value);
    }

    // Fold the separate offset tags into the date values so the
    // resolver sees an offset-aware timestamp.
    for (date_tag, offset_tag) in [
        (Tag::DateTimeOriginal, Tag::OffsetTimeOriginal),
        (Tag::DateTimeDigitized, Tag::OffsetTimeDigitized),
        (Tag::DateTime, Tag::OffsetTime),
    ] {
        if let (Some(date), Some(offset)) = (
            exif.get_field(date_tag, In::PRIMARY).and_then(ascii),
            exif.get_field(offset_tag, In::PRIMARY).and_then(ascii),
        ) {
            tags.insert(label_for(date_tag), format!("{}{}", date, offset));
        }
    }

    tags
}

/// Labels matching exiftool's naming for the date tags
fn label_for(tag: Tag) -> String {
    match tag {
        Tag::DateTimeOriginal => "Date/Time Original".to_string(),
        Tag::DateTimeDigitized => "Create Date".to_string(),
        Tag::DateTime => "Modify Date".to_string(),
        other => other.to_string(),
    }
}

fn ascii(field: &Field) -> Option<String> {
    get_string_value(&field.value)
}

/// Helper to extract string from EXIF ASCII value
fn get_string_value(value: &Value) -> Option<String> {
    if let Value::Ascii(ref vec) = value {
        if let Some(bytes) = vec.first() {
            if let Ok(s) = std::str::from_utf8(bytes) {
                let trimmed = s.trim_end_matches('\0').trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}
