//! # Classifier Module
//!
//! Maps a file extension to a coarse media kind.
//!
//! The lookup goes through a [`TypeRegistry`]: an immutable table of
//! extension overrides checked before the `mime_guess` database. The
//! overrides cover camera RAW formats and the HEIF family, which the
//! default table either misses or files under `application/*`.

use crate::error::ConfigError;
use mime_guess::mime::{self, Mime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Coarse classification of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Unknown,
}

impl MediaKind {
    /// Derive the kind from a MIME type's top-level category
    pub fn from_mime(mime: &Mime) -> Self {
        if mime.type_() == mime::IMAGE {
            MediaKind::Image
        } else if mime.type_() == mime::VIDEO {
            MediaKind::Video
        } else {
            MediaKind::Unknown
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Vendor formats missing from (or misfiled in) the default table.
const BUILTIN_OVERRIDES: &[(&str, &str)] = &[
    // Canon
    ("crw", "image/x-canon-crw"),
    ("cr2", "image/x-canon-cr2"),
    ("cr3", "image/x-canon-cr3"),
    // Nikon
    ("nef", "image/x-nikon-nef"),
    ("nrw", "image/x-nikon-nrw"),
    // Sony
    ("arw", "image/x-sony-arw"),
    ("srf", "image/x-sony-srf"),
    ("sr2", "image/x-sony-sr2"),
    // Olympus / OM System
    ("orf", "image/x-olympus-orf"),
    // Panasonic / Leica
    ("rw2", "image/x-panasonic-rw2"),
    ("rwl", "image/x-leica-rwl"),
    // Fujifilm
    ("raf", "image/x-fuji-raf"),
    // Pentax
    ("pef", "image/x-pentax-pef"),
    // Samsung
    ("srw", "image/x-samsung-srw"),
    // Sigma
    ("x3f", "image/x-sigma-x3f"),
    // Hasselblad, Minolta, Kodak, Epson, Mamiya, Leaf, Phase One
    ("3fr", "image/x-hasselblad-3fr"),
    ("mrw", "image/x-minolta-mrw"),
    ("kdc", "image/x-kodak-kdc"),
    ("dcr", "image/x-kodak-dcr"),
    ("erf", "image/x-epson-erf"),
    ("mef", "image/x-mamiya-mef"),
    ("mos", "image/x-leaf-mos"),
    ("iiq", "image/x-phaseone-iiq"),
    // Adobe
    ("dng", "image/x-adobe-dng"),
    // HEIF family
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    ("hevc", "video/hevc"),
    // AVCHD camcorder streams
    ("mts", "video/mp2t"),
    ("m2ts", "video/mp2t"),
];

/// Immutable extension → MIME lookup table
///
/// Built once at startup and shared by reference; nothing mutates it
/// during a run.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    overrides: HashMap<String, Mime>,
}

impl TypeRegistry {
    /// Registry with the builtin vendor overrides
    pub fn new() -> Self {
        let overrides = BUILTIN_OVERRIDES
            .iter()
            .filter_map(|(ext, mime)| mime.parse::<Mime>().ok().map(|m| (ext.to_string(), m)))
            .collect();
        Self { overrides }
    }

    /// Layer additional overrides on top of the builtin ones
    pub fn with_overrides(mut self, extra: &HashMap<String, String>) -> Result<Self, ConfigError> {
        for (ext, mime) in extra {
            let extension = ext.trim_start_matches('.').to_lowercase();
            let parsed = mime.parse::<Mime>().map_err(|_| ConfigError::InvalidMime {
                extension: extension.clone(),
                mime: mime.clone(),
            })?;
            self.overrides.insert(extension, parsed);
        }
        Ok(self)
    }

    /// Look up the MIME type for an extension (without the dot)
    pub fn mime_for_extension(&self, extension: &str) -> Option<Mime> {
        let extension = extension.to_lowercase();
        if let Some(mime) = self.overrides.get(&extension) {
            return Some(mime.clone());
        }
        mime_guess::from_ext(&extension).first()
    }

    /// Classify a path by its extension
    ///
    /// Never fails: an unrecognized or missing extension yields
    /// [`MediaKind::Unknown`] and a warning.
    pub fn classify(&self, path: &Path) -> MediaKind {
        let mime = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.mime_for_extension(ext));

        match mime {
            Some(mime) => MediaKind::from_mime(&mime),
            None => {
                tracing::warn!(path = %path.display(), "can't guess type of file");
                MediaKind::Unknown
            }
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_common_images() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.classify(Path::new("a.jpg")), MediaKind::Image);
        assert_eq!(registry.classify(Path::new("a.JPEG")), MediaKind::Image);
        assert_eq!(registry.classify(Path::new("a.png")), MediaKind::Image);
    }

    #[test]
    fn classifies_common_videos() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.classify(Path::new("clip.mp4")), MediaKind::Video);
        assert_eq!(registry.classify(Path::new("clip.MOV")), MediaKind::Video);
    }

    #[test]
    fn raw_formats_are_images() {
        let registry = TypeRegistry::new();
        for name in ["a.cr2", "a.CR3", "a.nef", "a.arw", "a.raf", "a.orf", "a.rw2", "a.dng"] {
            assert_eq!(registry.classify(Path::new(name)), MediaKind::Image, "{}", name);
        }
    }

    #[test]
    fn heif_family() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.classify(Path::new("IMG_0001.HEIC")), MediaKind::Image);
        assert_eq!(registry.classify(Path::new("a.heif")), MediaKind::Image);
        assert_eq!(registry.classify(Path::new("a.hevc")), MediaKind::Video);
    }

    #[test]
    fn avchd_streams_are_videos() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.classify(Path::new("00001.MTS")), MediaKind::Video);
        assert_eq!(registry.classify(Path::new("00001.m2ts")), MediaKind::Video);
    }

    #[test]
    fn unknown_extension_does_not_fail() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.classify(Path::new("data.xyz")), MediaKind::Unknown);
        assert_eq!(registry.classify(Path::new("no_extension")), MediaKind::Unknown);
    }

    #[test]
    fn non_media_mime_is_unknown() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.classify(Path::new("notes.txt")), MediaKind::Unknown);
    }

    #[test]
    fn extra_overrides_win() {
        let mut extra = HashMap::new();
        extra.insert(".XYZ".to_string(), "video/x-custom".to_string());
        let registry = TypeRegistry::new().with_overrides(&extra).unwrap();
        assert_eq!(registry.classify(Path::new("data.xyz")), MediaKind::Video);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let mut extra = HashMap::new();
        extra.insert("xyz".to_string(), "not a mime".to_string());
        let result = TypeRegistry::new().with_overrides(&extra);
        assert!(matches!(result, Err(ConfigError::InvalidMime { .. })));
    }
}
