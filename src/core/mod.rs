//! # Core Module
//!
//! The organizing engine, independent of any front end.
//!
//! ## Modules
//! - `scanner` - Lists candidate files under a source root
//! - `classifier` - Guesses image/video from the extension
//! - `metadata` - Reads date tags (exiftool or in-process EXIF)
//! - `resolver` - Picks the capture time from tags, filename or stat
//! - `media` - One file and its lazily computed facts
//! - `organize` - Plans destinations and moves files

pub mod classifier;
pub mod media;
pub mod metadata;
pub mod organize;
pub mod resolver;
pub mod scanner;

// Re-export commonly used types
pub use classifier::{MediaKind, TypeRegistry};
pub use media::MediaFile;
pub use metadata::{TagMap, TagReader};
pub use organize::{ImportConfig, ImportReport, Importer};
pub use resolver::{CaptureTime, ResolvedTimestamp, TimestampResolver, TimestampSource};
