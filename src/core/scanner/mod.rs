//! # Scanner Module
//!
//! Enumerates candidate files under a source root.
//!
//! Every regular file is a candidate regardless of extension; files the
//! classifier can't place still get a timestamp from their name or the
//! filesystem. Hidden entries (dot-files and dot-directories) are
//! skipped unless configured otherwise.

mod filter;
mod walker;

pub use filter::SourceFilter;
pub use walker::{ScanConfig, SourceWalker};

use crate::error::ScanError;
use std::path::PathBuf;

/// Result of a scan operation
#[derive(Debug)]
pub struct ScanResult {
    /// Regular files found, in walk order
    pub files: Vec<PathBuf>,
    /// Errors that occurred during scanning (non-fatal)
    pub errors: Vec<ScanError>,
}
