//! # Error Module
//!
//! Error types for the media organizer.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, programs, what went wrong
//! - **Separate environment failures** - a missing tag tool is not a bad file

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum PhotoOrgError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Timestamp error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Organize error: {0}")]
    Organize(#[from] OrganizeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors that occur while enumerating the source tree
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Path the error refers to
    pub fn path(&self) -> &std::path::Path {
        match self {
            ScanError::DirectoryNotFound { path }
            | ScanError::PermissionDenied { path }
            | ScanError::ReadDirectory { path, .. } => path,
        }
    }
}

/// Errors from tag extraction
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Tag reader `{program}` is not installed or not on PATH")]
    ToolNotInstalled { program: String },

    #[error("Failed to run tag reader on {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Tag reader exited with {status} on {path}: {stderr}")]
    ProcessFailed {
        path: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("Tag reader produced unreadable output for {path}")]
    UnreadableOutput { path: PathBuf },

    #[error("Failed to read EXIF from {path}: {reason}")]
    Exif { path: PathBuf, reason: String },
}

impl MetadataError {
    /// True when every following file would fail the same way.
    pub fn is_environment_failure(&self) -> bool {
        matches!(self, MetadataError::ToolNotInstalled { .. })
    }
}

/// Errors from timestamp resolution
///
/// Only the filesystem fallback can fail, and only when the file
/// can no longer be stat'ed.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Failed to stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors while planning or performing a move
#[derive(Error, Debug)]
pub enum OrganizeError {
    #[error("Failed to create {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Destination already exists: {destination}")]
    Collision { destination: PathBuf },

    #[error("Source file not found: {path}")]
    SourceMissing { path: PathBuf },

    #[error("Failed to move {source_path} to {destination}: {source}")]
    Move {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Copy verification failed for {destination}: source {expected} bytes, dest {actual} bytes")]
    CopyVerification {
        destination: PathBuf,
        expected: u64,
        actual: u64,
    },
}

/// Errors while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Missing required option `{0}` (set it in the config file or on the command line)")]
    MissingOption(&'static str),

    #[error("Invalid MIME type `{mime}` for extension `{extension}`")]
    InvalidMime { extension: String, mime: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, PhotoOrgError>;
