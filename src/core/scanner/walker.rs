//! Directory walking implementation using walkdir.

use super::{filter::SourceFilter, ScanResult};
use crate::error::ScanError;
use std::path::Path;
use walkdir::WalkDir;

/// Configuration for the source walk
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
}

/// Lists every regular file under a source root
pub struct SourceWalker {
    config: ScanConfig,
    filter: SourceFilter,
}

impl SourceWalker {
    pub fn new(config: ScanConfig) -> Self {
        let filter = SourceFilter::new().with_hidden(config.include_hidden);
        Self { config, filter }
    }

    /// Walk `root` and collect candidate files
    ///
    /// The whole listing is taken before anything is moved, so files
    /// placed under the root during the run are never revisited.
    /// Unreadable entries are recorded and skipped.
    pub fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut files = Vec::new();
        let mut errors = Vec::new();

        let mut walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();
        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        // Hidden directories are pruned, not just skipped
        let entries = walker
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || self.filter.should_include(e.path()));

        for entry_result in entries {
            match entry_result {
                Ok(entry) => {
                    if entry.file_type().is_file() {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();

                    let error = if e.io_error().map(|e| e.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path }
                    } else {
                        ScanError::ReadDirectory {
                            path,
                            source: std::io::Error::other(e.to_string()),
                        }
                    };

                    tracing::warn!(error = %error, "skipping unreadable entry");
                    errors.push(error);
                }
            }
        }

        tracing::debug!(root = %root.display(), files = files.len(), "source walk complete");
        Ok(ScanResult { files, errors })
    }
}
