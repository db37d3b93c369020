//! Filesystem side of an import: directories and the move itself.

use super::types::OperationMode;
use crate::error::OrganizeError;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Creates library directories, remembering which ones it has seen
#[derive(Debug, Default)]
pub struct DirectoryMaker {
    known: HashSet<PathBuf>,
    created: usize,
}

impl DirectoryMaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `dir` and its parents if missing
    ///
    /// An already existing directory is not an error.
    pub fn ensure(&mut self, dir: &Path) -> Result<(), OrganizeError> {
        if self.known.contains(dir) {
            return Ok(());
        }
        let existed = dir.is_dir();
        fs::create_dir_all(dir).map_err(|e| OrganizeError::CreateDirectory {
            path: dir.to_path_buf(),
            source: e,
        })?;
        if !existed {
            self.created += 1;
            tracing::debug!(path = %dir.display(), "created directory");
        }
        self.known.insert(dir.to_path_buf());
        Ok(())
    }

    /// Directories this maker actually created
    pub fn created(&self) -> usize {
        self.created
    }
}

/// Move or copy `source` to `destination`
///
/// The destination's parent must exist. A move first tries a rename and
/// falls back to copy + size check + delete when the rename fails (for
/// example across filesystems); the source is only removed once the
/// copy has the right size.
pub fn place_file(
    source: &Path,
    destination: &Path,
    operation: OperationMode,
) -> Result<(), OrganizeError> {
    if !source.exists() {
        return Err(OrganizeError::SourceMissing {
            path: source.to_path_buf(),
        });
    }

    let move_error = |e: std::io::Error| OrganizeError::Move {
        source_path: source.to_path_buf(),
        destination: destination.to_path_buf(),
        source: e,
    };

    match operation {
        OperationMode::Copy => {
            fs::copy(source, destination).map_err(move_error)?;
            Ok(())
        }
        OperationMode::Move => {
            if fs::rename(source, destination).is_ok() {
                return Ok(());
            }
            let source_size = fs::metadata(source).map_err(move_error)?.len();
            fs::copy(source, destination).map_err(move_error)?;

            let dest_size = fs::metadata(destination).map_err(move_error)?.len();
            if dest_size != source_size {
                let _ = fs::remove_file(destination);
                return Err(OrganizeError::CopyVerification {
                    destination: destination.to_path_buf(),
                    expected: source_size,
                    actual: dest_size,
                });
            }

            fs::remove_file(source).map_err(move_error)
        }
    }
}
