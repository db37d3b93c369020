//! Destination planning: dated folder, canonical name, collision handling.

use super::types::*;
use crate::core::resolver::CaptureTime;
use crate::error::OrganizeError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Compute the destination for a capture time and extension
///
/// `<root>/<YYYY>/<MM>/<YYYY-MM-DD_HH-MM-SS>.<ext>`; the extension is
/// lower-cased and any leading dots are dropped.
pub fn plan(root: &Path, time: &CaptureTime, extension: &str) -> PlannedMove {
    PlannedMove {
        directory: root.join(build_folder_path(time)),
        filename: build_filename(time, extension),
    }
}

fn build_folder_path(time: &CaptureTime) -> PathBuf {
    PathBuf::from(time.year().to_string()).join(format!("{:02}", time.month()))
}

fn build_filename(time: &CaptureTime, extension: &str) -> String {
    let extension = extension.trim_start_matches('.').to_lowercase();
    if extension.is_empty() {
        time.file_stem()
    } else {
        format!("{}.{}", time.file_stem(), extension)
    }
}

/// A destination reserved for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub path: PathBuf,
    /// True when a counter suffix was needed
    pub renamed: bool,
}

impl Claim {
    /// True when the claimed destination is where `source` already is
    pub fn is_in_place(&self, source: &Path) -> bool {
        same_file(&self.path, source)
    }
}

/// Tracks destinations handed out during a run
///
/// A destination is taken if it exists on disk or was claimed earlier
/// in the same run (a dry run never creates the files, so the on-disk
/// check alone would miss clashes between two source files). The file
/// being placed never blocks itself, so a library file already sitting
/// at its name or one of its suffixed names claims that same path.
#[derive(Debug)]
pub struct DestinationClaims {
    policy: CollisionPolicy,
    claimed: HashSet<PathBuf>,
}

impl DestinationClaims {
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            policy,
            claimed: HashSet::new(),
        }
    }

    fn is_taken(&self, path: &Path, source: &Path) -> bool {
        if self.claimed.contains(path) {
            return true;
        }
        path.exists() && !same_file(path, source)
    }

    /// Reserve `desired` for `source`, or a suffixed variant under the
    /// rename policy
    pub fn claim(&mut self, desired: PathBuf, source: &Path) -> Result<Claim, OrganizeError> {
        if !self.is_taken(&desired, source) {
            self.claimed.insert(desired.clone());
            return Ok(Claim {
                path: desired,
                renamed: false,
            });
        }

        let path = self.next_free_path(&desired, source);
        if same_file(&path, source) {
            self.claimed.insert(path.clone());
            return Ok(Claim {
                path,
                renamed: true,
            });
        }

        if self.policy == CollisionPolicy::Skip {
            return Err(OrganizeError::Collision {
                destination: desired,
            });
        }

        tracing::info!(
            planned = %desired.display(),
            actual = %path.display(),
            "destination taken, adding suffix"
        );
        self.claimed.insert(path.clone());
        Ok(Claim {
            path,
            renamed: true,
        })
    }

    /// Give a destination back after the file could not be placed there
    pub fn release(&mut self, path: &Path) {
        self.claimed.remove(path);
    }

    fn next_free_path(&self, desired: &Path, source: &Path) -> PathBuf {
        let stem = desired
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("file");
        let ext = desired.extension().and_then(|e| e.to_str()).unwrap_or("");
        let parent = desired.parent().unwrap_or(Path::new(""));

        let mut counter = 1;
        loop {
            let new_name = if ext.is_empty() {
                format!("{}_{}", stem, counter)
            } else {
                format!("{}_{}.{}", stem, counter, ext)
            };
            let candidate = parent.join(new_name);
            if !self.is_taken(&candidate, source) {
                return candidate;
            }
            counter += 1;
        }
    }
}

/// True when both paths name the same existing file (or are equal)
pub fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
