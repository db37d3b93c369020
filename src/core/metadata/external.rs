//! Tag reader backed by an external program (exiftool by default).

use super::{TagMap, TagReader};
use crate::error::MetadataError;
use regex::Regex;
use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;
use std::sync::LazyLock;

static TAG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<key>[^:]*?[^:\s])\s*:\s*(?P<value>.*?)\s*$").expect("valid tag line regex")
});

/// Group restriction used for the container pass on videos.
const CONTAINER_GROUP: &str = "-QuickTime:All";

/// Runs a tag extraction program once per file
///
/// The program is invoked with the file path as its only argument and
/// must print `Key: Value` lines.
#[derive(Debug, Clone)]
pub struct ExternalTagReader {
    program: String,
}

impl ExternalTagReader {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Verify the program can be launched at all
    ///
    /// Meant to be called once before a run so a missing tool aborts
    /// immediately instead of failing every file.
    pub fn check_available(&self) -> Result<String, MetadataError> {
        let output = Command::new(&self.program)
            .arg("-ver")
            .output()
            .map_err(|e| self.spawn_error(Path::new(""), e))?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn run(&self, args: &[&OsStr], path: &Path) -> Result<TagMap, MetadataError> {
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| self.spawn_error(path, e))?;

        if !output.status.success() {
            return Err(MetadataError::ProcessFailed {
                path: path.to_path_buf(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|_| MetadataError::UnreadableOutput {
            path: path.to_path_buf(),
        })?;

        Ok(parse_tag_output(&stdout))
    }

    fn spawn_error(&self, path: &Path, error: std::io::Error) -> MetadataError {
        if error.kind() == ErrorKind::NotFound {
            MetadataError::ToolNotInstalled {
                program: self.program.clone(),
            }
        } else {
            MetadataError::Spawn {
                path: path.to_path_buf(),
                source: error,
            }
        }
    }
}

impl Default for ExternalTagReader {
    fn default() -> Self {
        Self::new("exiftool")
    }
}

impl TagReader for ExternalTagReader {
    fn read_tags(&self, path: &Path) -> Result<TagMap, MetadataError> {
        self.run(&[path.as_os_str()], path)
    }

    fn read_container_tags(&self, path: &Path) -> Result<TagMap, MetadataError> {
        self.run(&[OsStr::new(CONTAINER_GROUP), path.as_os_str()], path)
    }
}

/// Parse line-oriented `Key: Value` output
///
/// Keys and values are trimmed. A line without a key/value shape is
/// skipped on its own; it does not spoil the rest of the output.
/// When a key repeats, the last occurrence wins.
pub fn parse_tag_output(output: &str) -> TagMap {
    let mut tags = TagMap::new();
    for (number, line) in output.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match TAG_LINE.captures(line) {
            Some(caps) => tags.insert(&caps["key"], &caps["value"]),
            None => tracing::debug!(line = number + 1, content = line, "unparsable tag line"),
        }
    }
    tags
}
