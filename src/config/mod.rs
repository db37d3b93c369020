//! # Config Module
//!
//! Settings for an import run, layered lowest to highest:
//! 1. Built-in defaults
//! 2. TOML file (`--config`, else `<config dir>/photo-org/config.toml`)
//! 3. Command-line flags
//!
//! ```toml
//! source_path = "/media/card/DCIM"
//! target_path = "/home/me/Pictures/library"
//! tag_program = "exiftool"
//! metadata_backend = "external"   # or "builtin"
//! collision = "rename"            # or "skip"
//! operation = "move"              # or "copy"
//! include_hidden = false
//! follow_symlinks = false
//! max_depth = 4
//! extra_date_tags = ["Track Create Date"]
//!
//! [type_overrides]
//! insv = "video/mp4"
//! ```

use crate::core::classifier::TypeRegistry;
use crate::core::metadata::{BuiltinExifReader, ExternalTagReader, TagReader};
use crate::core::organize::{CollisionPolicy, ImportConfig, Importer, OperationMode};
use crate::core::resolver::TimestampResolver;
use crate::core::scanner::ScanConfig;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Program used by the external backend when nothing else is configured
pub const DEFAULT_TAG_PROGRAM: &str = "exiftool";

/// Where tags come from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MetadataBackend {
    /// Run exiftool (or `tag_program`) per file
    #[default]
    External,
    /// Parse EXIF in-process; no video container tags
    Builtin,
}

/// Contents of the TOML file; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub source_path: Option<PathBuf>,
    pub target_path: Option<PathBuf>,
    pub tag_program: Option<String>,
    pub metadata_backend: Option<MetadataBackend>,
    pub collision: Option<CollisionPolicy>,
    pub operation: Option<OperationMode>,
    pub include_hidden: Option<bool>,
    pub follow_symlinks: Option<bool>,
    /// Deepest directory level walked; the source root is level 0
    pub max_depth: Option<usize>,
    /// Tried after the built-in date tags, in order
    pub extra_date_tags: Vec<String>,
    /// Extension (no dot) to MIME type
    pub type_overrides: HashMap<String, String>,
}

impl FileConfig {
    /// Parse a config file
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load the explicit file, or the default one if it exists
    ///
    /// An explicit path that can't be read is an error; a missing
    /// default file just means "no file settings".
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading config file");
                Self::from_path(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

/// `<config dir>/photo-org/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("photo-org").join("config.toml"))
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source_path: Option<PathBuf>,
    pub target_path: Option<PathBuf>,
    pub tag_program: Option<String>,
    pub metadata_backend: Option<MetadataBackend>,
    pub collision: Option<CollisionPolicy>,
    pub operation: Option<OperationMode>,
    pub include_hidden: Option<bool>,
    pub follow_symlinks: Option<bool>,
    pub max_depth: Option<usize>,
    pub dry_run: bool,
    pub compute_hash: bool,
}

/// Fully resolved settings
#[derive(Debug, Clone)]
pub struct Config {
    pub source_path: PathBuf,
    pub target_path: PathBuf,
    pub tag_program: String,
    pub metadata_backend: MetadataBackend,
    pub collision: CollisionPolicy,
    pub operation: OperationMode,
    pub include_hidden: bool,
    pub follow_symlinks: bool,
    pub max_depth: Option<usize>,
    pub dry_run: bool,
    pub compute_hash: bool,
    pub extra_date_tags: Vec<String>,
    pub type_overrides: HashMap<String, String>,
}

impl Config {
    /// Layer `overrides` over `file` over the defaults
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self, ConfigError> {
        let source_path = overrides
            .source_path
            .or(file.source_path)
            .ok_or(ConfigError::MissingOption("source_path"))?;
        let target_path = overrides
            .target_path
            .or(file.target_path)
            .ok_or(ConfigError::MissingOption("target_path"))?;

        Ok(Self {
            source_path,
            target_path,
            tag_program: overrides
                .tag_program
                .or(file.tag_program)
                .unwrap_or_else(|| DEFAULT_TAG_PROGRAM.to_string()),
            metadata_backend: overrides
                .metadata_backend
                .or(file.metadata_backend)
                .unwrap_or_default(),
            collision: overrides.collision.or(file.collision).unwrap_or_default(),
            operation: overrides.operation.or(file.operation).unwrap_or_default(),
            include_hidden: overrides
                .include_hidden
                .or(file.include_hidden)
                .unwrap_or(false),
            follow_symlinks: overrides
                .follow_symlinks
                .or(file.follow_symlinks)
                .unwrap_or(false),
            max_depth: overrides.max_depth.or(file.max_depth),
            dry_run: overrides.dry_run,
            compute_hash: overrides.compute_hash,
            extra_date_tags: file.extra_date_tags,
            type_overrides: file.type_overrides,
        })
    }

    /// Load the file layer and apply `overrides`
    pub fn load(explicit: Option<&Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        Self::resolve(FileConfig::load(explicit)?, overrides)
    }

    pub fn import_config(&self) -> ImportConfig {
        ImportConfig {
            source: self.source_path.clone(),
            target: self.target_path.clone(),
            scan: ScanConfig {
                follow_symlinks: self.follow_symlinks,
                include_hidden: self.include_hidden,
                max_depth: self.max_depth,
            },
            collision: self.collision,
            operation: self.operation,
            dry_run: self.dry_run,
            compute_hash: self.compute_hash,
        }
    }

    pub fn registry(&self) -> Result<TypeRegistry, ConfigError> {
        TypeRegistry::new().with_overrides(&self.type_overrides)
    }

    pub fn resolver(&self) -> TimestampResolver {
        TimestampResolver::new().with_extra_tags(&self.extra_date_tags)
    }

    /// The external reader, when that backend is selected
    pub fn external_reader(&self) -> Option<ExternalTagReader> {
        match self.metadata_backend {
            MetadataBackend::External => Some(ExternalTagReader::new(self.tag_program.clone())),
            MetadataBackend::Builtin => None,
        }
    }

    pub fn tag_reader(&self) -> Box<dyn TagReader> {
        match self.external_reader() {
            Some(reader) => Box::new(reader),
            None => Box::new(BuiltinExifReader::new()),
        }
    }

    /// Assemble an importer from these settings
    pub fn build_importer(&self) -> Result<Importer, ConfigError> {
        Ok(Importer::builder(self.import_config())
            .registry(self.registry()?)
            .reader(self.tag_reader())
            .resolver(self.resolver())
            .build())
    }
}
