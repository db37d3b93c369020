//! # photo-org
//!
//! Files a flat dump of photos and videos into a dated library.
//!
//! Each file's capture moment is taken from its metadata tags, else from
//! a `YYYY-MM-DD HH.MM.SS` filename, else from the filesystem, and the
//! file is moved to `<target>/<YYYY>/<MM>/<YYYY-MM-DD_HH-MM-SS>.<ext>`.
//!
//! ## Architecture
//! - `core` - The organizing engine
//! - `config` - Layered settings (defaults, TOML file, flags)
//! - `events` - Event-driven progress reporting
//! - `error` - Error types
//! - `cli` - Command-line interface

pub mod config;
pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{PhotoOrgError, Result};

/// Initialize tracing for the library
///
/// Uses `RUST_LOG` when set, else `default_level` (for example `"info"`).
/// Call once from the application entry point.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
