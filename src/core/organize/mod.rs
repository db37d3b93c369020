//! # Organize Module
//!
//! Moves a flat dump of photos and videos into a dated library:
//!
//! ```text
//! <target>/<YYYY>/<MM>/<YYYY-MM-DD_HH-MM-SS>.<ext>
//! ```
//!
//! `planner` decides where a file goes and resolves clashes, `executor`
//! touches the filesystem, and `importer` drives a whole run.

mod executor;
mod importer;
mod planner;
mod types;

pub use executor::{place_file, DirectoryMaker};
pub use importer::{ImportConfig, Importer, ImporterBuilder};
pub use planner::{plan, Claim, DestinationClaims};
pub use types::*;
