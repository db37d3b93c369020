//! # photo-org CLI
//!
//! Files photos and videos into a dated library.
//!
//! ## Usage
//! ```bash
//! photo-org import /media/card/DCIM ~/Pictures/library
//! photo-org import --dry-run --output json
//! ```

mod cli;

use photo_org::Result;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    cli::run()
}
