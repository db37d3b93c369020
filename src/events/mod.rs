//! # Events Module
//!
//! Progress reporting for import runs.
//!
//! ## Design
//! The importer emits events through a channel so a front end (the CLI
//! progress bar, or anything else) can follow along without the core
//! knowing how progress is displayed.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Import(ImportEvent::FileFailed { path, message }) = event {
//!             eprintln!("{}: {}", path.display(), message);
//!         }
//!     }
//! });
//!
//! importer.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
