//! Concurrent key-value storage with per-entry expiry.

mod entry;
mod timed;

pub use entry::TimedEntry;
pub use timed::TimedStore;
