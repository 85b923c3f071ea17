//! Temporary blob hosting over the timed store.

mod host;
mod payload;

pub use host::{BlobHost, DEFAULT_BLOB_TTL, DEFAULT_MAX_ID_ATTEMPTS};
pub use payload::Blob;
