//! Temporary blob host implementation.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::config::BlobConfig;
use crate::error::{EphemeraError, Result};
use crate::store::TimedStore;

use super::payload::{decode_data_url, Blob};

/// Default time-to-live for stored blobs.
pub const DEFAULT_BLOB_TTL: Duration = Duration::from_secs(3600);
/// Default number of id generation attempts before giving up.
pub const DEFAULT_MAX_ID_ATTEMPTS: u32 = 4;

/// Hosts uploaded payloads under generated ids for a fixed time-to-live.
///
/// Payloads arrive as `data:<mime>;base64,<payload>` strings and are stored
/// decoded. Expiry is a hard cut-off: retrieval does not renew the TTL, and
/// an expired id is reported exactly like one that never existed.
pub struct BlobHost {
    /// Decoded blobs indexed by generated id
    blobs: Arc<TimedStore<Blob>>,
    /// Fixed TTL applied at insertion
    ttl: Duration,
    /// Bound on id regeneration when a collision is detected
    max_id_attempts: u32,
}

impl BlobHost {
    /// Create a host over `blobs` with the default TTL.
    pub fn new(blobs: Arc<TimedStore<Blob>>) -> Self {
        Self {
            blobs,
            ttl: DEFAULT_BLOB_TTL,
            max_id_attempts: DEFAULT_MAX_ID_ATTEMPTS,
        }
    }

    /// Create a host from configuration.
    pub fn from_config(blobs: Arc<TimedStore<Blob>>, config: &BlobConfig) -> Self {
        Self {
            blobs,
            ttl: config.ttl(),
            max_id_attempts: config.max_id_attempts,
        }
    }

    /// Validate and store an encoded payload, returning its generated id.
    ///
    /// `encoded` must be a well-formed `data:<mime>;base64,<payload>`
    /// string; `media_type` is the type the blob will be served under.
    /// Ids are uuid-v4 (122 random bits), so collisions are negligible,
    /// but a collision with a live entry is never silently overwritten:
    /// the id is regenerated a bounded number of times and the call fails
    /// with [`EphemeraError::IdSpaceExhausted`] if every attempt collides.
    pub fn store(&self, encoded: &str, media_type: &str) -> Result<String> {
        let content = decode_data_url(encoded)?;
        let blob = Blob {
            media_type: media_type.to_string(),
            content,
        };

        for _ in 0..self.max_id_attempts {
            let id = Uuid::new_v4().simple().to_string();
            // Insert-if-absent runs under the per-key lock, so the liveness
            // check and the write are a single step
            if self.blobs.put_if_absent(&id, blob.clone(), self.ttl) {
                trace!(
                    id = %id,
                    media_type = %blob.media_type,
                    size = blob.content.len(),
                    "Stored blob"
                );
                return Ok(id);
            }
            debug!(id = %id, "Blob id collision, regenerating");
        }

        Err(EphemeraError::IdSpaceExhausted)
    }

    /// Look up a blob by id.
    ///
    /// Absent and expired ids both return [`EphemeraError::NotFound`];
    /// callers cannot distinguish the two.
    pub fn retrieve(&self, id: &str) -> Result<Blob> {
        self.blobs.get(id).ok_or(EphemeraError::NotFound)
    }

    /// The fixed TTL applied to stored blobs.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
