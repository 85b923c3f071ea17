//! A stored value paired with its expiry instant.

use std::time::SystemTime;

/// A value together with the absolute instant after which it is considered
/// absent.
///
/// An expired entry may remain physically present until the next sweep or
/// until a reader observes it; it is logically deleted either way.
#[derive(Debug, Clone)]
pub struct TimedEntry<V> {
    /// The stored payload
    pub value: V,
    /// Instant at which the entry stops being readable
    pub expires_at: SystemTime,
}

impl<V> TimedEntry<V> {
    /// Create an entry expiring at `expires_at`.
    pub fn new(value: V, expires_at: SystemTime) -> Self {
        Self { value, expires_at }
    }

    /// Whether the entry is past its expiry as of `now`.
    ///
    /// An entry is readable only while `now < expires_at`; the boundary
    /// instant itself counts as expired.
    pub fn is_expired(&self, now: SystemTime) -> bool {
        now >= self.expires_at
    }
}
