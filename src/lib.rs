//! Ephemera - Ephemeral Expiring Key-Value Store
//!
//! This crate implements an in-process concurrent key-value store whose
//! entries carry a time-to-live, together with its two consumers: a
//! fixed-window rate limiter and a temporary blob host. Expiry is enforced
//! lazily on every read, and a background sweep task bounds memory by
//! physically reclaiming expired entries.
//!
//! Stores are constructed by the composition root and handed to the
//! limiter, the blob host, and the sweep scheduler explicitly; there is no
//! ambient global state.
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use ephemera::ratelimit::WindowLimiter;
//! use ephemera::store::TimedStore;
//!
//! let counters = Arc::new(TimedStore::new());
//! let limiter = WindowLimiter::new(counters, Duration::from_secs(60), 10);
//!
//! let decision = limiter.check("203.0.113.7");
//! assert!(decision.allowed);
//! ```

pub mod blob;
pub mod clock;
pub mod config;
pub mod error;
pub mod ratelimit;
pub mod store;
pub mod sweep;
