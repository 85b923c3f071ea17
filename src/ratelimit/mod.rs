//! Fixed-window rate limiting over the timed store.

mod limiter;

pub use limiter::{Decision, WindowLimiter, DEFAULT_CEILING, DEFAULT_WINDOW};
