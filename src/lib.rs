//! # blocking-deque
//!
//! A thread-safe double-ended queue whose consumers block until data becomes available.
//!
//! ## Features
//!
//! - **ConcurrentDeque**: insert at either end, remove or peek at either end
//! - **Blocking consumers**: `pop_*`, `front` and `back` suspend while the deque is empty
//! - **Single wake-up per insertion**: each inserted element wakes at most one waiting consumer
//! - **Timed and non-blocking variants** for callers that must not wait forever
//! - **Runtime metrics** describing how often and how long consumers blocked
//!
//! ## Quick Start
//!
//! ```rust
//! use blocking_deque::ConcurrentDeque;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let deque = Arc::new(ConcurrentDeque::new());
//!
//! let consumer = {
//!     let deque = Arc::clone(&deque);
//!     thread::spawn(move || deque.pop_front())
//! };
//!
//! deque.push_back(42);
//! assert_eq!(consumer.join().unwrap(), 42);
//! ```
//!
//! ## Thread Safety
//!
//! The deque is shared by reference (usually through an [`Arc`](std::sync::Arc)).
//! Every read and write of the underlying sequence happens while its lock is held.
//!
//! ## Shutdown
//!
//! The blocking operations wait without bound. Producers and consumers that need to
//! stop must agree on their own protocol, for example a sentinel value pushed once per
//! consumer, or use the `*_timeout` variants and check an external flag between calls.

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod deque;
pub mod metrics;

pub use crate::deque::ConcurrentDeque;
pub use crate::metrics::{DequeMetrics, MetricsCollector};

/// Error types for deque operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A timed wait expired while the deque was still empty
    Timeout,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Timeout => write!(f, "Timed out waiting for an element"),
        }
    }
}

impl std::error::Error for Error {}

/// Result type for deque operations
pub type Result<T> = core::result::Result<T, Error>;
