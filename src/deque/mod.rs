//! Deque (double-ended queue) implementations
//!
//! This module provides a blocking deque for hand-off between producer and consumer threads.
//!
//! ## Available Deques
//!
//! - [`ConcurrentDeque`]: mutex-guarded deque whose consumers wait until an element is available
//!
//! ## Choosing an Operation
//!
//! - Use `pop_front` / `pop_back` when a consumer has nothing else to do until work arrives
//! - Use the `*_timeout` variants when a consumer must periodically check a shutdown flag
//! - Use the `try_*` variants for polling without ever suspending

pub mod concurrent;

pub use self::concurrent::ConcurrentDeque;


#[cfg(test)]
mod proptests;
