//! # boundq
//!
//! A bounded, thread-safe FIFO queue for handing items between producer and
//! consumer threads with blocking backpressure in both directions.
//!
//! ## Features
//!
//! - **Blocking push/pop**: producers sleep while the queue is full, consumers
//!   sleep while it is empty, and neither busy-polls
//! - **Explicit timeouts**: `push_timeout` / `pop_timeout` report
//!   [`Error::Timeout`] instead of silently giving up
//! - **Non-blocking variants**: `try_push` / `try_pop` never wait
//! - **Metrics**: per-queue counters for blocked, rejected and timed-out operations
//!
//! ## Quick Start
//!
//! ```rust
//! use boundq::BoundedBlockingQueue;
//!
//! let queue = BoundedBlockingQueue::new(2);
//! queue.push(1);
//! queue.push(2);
//! assert_eq!(queue.len(), 2);
//! assert_eq!(queue.capacity(), 2);
//! assert_eq!(queue.pop(), 1);
//! assert_eq!(queue.pop(), 2);
//! assert!(queue.is_empty());
//! ```
//!
//! ## Thread Safety
//!
//! [`BoundedBlockingQueue`] is `Send + Sync` whenever `T: Send`; share it
//! between threads with an [`Arc`](std::sync::Arc). All access to the
//! underlying buffer is serialized by a single mutex, and the mutex is never
//! held while a thread is suspended.

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod metrics;
pub mod queue;
mod sync;

pub use crate::metrics::{MetricsCollector, QueueMetrics};
pub use crate::queue::{BoundedBlockingQueue, PushError};

/// Error types for boundq operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// The requested capacity cannot be represented (e.g. it is negative)
    InvalidCapacity,
    /// A non-blocking operation could not proceed (queue full or empty)
    WouldBlock,
    /// A timed operation expired before its condition was satisfied
    Timeout,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::InvalidCapacity => write!(f, "Invalid queue capacity"),
            Error::WouldBlock => write!(f, "Operation would block"),
            Error::Timeout => write!(f, "Operation timed out"),
        }
    }
}

impl std::error::Error for Error {}

/// Result type for boundq operations
pub type Result<T> = core::result::Result<T, Error>;
