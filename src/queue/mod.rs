//! Queue implementations
//!
//! This module provides the bounded blocking queue and its error type.
//!
//! ## Available Queues
//!
//! - [`BoundedBlockingQueue`]: fixed-capacity FIFO with blocking backpressure
//!
//! ## Operation Summary
//!
//! | Operation | Full / Empty queue | Failure |
//! |-----------|--------------------|---------|
//! | `push` / `pop` | Blocks until ready | Never |
//! | `try_push` / `try_pop` | Returns immediately | `WouldBlock` / `None` |
//! | `push_timeout` / `pop_timeout` | Blocks up to a deadline | `Timeout` |
//!
//! ## Examples
//!
//! ```rust
//! use boundq::queue::BoundedBlockingQueue;
//! use std::time::Duration;
//!
//! let queue = BoundedBlockingQueue::new(8);
//! queue.push("hello");
//! assert_eq!(queue.pop_timeout(Duration::from_millis(10))?, "hello");
//!
//! # Ok::<(), boundq::Error>(())
//! ```
pub mod blocking;

pub use blocking::{BoundedBlockingQueue, PushError};


#[cfg(all(test, not(loom)))]
mod proptests;
