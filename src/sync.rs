//! Synchronization primitives used by the queue
//!
//! Under `--cfg loom` these resolve to loom's model-checked types, so the
//! loom tests exercise [`BoundedBlockingQueue`](crate::BoundedBlockingQueue)
//! itself rather than a copy of its locking code.

#[cfg(loom)]
pub(crate) use loom::sync::{Condvar, Mutex, MutexGuard};

#[cfg(not(loom))]
pub(crate) use std::sync::{Condvar, Mutex, MutexGuard};
