//! Bounded Blocking Queue
//!
//! A capacity-bounded FIFO guarded by one mutex and two condition variables:
//!
//! ```text
//! Producer (push)                      Consumer (pop)
//! ---------------                      --------------
//! lock                                 lock
//! while len >= capacity:               while empty:
//!     wait(space_available)                wait(item_available)
//! push_back                            pop_front
//! unlock                               unlock
//! notify_one(item_available)  ---->    notify_one(space_available)  ---->
//! ```
//!
//! `Condvar::wait` releases the mutex atomically while the thread sleeps and
//! re-acquires it before returning, so the lock is never held across a
//! suspension. Every wait sits inside a loop that re-checks its predicate,
//! which makes spurious wakeups and stolen notifications harmless.
//!
//! ## Blocking contract
//!
//! [`push`](BoundedBlockingQueue::push) and [`pop`](BoundedBlockingQueue::pop)
//! wait for as long as it takes; they never time out and never drop or
//! fabricate an item. Bounded waiting is available only through the separate
//! [`push_timeout`](BoundedBlockingQueue::push_timeout) and
//! [`pop_timeout`](BoundedBlockingQueue::pop_timeout), which report
//! [`Error::Timeout`] and hand a rejected item back to the caller.
//!
//! A queue with capacity `0` is permanently full: `push` on it blocks
//! forever, `try_push` fails with [`Error::WouldBlock`] and `push_timeout`
//! fails with [`Error::Timeout`].

use crate::metrics::{AtomicMetrics, MetricsCollector, QueueMetrics};
use crate::sync::{Condvar, Mutex, MutexGuard};
use crate::{Error, Result};
use std::collections::VecDeque;
use std::fmt;
use std::sync::PoisonError;
use std::time::{Duration, Instant};

// Upper bound on slots reserved up front; larger queues grow on demand.
const MAX_PREALLOCATED_SLOTS: usize = 1024;

type Guard<'a, T> = MutexGuard<'a, VecDeque<T>>;

/// A bounded, blocking, multi-producer multi-consumer FIFO queue
///
/// Producers calling [`push`](Self::push) sleep while the queue holds
/// `capacity` items; consumers calling [`pop`](Self::pop) sleep while it is
/// empty. Items come out in the order their pushes completed. Which of
/// several simultaneously blocked threads is woken first is unspecified.
///
/// # Examples
///
/// ```rust
/// use boundq::BoundedBlockingQueue;
/// use std::sync::Arc;
/// use std::thread;
///
/// let queue = Arc::new(BoundedBlockingQueue::new(2));
///
/// let producer = thread::spawn({
///     let queue = Arc::clone(&queue);
///     move || {
///         for i in 1..=5 {
///             queue.push(i);
///         }
///     }
/// });
///
/// let received: Vec<i32> = (0..5).map(|_| queue.pop()).collect();
/// producer.join().unwrap();
/// assert_eq!(received, vec![1, 2, 3, 4, 5]);
/// ```
pub struct BoundedBlockingQueue<T> {
    items: Mutex<VecDeque<T>>,
    capacity: usize,
    item_available: Condvar,
    space_available: Condvar,
    metrics: AtomicMetrics,
}

impl<T> BoundedBlockingQueue<T> {
    /// Create an empty queue holding at most `capacity` items
    ///
    /// A capacity of `0` is accepted and yields a queue no push can ever
    /// succeed on.
    pub fn new(capacity: usize) -> Self {
        tracing::debug!(capacity, "created bounded blocking queue");
        Self {
            items: Mutex::new(VecDeque::with_capacity(capacity.min(MAX_PREALLOCATED_SLOTS))),
            capacity,
            item_available: Condvar::new(),
            space_available: Condvar::new(),
            metrics: AtomicMetrics::default(),
        }
    }

    /// Create a queue from any integer capacity
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` does not fit in a
    /// `usize`, which includes every negative value.
    ///
    /// ```rust
    /// use boundq::{BoundedBlockingQueue, Error};
    ///
    /// assert!(BoundedBlockingQueue::<u8>::try_new(4i64).is_ok());
    /// assert_eq!(
    ///     BoundedBlockingQueue::<u8>::try_new(-1i64).unwrap_err(),
    ///     Error::InvalidCapacity
    /// );
    /// ```
    pub fn try_new<C>(capacity: C) -> Result<Self>
    where
        C: TryInto<usize>,
    {
        capacity
            .try_into()
            .map(Self::new)
            .map_err(|_| Error::InvalidCapacity)
    }

    /// Append `item`, blocking while the queue is full
    ///
    /// Never times out. On a zero-capacity queue this call never returns.
    pub fn push(&self, item: T) {
        let mut items = self.lock();
        let mut clock = WaitClock::new(Waiter::Producer);
        while items.len() >= self.capacity {
            clock.start(&self.metrics);
            items = self
                .space_available
                .wait(items)
                .unwrap_or_else(PoisonError::into_inner);
        }
        self.enqueue(items, item);
        clock.stop(&self.metrics);
    }

    /// Append `item` without blocking
    ///
    /// # Errors
    ///
    /// Fails with [`Error::WouldBlock`] if the queue is full; the item is
    /// returned inside the [`PushError`].
    pub fn try_push(&self, item: T) -> core::result::Result<(), PushError<T>> {
        let items = self.lock();
        if items.len() >= self.capacity {
            drop(items);
            self.metrics.record_rejected_push();
            return Err(PushError::new(item, Error::WouldBlock));
        }
        self.enqueue(items, item);
        Ok(())
    }

    /// Append `item`, waiting at most `timeout` for space
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Timeout`] if no space appeared in time; the item
    /// is returned inside the [`PushError`] and was not enqueued.
    ///
    /// ```rust
    /// use boundq::{BoundedBlockingQueue, Error};
    /// use std::time::Duration;
    ///
    /// let queue = BoundedBlockingQueue::new(1);
    /// queue.push(1);
    ///
    /// let err = queue.push_timeout(2, Duration::from_millis(10)).unwrap_err();
    /// assert_eq!(err.reason(), Error::Timeout);
    /// assert_eq!(err.into_inner(), 2);
    /// ```
    pub fn push_timeout(
        &self,
        item: T,
        timeout: Duration,
    ) -> core::result::Result<(), PushError<T>> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.push(item);
            return Ok(());
        };

        let mut items = self.lock();
        let mut clock = WaitClock::new(Waiter::Producer);
        while items.len() >= self.capacity {
            clock.start(&self.metrics);
            items = match Self::wait_until(&self.space_available, items, deadline) {
                Some(items) => items,
                None => {
                    clock.stop(&self.metrics);
                    self.metrics.record_timeout();
                    tracing::debug!(?timeout, capacity = self.capacity, "push timed out");
                    return Err(PushError::new(item, Error::Timeout));
                }
            };
        }
        self.enqueue(items, item);
        clock.stop(&self.metrics);
        Ok(())
    }

    /// Remove the front item, blocking while the queue is empty
    pub fn pop(&self) -> T {
        let mut items = self.lock();
        let mut clock = WaitClock::new(Waiter::Consumer);
        let item = loop {
            if let Some(item) = items.pop_front() {
                break item;
            }
            clock.start(&self.metrics);
            items = self
                .item_available
                .wait(items)
                .unwrap_or_else(PoisonError::into_inner);
        };
        self.release_one(items);
        clock.stop(&self.metrics);
        item
    }

    /// Remove the front item without blocking
    ///
    /// Returns `None` if the queue is empty.
    pub fn try_pop(&self) -> Option<T> {
        let mut items = self.lock();
        let front = items.pop_front();
        match front {
            Some(item) => {
                self.release_one(items);
                Some(item)
            }
            None => {
                drop(items);
                self.metrics.record_empty_pop();
                None
            }
        }
    }

    /// Remove the front item, waiting at most `timeout` for one to arrive
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Timeout`] if the queue stayed empty.
    pub fn pop_timeout(&self, timeout: Duration) -> Result<T> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return Ok(self.pop());
        };

        let mut items = self.lock();
        let mut clock = WaitClock::new(Waiter::Consumer);
        let item = loop {
            if let Some(item) = items.pop_front() {
                break item;
            }
            clock.start(&self.metrics);
            items = match Self::wait_until(&self.item_available, items, deadline) {
                Some(items) => items,
                None => {
                    clock.stop(&self.metrics);
                    self.metrics.record_timeout();
                    tracing::debug!(?timeout, "pop timed out");
                    return Err(Error::Timeout);
                }
            };
        };
        self.release_one(items);
        clock.stop(&self.metrics);
        Ok(item)
    }

    /// Remove every queued item in FIFO order
    ///
    /// All blocked producers are woken, since more than one slot may have
    /// been freed.
    pub fn drain(&self) -> Vec<T> {
        let mut items = self.lock();
        let drained: Vec<T> = items.drain(..).collect();
        drop(items);
        if !drained.is_empty() {
            self.metrics.record_pops(drained.len() as u64);
            self.space_available.notify_all();
        }
        drained
    }

    /// Number of items currently queued
    ///
    /// Read under the lock, but advisory: other threads may change it as
    /// soon as this returns.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the queue currently holds no items (advisory)
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Whether the queue is currently at capacity (advisory)
    pub fn is_full(&self) -> bool {
        self.lock().len() >= self.capacity
    }

    /// Free slots at the moment of the call (advisory)
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.lock().len())
    }

    /// Maximum number of items, fixed at construction
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // Only buffer operations run under the lock; tracing events and any
    // subscriber code they reach happen after the guard is dropped. A
    // poisoned mutex therefore still guards a consistent buffer.
    fn lock(&self) -> Guard<'_, T> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enqueue(&self, mut items: Guard<'_, T>, item: T) {
        items.push_back(item);
        let len = items.len();
        drop(items);
        self.metrics.record_push(len);
        self.item_available.notify_one();
    }

    fn release_one(&self, items: Guard<'_, T>) {
        drop(items);
        self.metrics.record_pops(1);
        self.space_available.notify_one();
    }

    /// One timed wait on `signal`; `None` once `deadline` has passed.
    fn wait_until<'a>(
        signal: &Condvar,
        items: Guard<'a, T>,
        deadline: Instant,
    ) -> Option<Guard<'a, T>> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return None;
        }
        let (items, _) = signal
            .wait_timeout(items, remaining)
            .unwrap_or_else(PoisonError::into_inner);
        Some(items)
    }
}

impl<T> fmt::Debug for BoundedBlockingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedBlockingQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<T> MetricsCollector for BoundedBlockingQueue<T> {
    fn metrics(&self) -> QueueMetrics {
        self.metrics.snapshot()
    }

    fn reset_metrics(&self) {
        self.metrics.reset(self.len());
    }

    fn set_metrics_enabled(&self, enabled: bool) {
        self.metrics.set_enabled(enabled);
    }

    fn is_metrics_enabled(&self) -> bool {
        self.metrics.is_enabled()
    }
}

#[derive(Debug, Clone, Copy)]
enum Waiter {
    Producer,
    Consumer,
}

/// Time one operation spent suspended, recorded once it stops waiting.
///
/// `stop` logs, so it must be called after the queue's guard is released.
struct WaitClock {
    waiter: Waiter,
    started: Option<Instant>,
}

impl WaitClock {
    fn new(waiter: Waiter) -> Self {
        Self { waiter, started: None }
    }

    fn start(&mut self, metrics: &AtomicMetrics) {
        if self.started.is_some() {
            return;
        }
        match self.waiter {
            Waiter::Producer => metrics.record_blocked_push(),
            Waiter::Consumer => metrics.record_blocked_pop(),
        }
        self.started = Some(Instant::now());
    }

    fn stop(self, metrics: &AtomicMetrics) {
        if let Some(started) = self.started {
            let waited = started.elapsed();
            metrics.record_wait(waited);
            tracing::trace!(waiter = ?self.waiter, ?waited, "stopped waiting");
        }
    }
}

/// A push that did not enqueue its item
///
/// The rejected item travels back to the caller, so a failed push never
/// loses data.
pub struct PushError<T> {
    item: T,
    reason: Error,
}

impl<T> PushError<T> {
    pub(crate) fn new(item: T, reason: Error) -> Self {
        Self { item, reason }
    }

    /// Why the push failed: [`Error::WouldBlock`] or [`Error::Timeout`]
    pub fn reason(&self) -> Error {
        self.reason
    }

    /// Borrow the rejected item
    pub fn item(&self) -> &T {
        &self.item
    }

    /// Take back the rejected item
    pub fn into_inner(self) -> T {
        self.item
    }

    /// Whether the push gave up because its timeout expired
    pub fn is_timeout(&self) -> bool {
        self.reason == Error::Timeout
    }
}

impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushError")
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "push rejected: {}", self.reason)
    }
}

impl<T> std::error::Error for PushError<T> {}

impl<T> From<PushError<T>> for Error {
    fn from(err: PushError<T>) -> Self {
        err.reason
    }
}
