//! Queue Metrics Module
//!
//! Lightweight counters describing how a [`BoundedBlockingQueue`] is being
//! used: how often producers and consumers had to block, how long they
//! waited, how many timed operations expired and how full the queue got.
//!
//! Counters are plain relaxed atomics kept outside the queue's mutex, so
//! they never take part in the queue's synchronization. With the `metrics`
//! feature disabled every recording call compiles to nothing.
//!
//! [`BoundedBlockingQueue`]: crate::BoundedBlockingQueue

use std::time::Duration;

#[cfg(feature = "metrics")]
use core::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// Point-in-time snapshot of a queue's counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueueMetrics {
    /// Items successfully enqueued
    pub pushes: u64,
    /// Items successfully dequeued
    pub pops: u64,
    /// Push calls that had to wait for space at least once
    pub blocked_pushes: u64,
    /// Pop calls that had to wait for an item at least once
    pub blocked_pops: u64,
    /// `try_push` calls rejected because the queue was full
    pub rejected_pushes: u64,
    /// `try_pop` calls that found the queue empty
    pub empty_pops: u64,
    /// Timed operations that expired
    pub timeouts: u64,
    /// Total time spent blocked, in nanoseconds
    pub total_wait_ns: u64,
    /// Longest single blocking wait, in nanoseconds
    pub max_wait_ns: u64,
    /// Highest number of items observed in the queue
    pub peak_len: usize,
}

impl QueueMetrics {
    /// Every push/pop attempt that reached a conclusion
    pub fn total_operations(&self) -> u64 {
        self.pushes + self.pops + self.rejected_pushes + self.empty_pops + self.timeouts
    }

    /// Number of operations that blocked at least once
    pub fn blocked_operations(&self) -> u64 {
        self.blocked_pushes + self.blocked_pops
    }

    /// Share of operations that had to block, as a percentage
    pub fn contention_rate(&self) -> f64 {
        percentage(self.blocked_operations(), self.total_operations())
    }

    /// Share of operations that timed out, as a percentage
    pub fn timeout_rate(&self) -> f64 {
        percentage(self.timeouts, self.total_operations())
    }

    /// Average time a blocked operation spent waiting
    pub fn avg_wait(&self) -> Duration {
        match self.blocked_operations() {
            0 => Duration::ZERO,
            n => Duration::from_nanos(self.total_wait_ns / n),
        }
    }

    /// Longest single wait
    pub fn max_wait(&self) -> Duration {
        Duration::from_nanos(self.max_wait_ns)
    }
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64) * 100.0
    }
}

/// Internal atomic counters backing [`QueueMetrics`]
#[cfg(feature = "metrics")]
#[derive(Debug)]
pub(crate) struct AtomicMetrics {
    enabled: AtomicBool,
    pushes: AtomicU64,
    pops: AtomicU64,
    blocked_pushes: AtomicU64,
    blocked_pops: AtomicU64,
    rejected_pushes: AtomicU64,
    empty_pops: AtomicU64,
    timeouts: AtomicU64,
    total_wait_ns: AtomicU64,
    max_wait_ns: AtomicU64,
    peak_len: AtomicUsize,
}

#[cfg(feature = "metrics")]
impl Default for AtomicMetrics {
    fn default() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            pushes: AtomicU64::new(0),
            pops: AtomicU64::new(0),
            blocked_pushes: AtomicU64::new(0),
            blocked_pops: AtomicU64::new(0),
            rejected_pushes: AtomicU64::new(0),
            empty_pops: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            total_wait_ns: AtomicU64::new(0),
            max_wait_ns: AtomicU64::new(0),
            peak_len: AtomicUsize::new(0),
        }
    }
}

#[cfg(feature = "metrics")]
impl AtomicMetrics {
    #[inline]
    fn bump(&self, counter: &AtomicU64) {
        if self.is_enabled() {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record an enqueue; `len` is the queue length right after it
    pub fn record_push(&self, len: usize) {
        if self.is_enabled() {
            self.pushes.fetch_add(1, Ordering::Relaxed);
            self.peak_len.fetch_max(len, Ordering::Relaxed);
        }
    }

    /// Record `count` dequeued items
    pub fn record_pops(&self, count: u64) {
        if self.is_enabled() {
            self.pops.fetch_add(count, Ordering::Relaxed);
        }
    }

    pub fn record_blocked_push(&self) {
        self.bump(&self.blocked_pushes);
    }

    pub fn record_blocked_pop(&self) {
        self.bump(&self.blocked_pops);
    }

    pub fn record_rejected_push(&self) {
        self.bump(&self.rejected_pushes);
    }

    pub fn record_empty_pop(&self) {
        self.bump(&self.empty_pops);
    }

    pub fn record_timeout(&self) {
        self.bump(&self.timeouts);
    }

    /// Record how long a blocked operation spent suspended
    pub fn record_wait(&self, waited: Duration) {
        if !self.is_enabled() {
            return;
        }
        let nanos = u64::try_from(waited.as_nanos()).unwrap_or(u64::MAX);
        self.total_wait_ns.fetch_add(nanos, Ordering::Relaxed);
        self.max_wait_ns.fetch_max(nanos, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> QueueMetrics {
        QueueMetrics {
            pushes: self.pushes.load(Ordering::Relaxed),
            pops: self.pops.load(Ordering::Relaxed),
            blocked_pushes: self.blocked_pushes.load(Ordering::Relaxed),
            blocked_pops: self.blocked_pops.load(Ordering::Relaxed),
            rejected_pushes: self.rejected_pushes.load(Ordering::Relaxed),
            empty_pops: self.empty_pops.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            total_wait_ns: self.total_wait_ns.load(Ordering::Relaxed),
            max_wait_ns: self.max_wait_ns.load(Ordering::Relaxed),
            peak_len: self.peak_len.load(Ordering::Relaxed),
        }
    }

    /// Zero every counter; `peak_len` restarts from `current_len`
    pub fn reset(&self, current_len: usize) {
        self.pushes.store(0, Ordering::Relaxed);
        self.pops.store(0, Ordering::Relaxed);
        self.blocked_pushes.store(0, Ordering::Relaxed);
        self.blocked_pops.store(0, Ordering::Relaxed);
        self.rejected_pushes.store(0, Ordering::Relaxed);
        self.empty_pops.store(0, Ordering::Relaxed);
        self.timeouts.store(0, Ordering::Relaxed);
        self.total_wait_ns.store(0, Ordering::Relaxed);
        self.max_wait_ns.store(0, Ordering::Relaxed);
        self.peak_len.store(current_len, Ordering::Relaxed);
    }
}

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default)]
pub(crate) struct AtomicMetrics;

#[cfg(not(feature = "metrics"))]
impl AtomicMetrics {
    pub fn record_push(&self, _len: usize) {}
    pub fn record_pops(&self, _count: u64) {}
    pub fn record_blocked_push(&self) {}
    pub fn record_blocked_pop(&self) {}
    pub fn record_rejected_push(&self) {}
    pub fn record_empty_pop(&self) {}
    pub fn record_timeout(&self) {}
    pub fn record_wait(&self, _waited: Duration) {}
    pub fn is_enabled(&self) -> bool {
        false
    }
    pub fn set_enabled(&self, _enabled: bool) {}
    pub fn snapshot(&self) -> QueueMetrics {
        QueueMetrics::default()
    }
    pub fn reset(&self, _current_len: usize) {}
}

/// Trait for structures that expose [`QueueMetrics`]
pub trait MetricsCollector {
    /// Get a snapshot of the current counters
    fn metrics(&self) -> QueueMetrics;

    /// Reset all counters
    fn reset_metrics(&self);

    /// Enable or disable metrics collection
    fn set_metrics_enabled(&self, enabled: bool);

    /// Check if metrics collection is enabled
    fn is_metrics_enabled(&self) -> bool;
}

#[cfg(all(test, feature = "metrics"))]
mod tests {
    use super::*;

    #[test]
    fn test_rates_on_empty_snapshot() {
        let metrics = QueueMetrics::default();
        assert_eq!(metrics.total_operations(), 0);
        assert_eq!(metrics.contention_rate(), 0.0);
        assert_eq!(metrics.timeout_rate(), 0.0);
        assert_eq!(metrics.avg_wait(), Duration::ZERO);
    }

    #[test]
    fn test_record_and_snapshot() {
        let metrics = AtomicMetrics::default();
        metrics.record_push(1);
        metrics.record_push(2);
        metrics.record_blocked_push();
        metrics.record_wait(Duration::from_nanos(300));
        metrics.record_wait(Duration::from_nanos(100));
        metrics.record_pops(1);
        metrics.record_timeout();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.pushes, 2);
        assert_eq!(snapshot.pops, 1);
        assert_eq!(snapshot.timeouts, 1);
        assert_eq!(snapshot.peak_len, 2);
        assert_eq!(snapshot.total_wait_ns, 400);
        assert_eq!(snapshot.max_wait_ns, 300);
        assert_eq!(snapshot.avg_wait(), Duration::from_nanos(400));
        assert_eq!(snapshot.total_operations(), 4);
        assert_eq!(snapshot.timeout_rate(), 25.0);
    }

    #[test]
    fn test_disabled_metrics_record_nothing() {
        let metrics = AtomicMetrics::default();
        metrics.set_enabled(false);
        metrics.record_push(5);
        metrics.record_empty_pop();
        metrics.record_wait(Duration::from_millis(1));
        assert_eq!(metrics.snapshot(), QueueMetrics::default());

        metrics.set_enabled(true);
        metrics.record_empty_pop();
        assert_eq!(metrics.snapshot().empty_pops, 1);
    }

    #[test]
    fn test_reset_keeps_current_len_as_peak() {
        let metrics = AtomicMetrics::default();
        metrics.record_push(7);
        metrics.reset(3);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.pushes, 0);
        assert_eq!(snapshot.peak_len, 3);
    }
}
