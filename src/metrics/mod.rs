//! Runtime Metrics Module
//!
//! Counters describing how a [`ConcurrentDeque`](crate::ConcurrentDeque) is used:
//! how many elements went in and out, how often consumers had to block on an empty
//! deque and for how long. Counters are relaxed atomics updated outside the deque's
//! lock, so a snapshot taken under concurrent use is approximate.

use core::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Point-in-time copy of a deque's counters
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DequeMetrics {
    /// Number of elements inserted at either end
    pub insertions: u64,
    /// Number of elements removed from either end
    pub removals: u64,
    /// Number of peek operations that returned an element
    pub peeks: u64,
    /// Number of operations that had to suspend on an empty deque at least once
    pub blocked_operations: u64,
    /// Number of timed operations that gave up
    pub timeouts: u64,
    /// Total time spent suspended, in nanoseconds
    pub total_wait_time_ns: u64,
    /// Longest single suspension, in nanoseconds
    pub max_wait_time_ns: u64,
    /// Largest length observed right after an insertion
    pub peak_len: usize,
}

impl DequeMetrics {
    /// Percentage of consuming operations (removals and peeks) that had to block
    pub fn blocking_rate(&self) -> f64 {
        let consuming = self.removals + self.peeks + self.timeouts;
        if consuming == 0 {
            0.0
        } else {
            (self.blocked_operations as f64 / consuming as f64) * 100.0
        }
    }

    /// Average suspension time of the operations that blocked
    pub fn avg_wait_time(&self) -> Duration {
        if self.blocked_operations == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(self.total_wait_time_ns / self.blocked_operations)
        }
    }

    /// Longest single suspension
    pub fn max_wait_time(&self) -> Duration {
        Duration::from_nanos(self.max_wait_time_ns)
    }
}

/// Internal atomic metrics collection
#[derive(Debug)]
pub(crate) struct AtomicMetrics {
    enabled: AtomicUsize,
    insertions: AtomicU64,
    removals: AtomicU64,
    peeks: AtomicU64,
    blocked_operations: AtomicU64,
    timeouts: AtomicU64,
    total_wait_time_ns: AtomicU64,
    max_wait_time_ns: AtomicU64,
    peak_len: AtomicUsize,
}

impl Default for AtomicMetrics {
    fn default() -> Self {
        Self {
            enabled: AtomicUsize::new(1),
            insertions: AtomicU64::new(0),
            removals: AtomicU64::new(0),
            peeks: AtomicU64::new(0),
            blocked_operations: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            total_wait_time_ns: AtomicU64::new(0),
            max_wait_time_ns: AtomicU64::new(0),
            peak_len: AtomicUsize::new(0),
        }
    }
}

impl AtomicMetrics {
    #[inline]
    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed) != 0
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled as usize, Ordering::Relaxed);
    }

    /// Record `count` insertions that left the deque holding `len` elements
    pub(crate) fn record_insertions(&self, count: usize, len: usize) {
        if !self.is_enabled() || count == 0 {
            return;
        }
        self.insertions.fetch_add(count as u64, Ordering::Relaxed);
        self.peak_len.fetch_max(len, Ordering::Relaxed);
    }

    pub(crate) fn record_removals(&self, count: usize) {
        if self.is_enabled() && count > 0 {
            self.removals.fetch_add(count as u64, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_peek(&self) {
        if self.is_enabled() {
            self.peeks.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record that an operation is about to suspend.
    ///
    /// Counted before the wait starts so observers can tell a consumer is parked.
    pub(crate) fn record_block(&self) {
        if self.is_enabled() {
            self.blocked_operations.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record how long a blocked operation stayed suspended
    pub(crate) fn record_wait(&self, waited: Duration) {
        if !self.is_enabled() {
            return;
        }
        let waited_ns = u64::try_from(waited.as_nanos()).unwrap_or(u64::MAX);
        self.total_wait_time_ns.fetch_add(waited_ns, Ordering::Relaxed);
        self.max_wait_time_ns.fetch_max(waited_ns, Ordering::Relaxed);
    }

    pub(crate) fn record_timeout(&self) {
        if self.is_enabled() {
            self.timeouts.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get current metrics snapshot
    pub(crate) fn snapshot(&self) -> DequeMetrics {
        DequeMetrics {
            insertions: self.insertions.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            peeks: self.peeks.load(Ordering::Relaxed),
            blocked_operations: self.blocked_operations.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            total_wait_time_ns: self.total_wait_time_ns.load(Ordering::Relaxed),
            max_wait_time_ns: self.max_wait_time_ns.load(Ordering::Relaxed),
            peak_len: self.peak_len.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters; the enabled flag is kept
    pub(crate) fn reset(&self) {
        self.insertions.store(0, Ordering::Relaxed);
        self.removals.store(0, Ordering::Relaxed);
        self.peeks.store(0, Ordering::Relaxed);
        self.blocked_operations.store(0, Ordering::Relaxed);
        self.timeouts.store(0, Ordering::Relaxed);
        self.total_wait_time_ns.store(0, Ordering::Relaxed);
        self.max_wait_time_ns.store(0, Ordering::Relaxed);
        self.peak_len.store(0, Ordering::Relaxed);
    }
}

/// Trait for data structures that support runtime metrics
pub trait MetricsCollector {
    /// Get current metrics
    fn metrics(&self) -> DequeMetrics;

    /// Reset all metrics
    fn reset_metrics(&self);

    /// Enable or disable metrics collection
    fn set_metrics_enabled(&self, enabled: bool);

    /// Check if metrics collection is enabled
    fn is_metrics_enabled(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_tracks_counters() {
        let metrics = AtomicMetrics::default();
        metrics.record_insertions(3, 3);
        metrics.record_insertions(1, 2);
        metrics.record_removals(2);
        metrics.record_peek();
        metrics.record_block();
        metrics.record_wait(Duration::from_nanos(300));
        metrics.record_block();
        metrics.record_wait(Duration::from_nanos(100));
        metrics.record_timeout();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.insertions, 4);
        assert_eq!(snapshot.removals, 2);
        assert_eq!(snapshot.peeks, 1);
        assert_eq!(snapshot.blocked_operations, 2);
        assert_eq!(snapshot.timeouts, 1);
        assert_eq!(snapshot.total_wait_time_ns, 400);
        assert_eq!(snapshot.max_wait_time_ns, 300);
        assert_eq!(snapshot.peak_len, 3);
        assert_eq!(snapshot.avg_wait_time(), Duration::from_nanos(200));
        assert_eq!(snapshot.max_wait_time(), Duration::from_nanos(300));
    }

    #[test]
    fn test_disabled_metrics_record_nothing() {
        let metrics = AtomicMetrics::default();
        metrics.set_enabled(false);
        assert!(!metrics.is_enabled());

        metrics.record_insertions(5, 5);
        metrics.record_removals(5);
        metrics.record_block();
        assert_eq!(metrics.snapshot(), DequeMetrics::default());
    }

    #[test]
    fn test_reset_keeps_enabled_flag() {
        let metrics = AtomicMetrics::default();
        metrics.record_insertions(2, 2);
        metrics.reset();
        assert!(metrics.is_enabled());
        assert_eq!(metrics.snapshot(), DequeMetrics::default());
    }

    #[test]
    fn test_rates_on_empty_snapshot() {
        let snapshot = DequeMetrics::default();
        assert_eq!(snapshot.blocking_rate(), 0.0);
        assert_eq!(snapshot.avg_wait_time(), Duration::ZERO);
    }

    #[test]
    fn test_blocking_rate() {
        let snapshot = DequeMetrics {
            removals: 3,
            peeks: 1,
            blocked_operations: 1,
            ..DequeMetrics::default()
        };
        assert_eq!(snapshot.blocking_rate(), 25.0);
    }
}
