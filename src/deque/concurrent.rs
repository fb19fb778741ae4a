//! Blocking Concurrent Deque
//!
//! A double-ended queue guarded by a single mutex, with a condition variable that
//! wakes consumers waiting for the deque to become non-empty.
//!
//! ## Design
//!
//! - `items`: the `VecDeque` holding the elements, only touched while its lock is held
//! - `available`: signalled once per inserted element, after the lock is released
//!
//! Insertions take the lock, mutate, release, then call `notify_one` for every element
//! they added. Consumers that find the deque empty suspend on `available` and re-check
//! the deque each time they wake, so spurious wake-ups are harmless.
//!
//! ## Blocking Behavior
//!
//! | Operation | Suspends on empty | Returns |
//! |-----------|-------------------|---------|
//! | `pop_front` / `pop_back` | yes, unbounded | removed element |
//! | `front` / `back` | yes, unbounded | clone of the element |
//! | `*_timeout` | yes, until deadline | `Err(Error::Timeout)` on expiry |
//! | `try_*` | no | `None` when empty |
//! | `len` / `is_empty` / `clear` | no | current state |
//!
//! No ordering among waiting consumers is guaranteed beyond what the condition
//! variable provides.
//!
//! ## Example
//!
//! ```rust
//! use blocking_deque::ConcurrentDeque;
//!
//! let deque = ConcurrentDeque::new();
//! deque.emplace_back(|| 1);
//! deque.emplace_back(|| 2);
//!
//! assert_eq!(deque.back(), 2);
//! assert_eq!(deque.pop_front(), 1);
//! assert_eq!(deque.pop_front(), 2);
//! assert!(deque.is_empty());
//! ```

use crate::metrics::{AtomicMetrics, DequeMetrics, MetricsCollector};
use crate::{Error, Result};
use core::convert::Infallible;
use log::{debug, trace};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// A thread-safe deque whose consumers block until an element is available
///
/// Share it between threads through an [`Arc`](std::sync::Arc). Producers call the
/// `push_*` / `emplace_*` methods; consumers call `pop_*`, `front` or `back`, which
/// suspend while the deque is empty.
///
/// # Type Parameters
///
/// * `T` - The type of elements stored in the deque. Only peeking requires `T: Clone`.
///
/// # Examples
///
/// ```rust
/// use blocking_deque::ConcurrentDeque;
/// use std::sync::Arc;
/// use std::thread;
///
/// let deque = Arc::new(ConcurrentDeque::new());
///
/// let producer = {
///     let deque = Arc::clone(&deque);
///     thread::spawn(move || {
///         for i in 0..10 {
///             deque.push_back(i);
///         }
///     })
/// };
///
/// let received: Vec<i32> = (0..10).map(|_| deque.pop_front()).collect();
/// producer.join().unwrap();
/// assert_eq!(received, (0..10).collect::<Vec<_>>());
/// ```
#[derive(Debug)]
pub struct ConcurrentDeque<T> {
    items: Mutex<VecDeque<T>>,
    available: Condvar,
    metrics: AtomicMetrics,
}

impl<T> ConcurrentDeque<T> {
    /// Create an empty deque
    pub fn new() -> Self {
        Self::from(VecDeque::new())
    }

    /// Create an empty deque with room for `capacity` elements before reallocating
    ///
    /// This is an allocation hint, not a bound: the deque grows without limit.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from(VecDeque::with_capacity(capacity))
    }

    /// Construct an element in front of the deque and wake one waiting consumer
    ///
    /// `make` runs while the lock is held. If it panics, the lock is released and
    /// the deque is left unchanged.
    pub fn emplace_front<F>(&self, make: F)
    where
        F: FnOnce() -> T,
    {
        self.add_data(|items| {
            items.push_front(make());
            1
        });
    }

    /// Construct an element at the back of the deque and wake one waiting consumer
    ///
    /// `make` runs while the lock is held. If it panics, the lock is released and
    /// the deque is left unchanged.
    pub fn emplace_back<F>(&self, make: F)
    where
        F: FnOnce() -> T,
    {
        self.add_data(|items| {
            items.push_back(make());
            1
        });
    }

    /// Construct an element in front of the deque with a fallible constructor
    ///
    /// On `Err` the error is returned unchanged, nothing is inserted and no
    /// consumer is woken.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use blocking_deque::ConcurrentDeque;
    ///
    /// let deque: ConcurrentDeque<u8> = ConcurrentDeque::new();
    /// assert!(deque.try_emplace_front(|| "300".parse::<u8>()).is_err());
    /// assert!(deque.is_empty());
    ///
    /// deque.try_emplace_front(|| "7".parse::<u8>()).unwrap();
    /// assert_eq!(deque.pop_front(), 7);
    /// ```
    pub fn try_emplace_front<F, E>(&self, make: F) -> core::result::Result<(), E>
    where
        F: FnOnce() -> core::result::Result<T, E>,
    {
        self.add_data_protected::<_, E>(|items| {
            items.push_front(make()?);
            Ok(1)
        })
        .map(drop)
    }

    /// Construct an element at the back of the deque with a fallible constructor
    ///
    /// On `Err` the error is returned unchanged, nothing is inserted and no
    /// consumer is woken.
    pub fn try_emplace_back<F, E>(&self, make: F) -> core::result::Result<(), E>
    where
        F: FnOnce() -> core::result::Result<T, E>,
    {
        self.add_data_protected::<_, E>(|items| {
            items.push_back(make()?);
            Ok(1)
        })
        .map(drop)
    }

    /// Insert `value` in front of the deque and wake one waiting consumer
    pub fn push_front(&self, value: T) {
        self.add_data(|items| {
            items.push_front(value);
            1
        });
    }

    /// Insert `value` at the back of the deque and wake one waiting consumer
    pub fn push_back(&self, value: T) {
        self.add_data(|items| {
            items.push_back(value);
            1
        });
    }

    /// Append every value of `values` at the back under a single lock acquisition
    ///
    /// One consumer is woken per inserted element. Returns the number of elements
    /// inserted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use blocking_deque::ConcurrentDeque;
    ///
    /// let deque = ConcurrentDeque::new();
    /// assert_eq!(deque.push_back_batch(vec![1, 2, 3]), 3);
    /// assert_eq!(deque.len(), 3);
    /// ```
    pub fn push_back_batch<I>(&self, values: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        self.add_data(|items| {
            let before = items.len();
            items.extend(values);
            items.len() - before
        })
    }

    /// Remove and return the front element, blocking while the deque is empty
    pub fn pop_front(&self) -> T {
        let (value, _) = self.wait_for(VecDeque::pop_front);
        self.metrics.record_removals(1);
        value
    }

    /// Remove and return the back element, blocking while the deque is empty
    pub fn pop_back(&self) -> T {
        let (value, _) = self.wait_for(VecDeque::pop_back);
        self.metrics.record_removals(1);
        value
    }

    /// Remove and return the front element if there is one, without blocking
    pub fn try_pop_front(&self) -> Option<T> {
        let value = self.items.lock().pop_front();
        if value.is_some() {
            self.metrics.record_removals(1);
        }
        value
    }

    /// Remove and return the back element if there is one, without blocking
    pub fn try_pop_back(&self) -> Option<T> {
        let value = self.items.lock().pop_back();
        if value.is_some() {
            self.metrics.record_removals(1);
        }
        value
    }

    /// Remove and return the front element, blocking for at most `timeout`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the deque is still empty when `timeout` expires.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use blocking_deque::{ConcurrentDeque, Error};
    /// use std::time::Duration;
    ///
    /// let deque: ConcurrentDeque<i32> = ConcurrentDeque::new();
    /// let result = deque.pop_front_timeout(Duration::from_millis(10));
    /// assert_eq!(result, Err(Error::Timeout));
    /// ```
    pub fn pop_front_timeout(&self, timeout: Duration) -> Result<T> {
        let (value, _) = self.wait_for_timeout(timeout, VecDeque::pop_front)?;
        self.metrics.record_removals(1);
        Ok(value)
    }

    /// Remove and return the back element, blocking for at most `timeout`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the deque is still empty when `timeout` expires.
    pub fn pop_back_timeout(&self, timeout: Duration) -> Result<T> {
        let (value, _) = self.wait_for_timeout(timeout, VecDeque::pop_back)?;
        self.metrics.record_removals(1);
        Ok(value)
    }

    /// Remove up to `max` elements from the front without blocking
    ///
    /// The elements are returned in front-to-back order. The result is empty when
    /// the deque is.
    pub fn drain_front(&self, max: usize) -> Vec<T> {
        let drained: Vec<T> = {
            let mut items = self.items.lock();
            let count = max.min(items.len());
            items.drain(..count).collect()
        };
        self.metrics.record_removals(drained.len());
        drained
    }

    /// Remove every element
    ///
    /// Never blocks and wakes nobody. The removed elements are dropped after the
    /// lock is released.
    pub fn clear(&self) {
        let removed = core::mem::take(&mut *self.items.lock());
        debug!("cleared {} elements from deque", removed.len());
    }

    /// Current number of elements; may be zero. Never blocks on emptiness.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Whether the deque currently holds no elements. Never blocks on emptiness.
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Consume the deque and return its elements
    pub fn into_inner(self) -> VecDeque<T> {
        self.items.into_inner()
    }

    /// Lock, run `insert`, unlock, then wake one consumer per inserted element.
    ///
    /// `insert` returns how many elements it added. If it fails, the error is
    /// propagated and nobody is woken; `insert` must not have modified the deque
    /// before failing.
    fn add_data_protected<F, E>(&self, insert: F) -> core::result::Result<usize, E>
    where
        F: FnOnce(&mut VecDeque<T>) -> core::result::Result<usize, E>,
    {
        let (inserted, len) = {
            let mut items = self.items.lock();
            let inserted = insert(&mut items)?;
            (inserted, items.len())
        };

        for _ in 0..inserted {
            if !self.available.notify_one() {
                break;
            }
        }
        self.metrics.record_insertions(inserted, len);
        Ok(inserted)
    }

    fn add_data<F>(&self, insert: F) -> usize
    where
        F: FnOnce(&mut VecDeque<T>) -> usize,
    {
        match self.add_data_protected(|items| Ok::<_, Infallible>(insert(items))) {
            Ok(inserted) => inserted,
            Err(never) => match never {},
        }
    }

    /// Block until `take` yields a value. Also reports whether the caller had to wait.
    fn wait_for<R, F>(&self, mut take: F) -> (R, bool)
    where
        F: FnMut(&mut VecDeque<T>) -> Option<R>,
    {
        let mut items = self.items.lock();
        if let Some(value) = take(&mut items) {
            return (value, false);
        }

        let started = self.begin_wait();
        loop {
            self.available.wait(&mut items);
            if let Some(value) = take(&mut items) {
                drop(items);
                self.end_wait(started);
                return (value, true);
            }
        }
    }

    /// Like [`wait_for`](Self::wait_for) but gives up once `timeout` has elapsed.
    fn wait_for_timeout<R, F>(&self, timeout: Duration, mut take: F) -> Result<(R, bool)>
    where
        F: FnMut(&mut VecDeque<T>) -> Option<R>,
    {
        let mut items = self.items.lock();
        if let Some(value) = take(&mut items) {
            return Ok((value, false));
        }

        // An unrepresentable deadline means waiting forever.
        let deadline = Instant::now().checked_add(timeout);
        let started = self.begin_wait();
        loop {
            let timed_out = match deadline {
                Some(deadline) => self.available.wait_until(&mut items, deadline).timed_out(),
                None => {
                    self.available.wait(&mut items);
                    false
                }
            };

            // Checked even after a timeout: an element may have arrived at the deadline.
            if let Some(value) = take(&mut items) {
                drop(items);
                self.end_wait(started);
                return Ok((value, true));
            }
            if timed_out {
                drop(items);
                self.end_wait(started);
                self.metrics.record_timeout();
                debug!("gave up waiting on empty deque after {:?}", timeout);
                return Err(Error::Timeout);
            }
        }
    }

    fn begin_wait(&self) -> Instant {
        self.metrics.record_block();
        trace!("deque empty, {:?} suspending", std::thread::current().id());
        Instant::now()
    }

    fn end_wait(&self, started: Instant) {
        let waited = started.elapsed();
        self.metrics.record_wait(waited);
        trace!(
            "{:?} resumed after waiting {:?}",
            std::thread::current().id(),
            waited
        );
    }

    /// A peek that was woken leaves the element in place, so pass the wake-up on.
    fn finish_peek(&self, waited: bool) {
        if waited {
            self.available.notify_one();
        }
        self.metrics.record_peek();
    }
}

impl<T: Clone> ConcurrentDeque<T> {
    /// Return a clone of the front element, blocking while the deque is empty
    ///
    /// The clone is taken while the lock is held; the element stays in the deque.
    pub fn front(&self) -> T {
        let (value, waited) = self.wait_for(|items| items.front().cloned());
        self.finish_peek(waited);
        value
    }

    /// Return a clone of the back element, blocking while the deque is empty
    ///
    /// The clone is taken while the lock is held; the element stays in the deque.
    pub fn back(&self) -> T {
        let (value, waited) = self.wait_for(|items| items.back().cloned());
        self.finish_peek(waited);
        value
    }

    /// Return a clone of the front element if there is one, without blocking
    pub fn try_front(&self) -> Option<T> {
        let value = self.items.lock().front().cloned();
        if value.is_some() {
            self.metrics.record_peek();
        }
        value
    }

    /// Return a clone of the back element if there is one, without blocking
    pub fn try_back(&self) -> Option<T> {
        let value = self.items.lock().back().cloned();
        if value.is_some() {
            self.metrics.record_peek();
        }
        value
    }

    /// Return a clone of the front element, blocking for at most `timeout`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the deque is still empty when `timeout` expires.
    pub fn front_timeout(&self, timeout: Duration) -> Result<T> {
        let (value, waited) = self.wait_for_timeout(timeout, |items| items.front().cloned())?;
        self.finish_peek(waited);
        Ok(value)
    }

    /// Return a clone of the back element, blocking for at most `timeout`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the deque is still empty when `timeout` expires.
    pub fn back_timeout(&self, timeout: Duration) -> Result<T> {
        let (value, waited) = self.wait_for_timeout(timeout, |items| items.back().cloned())?;
        self.finish_peek(waited);
        Ok(value)
    }
}

impl<T> Default for ConcurrentDeque<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<VecDeque<T>> for ConcurrentDeque<T> {
    fn from(items: VecDeque<T>) -> Self {
        Self {
            items: Mutex::new(items),
            available: Condvar::new(),
            metrics: AtomicMetrics::default(),
        }
    }
}

impl<T> FromIterator<T> for ConcurrentDeque<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<VecDeque<T>>())
    }
}

impl<T> MetricsCollector for ConcurrentDeque<T> {
    fn metrics(&self) -> DequeMetrics {
        self.metrics.snapshot()
    }

    fn reset_metrics(&self) {
        self.metrics.reset();
    }

    fn set_metrics_enabled(&self, enabled: bool) {
        self.metrics.set_enabled(enabled);
    }

    fn is_metrics_enabled(&self) -> bool {
        self.metrics.is_enabled()
    }
}
