//! Timer driver for managing sleep/timeout registration.
//!
//! The timer driver pairs a [`TimeSource`] with a deadline-ordered queue of
//! waker registrations. Futures register a deadline and a waker; the event
//! loop calls `process_timers` to fire everything that has come due.

use crate::types::Time;
use std::cmp::Ordering as CmpOrdering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::task::Waker;

use super::clock::{TimeSource, VirtualClock};

/// Opaque handle for a scheduled timer.
///
/// Handles are generation-stamped: cancelling or updating a timer invalidates
/// the old handle, so a stale handle can never cancel a newer registration
/// that happens to reuse storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    id: u64,
    generation: u64,
}

impl TimerHandle {
    /// Returns the timer identifier.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Returns the generation associated with this handle.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Error returned when the driver's pending-timer capacity is exhausted.
#[derive(Debug, Clone, thiserror::Error)]
#[error("timer queue at capacity ({capacity} pending timers)")]
pub struct TimerAtCapacity {
    /// The configured capacity.
    pub capacity: usize,
}

#[derive(Debug)]
struct QueueEntry {
    deadline: Time,
    id: u64,
    generation: u64,
    waker: Waker,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.id == other.id
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        // Reverse for min-heap (earliest deadline first).
        // Ties fire in registration order.
        other
            .deadline
            .cmp(&self.deadline)
            .then(other.id.cmp(&self.id))
    }
}

/// Deadline-ordered queue with lazy removal.
///
/// Cancellation only deletes the id from `active`; the heap entry stays put
/// and is discarded when it reaches the front. This keeps cancel O(1).
#[derive(Debug, Default)]
struct TimerQueue {
    heap: BinaryHeap<QueueEntry>,
    /// Live registrations: id to current generation.
    active: HashMap<u64, u64>,
}

impl TimerQueue {
    fn register(&mut self, id: u64, generation: u64, deadline: Time, waker: Waker) {
        self.active.insert(id, generation);
        self.heap.push(QueueEntry {
            deadline,
            id,
            generation,
            waker,
        });
    }

    fn cancel(&mut self, handle: &TimerHandle) -> bool {
        match self.active.get(&handle.id()) {
            Some(&generation) if generation == handle.generation() => {
                self.active.remove(&handle.id());
                true
            }
            _ => false,
        }
    }

    fn next_deadline(&mut self) -> Option<Time> {
        while let Some(entry) = self.heap.peek() {
            if self.active.get(&entry.id) == Some(&entry.generation) {
                return Some(entry.deadline);
            }
            // Cancelled entry still sitting in the heap; drop it now.
            self.heap.pop();
        }
        None
    }

    fn collect_expired(&mut self, now: Time) -> Vec<Waker> {
        let mut expired = Vec::new();
        while let Some(front) = self.heap.peek() {
            if front.deadline > now {
                break;
            }
            let Some(entry) = self.heap.pop() else { break };
            if self.active.get(&entry.id) == Some(&entry.generation) {
                self.active.remove(&entry.id);
                expired.push(entry.waker);
            }
        }
        expired
    }

    fn len(&self) -> usize {
        self.active.len()
    }

    fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    fn clear(&mut self) {
        self.heap.clear();
        self.active.clear();
    }
}

/// Timer driver that manages timer registrations and fires them.
///
/// The driver maintains a deadline-ordered queue of registrations. When
/// `process_timers` is called, all expired timers have their wakers called.
///
/// # Thread Safety
///
/// The driver is thread-safe and can be shared across tasks.
///
/// # Example
///
/// ```
/// use tempo::time::{TimerDriver, VirtualClock};
/// use tempo::types::Time;
/// use std::sync::Arc;
///
/// let clock = Arc::new(VirtualClock::new());
/// let driver = TimerDriver::with_clock(clock.clone());
///
/// assert!(driver.is_empty());
/// clock.advance(1_000_000_000);
/// assert_eq!(driver.now(), Time::from_secs(1));
/// ```
#[derive(Debug)]
pub struct TimerDriver<T: TimeSource = VirtualClock> {
    /// The time source.
    clock: Arc<T>,
    /// Pending timers (protected by mutex for thread safety).
    queue: Mutex<TimerQueue>,
    /// Next timer ID.
    next_id: AtomicU64,
    /// Next handle generation.
    next_generation: AtomicU64,
    /// Maximum number of pending timers.
    capacity: usize,
}

impl<T: TimeSource> TimerDriver<T> {
    /// Creates a new timer driver with the given time source.
    #[must_use]
    pub fn with_clock(clock: Arc<T>) -> Self {
        Self::with_capacity(clock, usize::MAX)
    }

    /// Creates a new timer driver that accepts at most `capacity` pending
    /// timers at a time.
    #[must_use]
    pub fn with_capacity(clock: Arc<T>, capacity: usize) -> Self {
        Self {
            clock,
            queue: Mutex::new(TimerQueue::default()),
            next_id: AtomicU64::new(0),
            next_generation: AtomicU64::new(0),
            capacity,
        }
    }

    /// Returns the current time from the underlying clock.
    #[must_use]
    pub fn now(&self) -> Time {
        self.clock.now()
    }

    /// Returns a reference to the underlying time source.
    #[must_use]
    pub fn clock(&self) -> &Arc<T> {
        &self.clock
    }

    /// Registers a timer to fire at the given deadline.
    ///
    /// Returns a handle that can be used to cancel or update the timer.
    /// The waker will be called when `process_timers` is called
    /// and the deadline has passed.
    ///
    /// # Panics
    ///
    /// Panics if the driver is at capacity. Use [`try_register`](Self::try_register)
    /// to handle that case without panicking.
    pub fn register(&self, deadline: Time, waker: Waker) -> TimerHandle {
        match self.try_register(deadline, waker) {
            Ok(handle) => handle,
            Err(err) => panic!("{err}"),
        }
    }

    /// Registers a timer to fire at the given deadline, failing if the
    /// driver's capacity is exhausted.
    pub fn try_register(
        &self,
        deadline: Time,
        waker: Waker,
    ) -> Result<TimerHandle, TimerAtCapacity> {
        let mut queue = self.queue.lock().unwrap();
        if queue.len() >= self.capacity {
            return Err(TimerAtCapacity {
                capacity: self.capacity,
            });
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        queue.register(id, generation, deadline, waker);
        Ok(TimerHandle { id, generation })
    }

    /// Updates an existing timer registration with a new deadline and waker.
    ///
    /// The old handle is invalidated. This doesn't actually remove the old
    /// heap entry (to avoid O(n) removal); stale entries are cleaned up
    /// lazily as they surface.
    ///
    /// # Panics
    ///
    /// Panics if the driver is at capacity.
    pub fn update(&self, handle: &TimerHandle, deadline: Time, waker: Waker) -> TimerHandle {
        let mut queue = self.queue.lock().unwrap();
        queue.cancel(handle);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        assert!(
            queue.len() < self.capacity,
            "timer queue at capacity ({} pending timers)",
            self.capacity
        );
        queue.register(id, generation, deadline, waker);
        TimerHandle { id, generation }
    }

    /// Cancels an existing timer registration.
    ///
    /// Returns true if the timer was active and is now cancelled. Once this
    /// returns, the timer's waker is guaranteed never to be called.
    pub fn cancel(&self, handle: &TimerHandle) -> bool {
        self.queue.lock().unwrap().cancel(handle)
    }

    /// Returns the next deadline that will fire, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Time> {
        self.queue.lock().unwrap().next_deadline()
    }

    /// Processes all expired timers, calling their wakers.
    ///
    /// Returns the number of timers fired.
    pub fn process_timers(&self) -> usize {
        self.process_timers_at(self.clock.now())
    }

    /// Processes all timers expired as of `now`, calling their wakers.
    ///
    /// Returns the number of timers fired.
    pub fn process_timers_at(&self, now: Time) -> usize {
        // Collect expired entries while holding the lock, then release it
        // before waking to prevent potential deadlocks if wakers try to
        // re-enter the timer driver.
        let expired_wakers = self.collect_expired(now);
        let fired = expired_wakers.len();

        // Wake them outside the lock
        for waker in expired_wakers {
            waker.wake();
        }

        fired
    }

    /// Helper to collect expired wakers while holding the lock.
    #[allow(clippy::significant_drop_tightening)]
    fn collect_expired(&self, now: Time) -> Vec<Waker> {
        self.queue.lock().unwrap().collect_expired(now)
    }

    /// Returns the number of pending timers.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    /// Returns true if there are no pending timers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.lock().unwrap().is_empty()
    }

    /// Clears all pending timers without firing them.
    pub fn clear(&self) {
        self.queue.lock().unwrap().clear();
    }
}

impl TimerDriver<VirtualClock> {
    /// Creates a new timer driver with a virtual clock.
    ///
    /// This is the default for testing.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(VirtualClock::new()))
    }
}

impl Default for TimerDriver<VirtualClock> {
    fn default() -> Self {
        Self::new()
    }
}
