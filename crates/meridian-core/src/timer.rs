//! Timer queue for Meridian.
//!
//! Timers are one-shot and keyed by identity: scheduling a key that is
//! already pending replaces its deadline, and a negative delay cancels it.
//! Stale heap entries left behind by rescheduling are discarded lazily by
//! comparing generations.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::fmt::Debug;
use std::hash::Hash;
use std::time::{Duration, Instant};

use slotmap::new_key_type;

new_key_type! {
    /// A unique identifier for an application timer.
    pub struct TimerId;
}

/// Deadline bookkeeping for one pending key.
#[derive(Debug, Clone, Copy)]
struct Pending {
    fire_time: Instant,
    generation: u64,
}

/// An entry in the timer queue (min-heap by fire time, then schedule order).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry<K> {
    key: K,
    fire_time: Instant,
    generation: u64,
}

impl<K> PartialEq for TimerQueueEntry<K> {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time && self.generation == other.generation
    }
}

impl<K> Eq for TimerQueueEntry<K> {}

impl<K> PartialOrd for TimerQueueEntry<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for TimerQueueEntry<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other
            .fire_time
            .cmp(&self.fire_time)
            .then_with(|| other.generation.cmp(&self.generation))
    }
}

/// One-shot timers keyed by identity.
#[derive(Debug)]
pub struct TimerQueue<K> {
    pending: HashMap<K, Pending>,
    queue: BinaryHeap<TimerQueueEntry<K>>,
    next_generation: u64,
}

impl<K: Copy + Eq + Hash + Debug> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + Hash + Debug> TimerQueue<K> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
            queue: BinaryHeap::new(),
            next_generation: 0,
        }
    }

    /// Schedule `key` to fire `delay` after `now`, replacing any prior schedule.
    pub fn schedule(&mut self, key: K, delay: Duration, now: Instant) {
        let fire_time = now + delay;
        let generation = self.next_generation;
        self.next_generation += 1;

        self.pending.insert(key, Pending { fire_time, generation });
        self.queue.push(TimerQueueEntry {
            key,
            fire_time,
            generation,
        });
        tracing::trace!(
            target: "meridian_core::timer",
            ?key,
            delay_ms = delay.as_millis() as u64,
            "timer scheduled"
        );
    }

    /// Schedule with a millisecond delay; a negative delay cancels instead.
    ///
    /// Returns `true` if the key is pending afterwards.
    pub fn schedule_millis(&mut self, key: K, millis: i64, now: Instant) -> bool {
        if millis < 0 {
            self.cancel(key);
            return false;
        }
        self.schedule(key, Duration::from_millis(millis as u64), now);
        true
    }

    /// Cancel a pending key. Returns `true` if it was pending.
    pub fn cancel(&mut self, key: K) -> bool {
        let removed = self.pending.remove(&key).is_some();
        if removed {
            tracing::trace!(target: "meridian_core::timer", ?key, "timer cancelled");
        }
        removed
    }

    /// Whether `key` is pending.
    pub fn is_scheduled(&self, key: K) -> bool {
        self.pending.contains_key(&key)
    }

    /// Number of pending keys.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every pending key.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.queue.clear();
    }

    fn is_live(&self, entry: &TimerQueueEntry<K>) -> bool {
        self.pending
            .get(&entry.key)
            .is_some_and(|p| p.generation == entry.generation)
    }

    /// Get the duration from `now` until the next timer fires, if any.
    pub fn time_until_next(&mut self, now: Instant) -> Option<Duration> {
        // Clean up any stale entries from the front of the queue.
        while let Some(entry) = self.queue.peek() {
            if self.is_live(entry) {
                break;
            }
            self.queue.pop();
        }

        self.queue
            .peek()
            .map(|entry| entry.fire_time.saturating_duration_since(now))
    }

    /// Remove and return every key whose deadline is at or before `now`,
    /// earliest first.
    #[tracing::instrument(skip(self), target = "meridian_core::timer", level = "trace")]
    pub fn process_expired(&mut self, now: Instant) -> Vec<K> {
        let mut fired = Vec::new();

        while let Some(entry) = self.queue.peek() {
            if entry.fire_time > now {
                break;
            }
            let Some(entry) = self.queue.pop() else {
                break;
            };
            if !self.is_live(&entry) {
                continue;
            }
            self.pending.remove(&entry.key);
            fired.push(entry.key);
        }

        if !fired.is_empty() {
            tracing::trace!(target: "meridian_core::timer", count = fired.len(), "timers expired");
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Key {
        Hover,
        Blink,
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let start = Instant::now();
        let mut timers = TimerQueue::new();
        timers.schedule(Key::Hover, Duration::from_millis(20), start);
        timers.schedule(Key::Blink, Duration::from_millis(10), start);

        assert!(timers.process_expired(start).is_empty());
        let fired = timers.process_expired(start + Duration::from_millis(25));
        assert_eq!(fired, vec![Key::Blink, Key::Hover]);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_reschedule_replaces_prior_deadline() {
        let start = Instant::now();
        let mut timers = TimerQueue::new();
        timers.schedule(Key::Hover, Duration::from_millis(10), start);
        timers.schedule(Key::Hover, Duration::from_millis(50), start);
        assert_eq!(timers.len(), 1);

        assert!(timers.process_expired(start + Duration::from_millis(20)).is_empty());
        assert_eq!(
            timers.process_expired(start + Duration::from_millis(50)),
            vec![Key::Hover]
        );
    }

    #[test]
    fn test_negative_delay_cancels() {
        let start = Instant::now();
        let mut timers = TimerQueue::new();
        assert!(timers.schedule_millis(Key::Hover, 10, start));
        assert!(!timers.schedule_millis(Key::Hover, -1, start));
        assert!(!timers.is_scheduled(Key::Hover));
        assert!(timers.process_expired(start + Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn test_time_until_next_skips_stale_entries() {
        let start = Instant::now();
        let mut timers = TimerQueue::new();
        timers.schedule(Key::Hover, Duration::from_millis(5), start);
        timers.schedule(Key::Blink, Duration::from_millis(30), start);
        timers.cancel(Key::Hover);

        assert_eq!(
            timers.time_until_next(start),
            Some(Duration::from_millis(30))
        );
        assert_eq!(
            timers.time_until_next(start + Duration::from_millis(40)),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn test_equal_deadlines_fire_in_schedule_order() {
        let start = Instant::now();
        let mut timers = TimerQueue::new();
        timers.schedule(Key::Blink, Duration::ZERO, start);
        timers.schedule(Key::Hover, Duration::ZERO, start);
        assert_eq!(timers.process_expired(start), vec![Key::Blink, Key::Hover]);
    }
}
