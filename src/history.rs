//! Fixed-capacity history of snapshots.
//!

use std::time::Duration;

use crate::snapshot::Snapshot;

/// Ring buffer of the most recent snapshots, oldest overwritten first.
///
/// The buffer is seeded with one snapshot on construction so that
/// [`RingHistory::window_endpoints`] always has something to return.
#[derive(Debug, Clone)]
pub struct RingHistory {
    slots: Vec<Snapshot>,
    capacity: usize,
    cursor: usize,
    count: usize,
}

impl RingHistory {
    pub fn new(capacity: usize, seed: Snapshot) -> Self {
        assert!(capacity > 0, "history capacity must be at least 1");
        let mut slots = Vec::with_capacity(capacity);
        slots.push(seed);
        Self {
            slots,
            capacity,
            cursor: 1 % capacity,
            count: 1,
        }
    }

    /// Number of slots needed so that any window up to `collection_window`
    /// has both endpoints retained.
    pub fn capacity_for(collection_window: Duration, sampling_interval: Duration) -> usize {
        samples_for(collection_window, sampling_interval)
    }

    pub fn append(&mut self, snapshot: Snapshot) {
        if self.slots.len() < self.capacity {
            self.slots.push(snapshot);
        } else {
            self.slots[self.cursor] = snapshot;
        }
        self.cursor = (self.cursor + 1) % self.capacity;
        self.count = (self.count + 1).min(self.capacity);
    }

    /// Oldest and newest snapshot among the last `samples_to_read` entries.
    ///
    /// While the buffer is still filling, the oldest retained snapshot is
    /// returned in place of entries that were never written.
    ///
    /// # Panics
    ///
    /// If `samples_to_read` is zero or larger than the capacity. Callers size
    /// their requests from the same settings as the buffer.
    pub fn window_endpoints(&self, samples_to_read: usize) -> (Snapshot, Snapshot) {
        assert!(
            samples_to_read > 0 && samples_to_read <= self.capacity,
            "requested {} samples from a history of capacity {}",
            samples_to_read,
            self.capacity
        );
        let span = samples_to_read.min(self.count);
        let oldest = (self.cursor + self.capacity - span) % self.capacity;
        (self.slots[oldest], self.newest())
    }

    pub fn newest(&self) -> Snapshot {
        let index = (self.cursor + self.capacity - 1) % self.capacity;
        self.slots[index]
    }

    /// Number of snapshots currently retained, seed included.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// `floor(window / interval) + 1`: the current sample plus one per interval.
pub(crate) fn samples_for(window: Duration, interval: Duration) -> usize {
    let whole = window.as_nanos() / interval.as_nanos().max(1);
    usize::try_from(whole).unwrap_or(usize::MAX - 1) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(n: u64) -> Snapshot {
        Snapshot::new(
            Duration::from_secs(n),
            Duration::ZERO,
            Duration::from_millis(n * 10),
            n,
        )
    }

    #[test]
    fn capacity_covers_window_plus_current() {
        assert_eq!(
            RingHistory::capacity_for(Duration::from_secs(10), Duration::from_secs(1)),
            11
        );
        assert_eq!(
            RingHistory::capacity_for(Duration::from_millis(2500), Duration::from_secs(1)),
            3
        );
        assert_eq!(
            RingHistory::capacity_for(Duration::from_secs(1), Duration::from_secs(1)),
            2
        );
    }

    #[test]
    fn seeded_history_is_never_empty() {
        let history = RingHistory::new(4, snap(0));
        assert_eq!(history.len(), 1);
        assert!(!history.is_empty());
        assert_eq!(history.window_endpoints(4), (snap(0), snap(0)));
        assert_eq!(history.window_endpoints(1), (snap(0), snap(0)));
    }

    #[test]
    fn partial_fill_clamps_to_oldest() {
        let mut history = RingHistory::new(11, snap(0));
        for n in 1..=3 {
            history.append(snap(n));
        }
        assert_eq!(history.len(), 4);
        assert_eq!(history.window_endpoints(11), (snap(0), snap(3)));
        assert_eq!(history.window_endpoints(2), (snap(2), snap(3)));
    }

    #[test]
    fn full_window_returns_first_and_last() {
        let capacity = 5;
        let mut history = RingHistory::new(capacity, snap(0));
        for n in 1..capacity as u64 {
            history.append(snap(n));
        }
        assert_eq!(history.len(), capacity);
        assert_eq!(history.window_endpoints(capacity), (snap(0), snap(4)));
    }

    #[test]
    fn wraparound_evicts_exactly_the_oldest() {
        let capacity = 5;
        for extra in 1..=12u64 {
            let mut history = RingHistory::new(capacity, snap(0));
            let last = capacity as u64 - 1 + extra;
            for n in 1..=last {
                history.append(snap(n));
            }
            let (oldest, newest) = history.window_endpoints(capacity);
            assert_eq!(
                oldest,
                snap(extra),
                "after {} extra appends the oldest retained should be {}",
                extra,
                extra
            );
            assert_eq!(newest, snap(last));
            assert_eq!(history.len(), capacity);
        }
    }

    #[test]
    fn single_slot_history_tracks_latest() {
        let mut history = RingHistory::new(1, snap(0));
        history.append(snap(1));
        history.append(snap(2));
        assert_eq!(history.window_endpoints(1), (snap(2), snap(2)));
    }

    #[test]
    #[should_panic(expected = "requested 6 samples")]
    fn oversized_request_panics() {
        let history = RingHistory::new(5, snap(0));
        history.window_endpoints(6);
    }

    #[test]
    #[should_panic]
    fn zero_sample_request_panics() {
        let history = RingHistory::new(5, snap(0));
        history.window_endpoints(0);
    }
}
