//! Cancellable timer queue
//!
//! Timed effects (stun flash, invulnerability flicker, fire expiry, delayed
//! destruction, staggered spawns) are scheduled as entries keyed by an
//! absolute expiry time and an owning entity. The queue is polled once per
//! tick. Cancelling by owner is how an actor stops all of its pending
//! effects when a new hit arrives.

use crate::id::EntityId;
use serde::{Deserialize, Serialize};

/// Identifier of a scheduled timer, usable as a cancellation token
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

impl TimerId {
    /// Raw value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct TimerEntry<T> {
    id: TimerId,
    owner: EntityId,
    expires_at: f64,
    payload: T,
}

/// A timer whose expiry time has been reached
#[derive(Debug, Clone, PartialEq)]
pub struct ExpiredTimer<T> {
    /// Timer id
    pub id: TimerId,
    /// Entity that owned the timer
    pub owner: EntityId,
    /// Scheduled expiry time
    pub expires_at: f64,
    /// What to do now that it fired
    pub payload: T,
}

/// Queue of pending timers
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    entries: Vec<TimerEntry<T>>,
    next_id: u64,
}

impl<T> TimerQueue<T> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Schedule `payload` to fire at absolute time `expires_at`
    pub fn schedule(&mut self, owner: EntityId, expires_at: f64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(TimerEntry {
            id,
            owner,
            expires_at,
            payload,
        });
        id
    }

    /// Cancel a single timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Cancel every pending timer owned by `owner`
    pub fn cancel_owner(&mut self, owner: EntityId) -> usize {
        self.cancel_owner_where(owner, |_| true)
    }

    /// Cancel the pending timers of `owner` whose payload matches `predicate`
    pub fn cancel_owner_where<F>(&mut self, owner: EntityId, predicate: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        let before = self.entries.len();
        self.entries
            .retain(|e| !(e.owner == owner && predicate(&e.payload)));
        before - self.entries.len()
    }

    /// Remove and return every timer with `expires_at <= now`, ordered by
    /// expiry time and then by scheduling order.
    pub fn poll(&mut self, now: f64) -> Vec<ExpiredTimer<T>> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].expires_at <= now {
                let entry = self.entries.swap_remove(i);
                due.push(ExpiredTimer {
                    id: entry.id,
                    owner: entry.owner,
                    expires_at: entry.expires_at,
                    payload: entry.payload,
                });
            } else {
                i += 1;
            }
        }

        due.sort_by(|a, b| {
            a.expires_at
                .partial_cmp(&b.expires_at)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        due
    }

    /// Earliest pending expiry time
    pub fn next_expiry(&self) -> Option<f64> {
        self.entries
            .iter()
            .map(|e| e.expires_at)
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Number of pending timers owned by `owner`
    pub fn pending_for(&self, owner: EntityId) -> usize {
        self.entries.iter().filter(|e| e.owner == owner).count()
    }

    /// Iterate over the payloads pending for `owner`
    pub fn payloads_for(&self, owner: EntityId) -> impl Iterator<Item = &T> {
        self.entries
            .iter()
            .filter(move |e| e.owner == owner)
            .map(|e| &e.payload)
    }

    /// Number of pending timers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no timer is pending
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> EntityId {
        EntityId::from_raw(raw)
    }

    #[test]
    fn test_poll_orders_by_expiry() {
        let mut timers = TimerQueue::new();
        timers.schedule(id(1), 2.0, "late");
        timers.schedule(id(1), 1.0, "early");
        timers.schedule(id(2), 5.0, "future");

        let due = timers.poll(2.0);
        let payloads: Vec<_> = due.iter().map(|t| t.payload).collect();
        assert_eq!(payloads, vec!["early", "late"]);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.next_expiry(), Some(5.0));
    }

    #[test]
    fn test_same_expiry_keeps_schedule_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(id(1), 1.0, 'a');
        timers.schedule(id(1), 1.0, 'b');
        timers.schedule(id(1), 1.0, 'c');

        let payloads: Vec<_> = timers.poll(1.0).into_iter().map(|t| t.payload).collect();
        assert_eq!(payloads, vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_cancel() {
        let mut timers = TimerQueue::new();
        let t = timers.schedule(id(1), 1.0, ());
        assert!(timers.cancel(t));
        assert!(!timers.cancel(t));
        assert!(timers.poll(10.0).is_empty());
    }

    #[test]
    fn test_cancel_owner() {
        let mut timers = TimerQueue::new();
        timers.schedule(id(1), 1.0, 1);
        timers.schedule(id(1), 2.0, 2);
        timers.schedule(id(2), 1.0, 3);

        assert_eq!(timers.cancel_owner(id(1)), 2);
        assert_eq!(timers.pending_for(id(1)), 0);
        assert_eq!(timers.pending_for(id(2)), 1);
    }

    #[test]
    fn test_cancel_owner_where() {
        let mut timers = TimerQueue::new();
        timers.schedule(id(1), 1.0, "flash");
        timers.schedule(id(1), 1.0, "destroy");

        assert_eq!(timers.cancel_owner_where(id(1), |p| *p == "flash"), 1);
        let left: Vec<_> = timers.payloads_for(id(1)).copied().collect();
        assert_eq!(left, vec!["destroy"]);
    }
}
