//! Contact events (trigger enter/exit)
//!
//! Overlaps are sampled once per fixed tick and turned into explicit
//! [`ContactEvent`]s. The tick loop drains the queue before it updates any
//! actor state, so every actor is still mutated by a single writer.

use crate::layers::ColliderTag;
use bomber_core::EntityId;
use std::collections::{HashMap, HashSet, VecDeque};

/// Type of contact event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactEventType {
    /// Overlap started
    Started,
    /// Overlap ended
    Stopped,
}

/// A sensor started or stopped overlapping another collider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    /// The sensor (fire tile, pickup, bullet)
    pub sensor: EntityId,
    /// Tag of the sensor
    pub sensor_tag: ColliderTag,
    /// The entity it touched
    pub other: EntityId,
    /// Tag of the touched entity
    pub other_tag: ColliderTag,
    /// Event type
    pub event_type: ContactEventType,
}

impl ContactEvent {
    /// Check if this is a start event
    pub fn is_started(&self) -> bool {
        self.event_type == ContactEventType::Started
    }

    /// Check if this is a stop event
    pub fn is_stopped(&self) -> bool {
        self.event_type == ContactEventType::Stopped
    }
}

/// Tracks which colliders every sensor overlapped last tick and reports
/// the differences as enter/exit events.
#[derive(Debug, Default)]
pub struct ContactTracker {
    previous: HashMap<EntityId, HashMap<EntityId, ColliderTag>>,
}

impl ContactTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current overlaps of `sensor` and push enter/exit events
    pub fn update<I>(
        &mut self,
        sensor: EntityId,
        sensor_tag: ColliderTag,
        overlapping: I,
        queue: &mut EventQueue,
    ) where
        I: IntoIterator<Item = (EntityId, ColliderTag)>,
    {
        let current: HashMap<EntityId, ColliderTag> = overlapping
            .into_iter()
            .filter(|(other, _)| *other != sensor)
            .collect();
        let previous = self.previous.remove(&sensor).unwrap_or_default();

        let mut entered: Vec<_> = current
            .iter()
            .filter(|(other, _)| !previous.contains_key(other))
            .collect();
        entered.sort_by_key(|(other, _)| **other);
        for (&other, &other_tag) in entered {
            queue.push(ContactEvent {
                sensor,
                sensor_tag,
                other,
                other_tag,
                event_type: ContactEventType::Started,
            });
        }

        let mut exited: Vec<_> = previous
            .iter()
            .filter(|(other, _)| !current.contains_key(other))
            .collect();
        exited.sort_by_key(|(other, _)| **other);
        for (&other, &other_tag) in exited {
            queue.push(ContactEvent {
                sensor,
                sensor_tag,
                other,
                other_tag,
                event_type: ContactEventType::Stopped,
            });
        }

        self.previous.insert(sensor, current);
    }

    /// Forget a sensor that was removed or disabled
    pub fn forget(&mut self, sensor: EntityId) {
        self.previous.remove(&sensor);
    }

    /// Forget `other` in every sensor's overlap set (entity destroyed)
    pub fn forget_other(&mut self, other: EntityId) {
        for overlaps in self.previous.values_mut() {
            overlaps.remove(&other);
        }
    }

    /// Sensors currently tracked
    pub fn tracked(&self) -> HashSet<EntityId> {
        self.previous.keys().copied().collect()
    }
}

/// FIFO queue of contact events for the current tick
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<ContactEvent>,
}

impl EventQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an event
    pub fn push(&mut self, event: ContactEvent) {
        self.events.push_back(event);
    }

    /// Take every queued event in arrival order
    pub fn drain(&mut self) -> Vec<ContactEvent> {
        self.events.drain(..).collect()
    }

    /// Number of queued events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
