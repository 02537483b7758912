//! Simulation events and the time-ordered event queue.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use vne_network::{RequestId, VirtualNetworkRequest};

pub type EventId = u64;

/// Order of an arrival and a departure scheduled at the same time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreak {
    /// Resources of departing requests are released before new requests are embedded.
    #[default]
    DeparturesFirst,
    ArrivalsFirst,
}

impl TieBreak {
    fn priority(&self, kind: &EventKind) -> u8 {
        match (self, kind) {
            (TieBreak::DeparturesFirst, EventKind::Departure(_)) => 0,
            (TieBreak::DeparturesFirst, EventKind::Arrival(_)) => 1,
            (TieBreak::ArrivalsFirst, EventKind::Arrival(_)) => 0,
            (TieBreak::ArrivalsFirst, EventKind::Departure(_)) => 1,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub enum EventKind {
    Arrival(Box<VirtualNetworkRequest>),
    Departure(RequestId),
}

impl EventKind {
    pub fn request_id(&self) -> RequestId {
        match self {
            EventKind::Arrival(request) => request.id,
            EventKind::Departure(id) => *id,
        }
    }
}

/// Event scheduled by the simulation.
#[derive(Clone, Debug, Serialize)]
pub struct SimulationEvent {
    pub id: EventId,
    pub time: f64,
    #[serde(skip)]
    priority: u8,
    pub kind: EventKind,
}

impl Eq for SimulationEvent {}

impl PartialEq for SimulationEvent {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Ord for SimulationEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.priority.cmp(&self.priority))
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for SimulationEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pending events ordered by time, then by the tie-break policy, then by insertion order.
pub struct EventQueue {
    events: BinaryHeap<SimulationEvent>,
    event_count: EventId,
    tie_break: TieBreak,
}

impl EventQueue {
    pub fn new(tie_break: TieBreak) -> Self {
        Self {
            events: BinaryHeap::new(),
            event_count: 0,
            tie_break,
        }
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Schedules an event and returns its id.
    pub fn push(&mut self, time: f64, kind: EventKind) -> EventId {
        let id = self.event_count;
        self.event_count += 1;
        let priority = self.tie_break.priority(&kind);
        self.events.push(SimulationEvent {
            id,
            time,
            priority,
            kind,
        });
        id
    }

    pub fn pop(&mut self) -> Option<SimulationEvent> {
        self.events.pop()
    }

    /// Time of the next event.
    pub fn next_time(&self) -> Option<f64> {
        self.events.peek().map(|event| event.time)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrival(id: RequestId, time: f64) -> EventKind {
        EventKind::Arrival(Box::new(VirtualNetworkRequest::new(id, time, 10.)))
    }

    #[test]
    fn test_time_order() {
        let mut queue = EventQueue::new(TieBreak::default());
        queue.push(5., arrival(1, 5.));
        queue.push(1., arrival(2, 1.));
        queue.push(3., EventKind::Departure(3));
        let ids: Vec<_> = std::iter::from_fn(|| queue.pop()).map(|e| e.kind.request_id()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_tie_break() {
        for (tie_break, expected) in [
            (TieBreak::DeparturesFirst, vec![2, 1, 3]),
            (TieBreak::ArrivalsFirst, vec![1, 3, 2]),
        ] {
            let mut queue = EventQueue::new(tie_break);
            queue.push(10., arrival(1, 10.));
            queue.push(10., EventKind::Departure(2));
            queue.push(10., arrival(3, 10.));
            let ids: Vec<_> = std::iter::from_fn(|| queue.pop()).map(|e| e.kind.request_id()).collect();
            assert_eq!(ids, expected);
        }
    }
}
