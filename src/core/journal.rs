//! Event journal for observing the line protocol.
//!
//! Pool events (`Attempted`, `Occupied`, `Saturated`, `Released`) are recorded
//! while the pool lock is held and head events while the line lock is held, so
//! within each domain the journal order is the order things actually happened.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::{CarId, PumpId};

/// Something that happened at the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StationEvent {
    /// The head car scanned the pool.
    Attempted {
        /// Car scanning.
        car: CarId,
    },
    /// A car took a pump.
    Occupied {
        /// Car taking the pump.
        car: CarId,
        /// Pump taken.
        pump: PumpId,
    },
    /// The scan found every pump busy.
    Saturated {
        /// Car that will wait.
        car: CarId,
    },
    /// The head moved on.
    HeadAdvanced {
        /// Car that was head.
        car: CarId,
        /// Car that is head now.
        next: CarId,
    },
    /// A car gave its pump back.
    Released {
        /// Car releasing.
        car: CarId,
        /// Pump released.
        pump: PumpId,
    },
}

/// Receiver for station events.
///
/// Called with station locks held: implementations must be quick and must not
/// call back into the coordinator.
pub trait EventSink: Send + Sync {
    /// Record an event.
    fn record(&self, event: StationEvent);
}

/// Bounded in-memory journal for testing and diagnostics.
#[derive(Debug)]
pub struct InMemoryJournal {
    events: Mutex<VecDeque<StationEvent>>,
    max_events: usize,
}

impl InMemoryJournal {
    /// Create a journal keeping at most `max_events` of the newest events.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(max_events.min(4096))),
            max_events,
        }
    }

    /// Snapshot of stored events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<StationEvent> {
        self.events.lock().iter().copied().collect()
    }

    /// Number of stored events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Drop every stored event.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for InMemoryJournal {
    fn record(&self, event: StationEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}
