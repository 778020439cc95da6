//! Fixed pool of pumps with synchronized allocation.
//!
//! One `parking_lot::Mutex` guards every pump, so a scan and the occupy that
//! follows it are a single critical section and two concurrent scans can never
//! claim the same free pump. Releases bump an epoch under the same lock; a car
//! that found the pool saturated parks on the `released` condition until the
//! epoch moves past the value it observed, which makes a release that lands
//! between the failed scan and the park impossible to miss.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::core::error::fatal;
use crate::core::{CarId, EventSink, ProtocolViolation, Pump, PumpId, StationEvent, WaitOutcome};

/// Every pump was busy at the instant of the scan.
///
/// Carries the release epoch seen by the scan; hand it back to
/// [`PumpPool::wait_for_release`] to wait for the next release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Saturated {
    epoch: u64,
}

struct PoolState {
    pumps: Vec<Pump>,
    occupied: usize,
    peak: usize,
    epoch: u64,
}

/// A fixed array of pumps.
pub struct PumpPool {
    state: Mutex<PoolState>,
    released: Condvar,
    journal: Option<Arc<dyn EventSink>>,
}

impl std::fmt::Debug for PumpPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("PumpPool")
            .field("pumps", &state.pumps)
            .field("occupied", &state.occupied)
            .field("peak", &state.peak)
            .field("epoch", &state.epoch)
            .finish_non_exhaustive()
    }
}

impl PumpPool {
    /// Create a pool of `size` free pumps.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            state: Mutex::new(PoolState {
                pumps: vec![Pump::new(); size],
                occupied: 0,
                peak: 0,
                epoch: 0,
            }),
            released: Condvar::new(),
            journal: None,
        }
    }

    /// Attach an event sink.
    #[must_use]
    pub fn with_journal(mut self, journal: Arc<dyn EventSink>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Number of pumps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().pumps.len()
    }

    /// Whether the pool has no pumps at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Occupy the lowest-numbered free pump for `car`.
    ///
    /// # Errors
    ///
    /// Returns [`Saturated`] when every pump is busy. That is an expected,
    /// transient condition rather than a failure.
    pub fn occupy_any(&self, car: CarId) -> Result<PumpId, Saturated> {
        let mut state = self.state.lock();
        self.record(StationEvent::Attempted { car });

        if let Some(held) = state.pumps.iter().position(|p| p.occupant() == Some(car)) {
            let pump = state.pumps.iter().position(|p| !p.is_occupied()).unwrap_or(held);
            fatal(ProtocolViolation::DoubleOccupancy { car, held, pump });
        }

        // A failed occupy just moves the scan on to the next pump.
        match state.pumps.iter_mut().position(|p| p.occupy(car)) {
            Some(pump) => {
                state.occupied += 1;
                state.peak = state.peak.max(state.occupied);
                self.record(StationEvent::Occupied { car, pump });
                tracing::trace!(car, pump, "pump occupied");
                Ok(pump)
            }
            None => {
                self.record(StationEvent::Saturated { car });
                tracing::trace!(car, "all pumps busy");
                Err(Saturated { epoch: state.epoch })
            }
        }
    }

    /// Release `pump` on behalf of `car`.
    ///
    /// Does not wake waiters; pair with [`PumpPool::notify_waiter`].
    ///
    /// # Panics
    ///
    /// Aborts when `car` does not hold `pump`.
    pub fn release(&self, pump: PumpId, car: CarId) {
        let mut state = self.state.lock();
        let size = state.pumps.len();
        let Some(slot) = state.pumps.get_mut(pump) else {
            fatal(ProtocolViolation::UnknownPump { pump, size });
        };
        if let Err(violation) = slot.release(pump, car) {
            fatal(violation);
        }
        state.occupied -= 1;
        state.epoch = state.epoch.wrapping_add(1);
        self.record(StationEvent::Released { car, pump });
        tracing::trace!(car, pump, "pump released");
    }

    /// Wake one car parked in [`PumpPool::wait_for_release`].
    ///
    /// Only the head car ever waits here and one release frees one pump, so a
    /// single wake is enough.
    pub fn notify_waiter(&self) {
        self.released.notify_one();
    }

    /// Block until some pump is released after `seen` was observed, or until
    /// `stopping` is set.
    pub fn wait_for_release(&self, seen: Saturated, stopping: &AtomicBool) -> WaitOutcome {
        let mut state = self.state.lock();
        loop {
            if stopping.load(Ordering::Acquire) {
                return WaitOutcome::Stopping;
            }
            if state.epoch != seen.epoch {
                return WaitOutcome::Woken;
            }
            self.released.wait(&mut state);
        }
    }

    /// Wake every parked car so it re-reads the shutdown flag.
    pub fn interrupt(&self) {
        let _guard = self.state.lock();
        self.released.notify_all();
    }

    /// The car holding `pump`, if any.
    #[must_use]
    pub fn occupant(&self, pump: PumpId) -> Option<CarId> {
        self.state.lock().pumps.get(pump).and_then(Pump::occupant)
    }

    /// Number of pumps currently occupied.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.state.lock().occupied
    }

    /// Highest number of simultaneously occupied pumps since the last clear.
    #[must_use]
    pub fn peak_occupancy(&self) -> usize {
        self.state.lock().peak
    }

    /// Per-pump service counts.
    #[must_use]
    pub fn service_counts(&self) -> Vec<u64> {
        self.state.lock().pumps.iter().map(Pump::service_count).collect()
    }

    /// Free every pump and zero all counters.
    ///
    /// Only valid while no car is running.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.pumps.iter_mut().for_each(Pump::reset);
        state.occupied = 0;
        state.peak = 0;
        state.epoch = 0;
    }

    fn record(&self, event: StationEvent) {
        if let Some(journal) = &self.journal {
            journal.record(event);
        }
    }
}
