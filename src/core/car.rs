//! Cars and the per-car service loop.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::{Line, PumpId, WaitOutcome, WakeSlot};

/// Index of a car; also its position in line when a run starts.
pub type CarId = usize;

/// What a car is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarState {
    /// In line, or head and waiting for a free pump.
    Waiting,
    /// Holding a pump.
    Occupying(PumpId),
}

/// One client of the station. Created at `start`, lives for the whole run.
#[derive(Debug)]
pub struct Car {
    id: CarId,
    wake: WakeSlot,
    state: Mutex<CarState>,
    fill_count: AtomicU64,
}

impl Car {
    /// Create a waiting car with a zero fill count.
    #[must_use]
    pub fn new(id: CarId) -> Self {
        Self {
            id,
            wake: WakeSlot::new(),
            state: Mutex::new(CarState::Waiting),
            fill_count: AtomicU64::new(0),
        }
    }

    /// The car's id.
    #[must_use]
    pub const fn id(&self) -> CarId {
        self.id
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> CarState {
        *self.state.lock()
    }

    /// Completed services. Stable only once the run is stopped.
    #[must_use]
    pub fn fill_count(&self) -> u64 {
        self.fill_count.load(Ordering::Acquire)
    }

    /// The car's private wake slot.
    #[must_use]
    pub const fn wake(&self) -> &WakeSlot {
        &self.wake
    }

    fn set_state(&self, state: CarState) {
        *self.state.lock() = state;
    }
}

/// Body of a car thread: queue, occupy, service, release until shutdown.
pub fn run_car(line: &Line, car: &Car) {
    let id = car.id();
    tracing::debug!(car = id, "car joined the line");

    while let Some(pump) = take_turn(line, car) {
        car.set_state(CarState::Occupying(pump));
        // Let the next car start on its turn while this one is serviced.
        line.advance_head(id, pump);

        line.service();
        car.fill_count.fetch_add(1, Ordering::AcqRel);

        car.set_state(CarState::Waiting);
        line.notify_released(pump, id);
    }

    line.car_finished(id);
    tracing::debug!(car = id, fills = car.fill_count(), "car left the line");
}

/// Wait to become head, then wait for a pump. `None` means shutdown.
fn take_turn(line: &Line, car: &Car) -> Option<PumpId> {
    if line.wait_turn(car) == WaitOutcome::Stopping {
        return None;
    }
    loop {
        match line.occupy_for_head(car.id()) {
            Ok(pump) => return Some(pump),
            Err(seen) => {
                tracing::debug!(car = car.id(), "all pumps busy, waiting for a release");
                if line.wait_for_release(seen) == WaitOutcome::Stopping {
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PumpPool;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_new_car_is_waiting() {
        let car = Car::new(7);
        assert_eq!(car.id(), 7);
        assert_eq!(car.state(), CarState::Waiting);
        assert_eq!(car.fill_count(), 0);
        assert!(!car.wake().is_pending());
    }

    #[test]
    fn test_single_car_loop_until_stop() {
        let line = Arc::new(Line::new(PumpPool::new(1), Duration::from_millis(1), None));
        let cars = line.reset(1).unwrap();
        let car = Arc::clone(&cars[0]);

        let handle = {
            let line = Arc::clone(&line);
            let car = Arc::clone(&car);
            thread::spawn(move || run_car(&line, &car))
        };
        line.wake_head();

        thread::sleep(Duration::from_millis(30));
        line.request_stop();
        handle.join().unwrap();

        assert_eq!(line.finished_count(), 1);
        assert!(car.fill_count() > 0);
        assert_eq!(car.state(), CarState::Waiting);
        assert_eq!(line.pool().service_counts(), vec![car.fill_count()]);
    }
}
