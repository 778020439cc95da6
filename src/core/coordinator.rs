//! Strict-FIFO line coordination over a fixed pump pool.
//!
//! [`Line`] is the state every car thread shares: the pump pool, the cars in
//! arrival order, the head index and the shutdown flag. Only the head car may
//! scan the pool. As soon as its occupy succeeds it advances the head and wakes
//! the next car, before its own service begins, so the line keeps moving while
//! pumps are busy.
//!
//! Lock order is line state, then pool, then a car's wake slot. The pool lock
//! is never held while taking the line lock.
//!
//! [`Coordinator`] owns a `Line` and the car threads, and exposes the
//! start/stop/results lifecycle.

use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use uuid::Uuid;

use crate::config::StationConfig;
use crate::core::car::run_car;
use crate::core::error::fatal;
use crate::core::{
    Car, CarId, CarState, EventSink, ProtocolViolation, PumpId, PumpPool, RunReport, Saturated,
    StationError, StationEvent, WaitOutcome,
};

struct LineState {
    head: usize,
    cars: Vec<Arc<Car>>,
}

/// Shared protocol state for one station.
pub struct Line {
    pool: PumpPool,
    state: Mutex<LineState>,
    stopping: AtomicBool,
    finished: AtomicUsize,
    service_time: Duration,
    journal: Option<Arc<dyn EventSink>>,
}

impl std::fmt::Debug for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Line")
            .field("pool", &self.pool)
            .field("head", &self.state.lock().head)
            .field("stopping", &self.stopping.load(Ordering::Relaxed))
            .field("finished", &self.finished.load(Ordering::Relaxed))
            .field("service_time", &self.service_time)
            .finish_non_exhaustive()
    }
}

impl Line {
    /// Create an empty line in front of `pool`.
    #[must_use]
    pub fn new(
        pool: PumpPool,
        service_time: Duration,
        journal: Option<Arc<dyn EventSink>>,
    ) -> Self {
        Self {
            pool,
            state: Mutex::new(LineState {
                head: 0,
                cars: Vec::new(),
            }),
            stopping: AtomicBool::new(false),
            finished: AtomicUsize::new(0),
            service_time,
            journal,
        }
    }

    /// Line up `count` fresh cars, point the head at car 0 and clear the pool.
    ///
    /// Only valid while no car thread is running. Fresh cars carry no pending
    /// wake, so nothing from a previous run leaks into this one.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::EmptyLine`] when `count` is zero; the line is
    /// left untouched.
    pub fn reset(&self, count: usize) -> Result<Vec<Arc<Car>>, StationError> {
        if count == 0 {
            return Err(StationError::EmptyLine);
        }
        let mut state = self.state.lock();
        state.head = 0;
        state.cars = (0..count).map(|id| Arc::new(Car::new(id))).collect();
        self.stopping.store(false, Ordering::Release);
        self.finished.store(0, Ordering::Release);
        self.pool.clear();
        Ok(state.cars.clone())
    }

    /// Wake whichever car is head.
    pub fn wake_head(&self) {
        let state = self.state.lock();
        if let Some(car) = state.cars.get(state.head) {
            car.wake().notify();
        }
    }

    /// Block `car` until it becomes head or shutdown is requested.
    pub fn wait_turn(&self, car: &Car) -> WaitOutcome {
        car.wake().wait(&self.stopping)
    }

    /// Scan the pool on behalf of the head car.
    ///
    /// # Errors
    ///
    /// Returns [`Saturated`] when every pump is busy; the caller then waits
    /// with [`Line::wait_for_release`] and tries again.
    ///
    /// # Panics
    ///
    /// Aborts when `car` is not the head.
    pub fn occupy_for_head(&self, car: CarId) -> Result<PumpId, Saturated> {
        self.expect_head(car);
        self.pool.occupy_any(car)
    }

    /// Park until a pump is released after `seen`, or shutdown is requested.
    pub fn wait_for_release(&self, seen: Saturated) -> WaitOutcome {
        self.pool.wait_for_release(seen, &self.stopping)
    }

    /// Move the head past `car`, which has just occupied `pump`, and wake the
    /// next car.
    ///
    /// # Panics
    ///
    /// Aborts when `car` is not the head or does not hold `pump`.
    pub fn advance_head(&self, car: CarId, pump: PumpId) {
        let mut state = self.state.lock();
        if state.head != car {
            fatal(ProtocolViolation::HeadMismatch {
                expected: state.head,
                actual: car,
            });
        }
        if self.pool.occupant(pump) != Some(car) {
            fatal(ProtocolViolation::NotOccupant { pump, car });
        }

        let next = (state.head + 1) % state.cars.len();
        state.head = next;
        if let Some(journal) = &self.journal {
            journal.record(StationEvent::HeadAdvanced { car, next });
        }
        tracing::trace!(car, next, "head advanced");
        state.cars[next].wake().notify();
    }

    /// Give `pump` back and wake a car waiting for a free pump.
    ///
    /// # Panics
    ///
    /// Aborts when `car` does not hold `pump`.
    pub fn notify_released(&self, pump: PumpId, car: CarId) {
        self.pool.release(pump, car);
        self.pool.notify_waiter();
    }

    /// Perform the synthetic service.
    pub fn service(&self) {
        if !self.service_time.is_zero() {
            thread::sleep(self.service_time);
        }
    }

    /// Record that a car thread observed shutdown and left its loop.
    pub fn car_finished(&self, car: CarId) {
        let finished = self.finished.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::trace!(car, finished, "car finished");
    }

    /// Set the shutdown flag and wake every waiter so it sees it.
    pub fn request_stop(&self) {
        let state = self.state.lock();
        self.stopping.store(true, Ordering::Release);
        for car in &state.cars {
            car.wake().interrupt();
        }
        drop(state);
        self.pool.interrupt();
    }

    /// Whether shutdown has been requested.
    #[must_use]
    pub fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::Acquire)
    }

    /// Index of the head car.
    #[must_use]
    pub fn head(&self) -> CarId {
        self.state.lock().head
    }

    /// Number of car threads that have left their loop.
    #[must_use]
    pub fn finished_count(&self) -> usize {
        self.finished.load(Ordering::Acquire)
    }

    /// Cars in line order.
    #[must_use]
    pub fn cars(&self) -> Vec<Arc<Car>> {
        self.state.lock().cars.clone()
    }

    /// The pump pool.
    #[must_use]
    pub const fn pool(&self) -> &PumpPool {
        &self.pool
    }

    fn expect_head(&self, car: CarId) {
        let head = self.state.lock().head;
        if head != car {
            fatal(ProtocolViolation::HeadMismatch {
                expected: head,
                actual: car,
            });
        }
    }
}

enum RunPhase {
    Idle,
    Running {
        run_id: Uuid,
        started: Instant,
        workers: Vec<JoinHandle<()>>,
    },
    Stopped {
        run_id: Uuid,
        elapsed: Duration,
    },
}

/// Owner of a station: the line, its pumps and the car threads.
///
/// # Example
///
/// ```
/// use station_queue::config::StationConfig;
/// use station_queue::core::Coordinator;
/// use std::time::Duration;
///
/// let config = StationConfig::default()
///     .with_pumps(2)
///     .with_service_time(Duration::from_millis(1));
/// let station = Coordinator::new(&config).unwrap();
///
/// station.start(4).unwrap();
/// std::thread::sleep(Duration::from_millis(20));
/// station.stop().unwrap();
///
/// let report = station.results().unwrap();
/// assert!(report.is_conserved());
/// ```
pub struct Coordinator {
    line: Arc<Line>,
    phase: Mutex<RunPhase>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("line", &self.line)
            .field("running", &self.is_running())
            .finish()
    }
}

impl Coordinator {
    /// Build a station from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: &StationConfig) -> Result<Self, StationError> {
        Self::build(config, None)
    }

    /// Build a station that reports every protocol event to `journal`.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::InvalidConfig`] if the configuration is invalid.
    pub fn with_journal(
        config: &StationConfig,
        journal: Arc<dyn EventSink>,
    ) -> Result<Self, StationError> {
        Self::build(config, Some(journal))
    }

    fn build(
        config: &StationConfig,
        journal: Option<Arc<dyn EventSink>>,
    ) -> Result<Self, StationError> {
        config.validate().map_err(StationError::InvalidConfig)?;

        let mut pool = PumpPool::new(config.pumps);
        if let Some(journal) = &journal {
            pool = pool.with_journal(Arc::clone(journal));
        }
        let line = Line::new(pool, config.service_time(), journal);

        Ok(Self {
            line: Arc::new(line),
            phase: Mutex::new(RunPhase::Idle),
        })
    }

    /// Line up `cars` cars, start one thread per car and wake the first.
    ///
    /// May be called again after [`Coordinator::stop`].
    ///
    /// # Errors
    ///
    /// - [`StationError::EmptyLine`] if `cars` is zero
    /// - [`StationError::AlreadyRunning`] if a run is in progress
    /// - [`StationError::Spawn`] if a car thread could not be started
    pub fn start(&self, cars: usize) -> Result<(), StationError> {
        if cars == 0 {
            return Err(StationError::EmptyLine);
        }
        let mut phase = self.phase.lock();
        if matches!(*phase, RunPhase::Running { .. }) {
            return Err(StationError::AlreadyRunning);
        }

        let run_id = Uuid::new_v4();
        let lineup = self.line.reset(cars)?;
        let mut workers = Vec::with_capacity(cars);

        for car in lineup {
            let line = Arc::clone(&self.line);
            let spawned = thread::Builder::new()
                .name(format!("car-{}", car.id()))
                .spawn(move || run_car(&line, &car));

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    tracing::error!(%run_id, error = %e, "failed to spawn car thread");
                    self.line.request_stop();
                    if join_all(workers).is_some() {
                        tracing::error!(%run_id, "car thread panicked while aborting start");
                    }
                    *phase = RunPhase::Idle;
                    return Err(StationError::Spawn(e.to_string()));
                }
            }
        }

        self.line.wake_head();
        tracing::info!(%run_id, cars, pumps = self.line.pool().len(), "station run started");

        *phase = RunPhase::Running {
            run_id,
            started: Instant::now(),
            workers,
        };
        Ok(())
    }

    /// Request shutdown and block until every car thread has exited.
    ///
    /// If any car thread panicked on a protocol violation, the panic is
    /// re-raised here once all threads are joined.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::NotRunning`] if no run is in progress.
    pub fn stop(&self) -> Result<(), StationError> {
        let mut phase = self.phase.lock();
        if !matches!(*phase, RunPhase::Running { .. }) {
            return Err(StationError::NotRunning);
        }
        let RunPhase::Running {
            run_id,
            started,
            workers,
        } = std::mem::replace(&mut *phase, RunPhase::Idle)
        else {
            unreachable!("phase checked above");
        };

        let cars = workers.len();
        self.line.request_stop();
        let panicked = join_all(workers);

        let elapsed = started.elapsed();
        *phase = RunPhase::Stopped { run_id, elapsed };
        drop(phase);

        if let Some(payload) = panicked {
            tracing::error!(%run_id, "car thread panicked, re-raising");
            std::panic::resume_unwind(payload);
        }

        debug_assert_eq!(self.line.finished_count(), cars);
        tracing::info!(
            %run_id,
            cars,
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "station run stopped"
        );
        Ok(())
    }

    /// Counters of the last run.
    ///
    /// # Errors
    ///
    /// - [`StationError::StillRunning`] while a run is in progress
    /// - [`StationError::NotRunning`] if no run has ever completed
    pub fn results(&self) -> Result<RunReport, StationError> {
        let phase = self.phase.lock();
        match &*phase {
            RunPhase::Idle => Err(StationError::NotRunning),
            RunPhase::Running { .. } => Err(StationError::StillRunning),
            RunPhase::Stopped { run_id, elapsed } => Ok(RunReport {
                run_id: *run_id,
                fill_counts: self.line.cars().iter().map(|c| c.fill_count()).collect(),
                service_counts: self.line.pool().service_counts(),
                peak_occupancy: self.line.pool().peak_occupancy(),
                elapsed: *elapsed,
            }),
        }
    }

    /// Whether a run is in progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(*self.phase.lock(), RunPhase::Running { .. })
    }

    /// The car currently allowed to scan the pool, while running.
    #[must_use]
    pub fn head(&self) -> Option<CarId> {
        self.is_running().then(|| self.line.head())
    }

    /// Number of car threads that have left their loop in the current or last run.
    #[must_use]
    pub fn finished_count(&self) -> usize {
        self.line.finished_count()
    }

    /// Snapshot of every car's state.
    #[must_use]
    pub fn car_states(&self) -> Vec<CarState> {
        self.line.cars().iter().map(|c| c.state()).collect()
    }

    /// Number of pumps.
    #[must_use]
    pub fn pumps(&self) -> usize {
        self.line.pool().len()
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        let phase = std::mem::replace(self.phase.get_mut(), RunPhase::Idle);
        if let RunPhase::Running { run_id, workers, .. } = phase {
            self.line.request_stop();
            if join_all(workers).is_some() {
                tracing::warn!(%run_id, "car thread panicked during drop");
            }
            tracing::debug!(%run_id, "coordinator dropped while running, cars stopped");
        }
    }
}

/// Join every worker, returning the first panic payload if any.
fn join_all(workers: Vec<JoinHandle<()>>) -> Option<Box<dyn Any + Send + 'static>> {
    let mut first_panic = None;
    for worker in workers {
        if let Err(payload) = worker.join() {
            first_panic.get_or_insert(payload);
        }
    }
    first_panic
}
