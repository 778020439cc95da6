//! Error types for station operations.

use thiserror::Error;

use crate::core::{CarId, PumpId};

/// Recoverable errors produced by the coordinator lifecycle API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StationError {
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A run was requested with no cars in line.
    #[error("cannot start a run with an empty line")]
    EmptyLine,
    /// `start` was called while a run is in progress.
    #[error("station is already running")]
    AlreadyRunning,
    /// `stop` was called without a matching `start`.
    #[error("station is not running")]
    NotRunning,
    /// Results were requested before the run was stopped.
    #[error("results are unavailable while the station is running")]
    StillRunning,
    /// The OS refused to spawn a car thread.
    #[error("failed to spawn car thread: {0}")]
    Spawn(String),
    /// The async runtime failed to run a blocking step.
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Broken protocol invariants.
///
/// Any of these means the synchronization core itself is defective. They are
/// never returned to callers; [`fatal`] logs and aborts the offending thread.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolViolation {
    /// A car other than the head tried to scan the pool or advance the line.
    #[error("head mismatch: car {actual} acted out of turn while car {expected} is head")]
    HeadMismatch {
        /// Car the line expected.
        expected: CarId,
        /// Car that made the call.
        actual: CarId,
    },
    /// A pump was released by a car that does not hold it.
    #[error("pump {pump} released by car {car} but held by car {occupant}")]
    ReleaseByNonOccupant {
        /// Pump being released.
        pump: PumpId,
        /// Car that made the call.
        car: CarId,
        /// Car actually holding the pump.
        occupant: CarId,
    },
    /// A free pump was released.
    #[error("car {car} released pump {pump} which is not occupied")]
    ReleaseOfFreePump {
        /// Pump being released.
        pump: PumpId,
        /// Car that made the call.
        car: CarId,
    },
    /// A car tried to occupy a second pump while holding one.
    #[error("car {car} already holds pump {held} and tried to occupy pump {pump}")]
    DoubleOccupancy {
        /// Car that made the call.
        car: CarId,
        /// Pump the car already holds.
        held: PumpId,
        /// Pump the car tried to take.
        pump: PumpId,
    },
    /// The line was advanced by a car that does not occupy the named pump.
    #[error("car {car} advanced the line without occupying pump {pump}")]
    NotOccupant {
        /// Pump named by the call.
        pump: PumpId,
        /// Car that made the call.
        car: CarId,
    },
    /// A pump id outside the pool was named.
    #[error("pump {pump} does not exist in a pool of {size}")]
    UnknownPump {
        /// Pump named by the call.
        pump: PumpId,
        /// Number of pumps in the pool.
        size: usize,
    },
}

/// Abort on a broken invariant.
///
/// The violation is logged before panicking so it is visible even when the
/// panic is later re-raised from a joining thread.
#[cold]
#[track_caller]
pub fn fatal(violation: ProtocolViolation) -> ! {
    tracing::error!(%violation, "protocol invariant violated");
    panic!("{violation}");
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
