//! Core line protocol: pumps, the pump pool, cars and the coordinator.

pub mod car;
pub mod coordinator;
pub mod error;
pub mod journal;
pub mod pump;
pub mod pump_pool;
pub mod report;
pub mod wake;

pub use car::{run_car, Car, CarId, CarState};
pub use coordinator::{Coordinator, Line};
pub use error::{fatal, AppResult, ProtocolViolation, StationError};
pub use journal::{EventSink, InMemoryJournal, StationEvent};
pub use pump::{Pump, PumpId};
pub use pump_pool::{PumpPool, Saturated};
pub use report::RunReport;
pub use wake::{WaitOutcome, WakeSlot};
