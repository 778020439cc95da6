//! # Station Queue
//!
//! Strict-FIFO fair queuing of many concurrent clients over a small, fixed pool
//! of interchangeable resources, modelled as cars sharing the pumps of a gas
//! station.
//!
//! Each car runs on its own OS thread and repeatedly queues, occupies a pump,
//! is serviced for a fixed time and releases. Cars are served in the exact order
//! they joined the line no matter how threads are scheduled, and every pump has
//! at most one occupant at a time.
//!
//! ## How the line moves
//!
//! - Only the **head** car may scan the pool for a free pump.
//! - As soon as the head occupies a pump it advances the head and wakes the next
//!   car, *before* its own service begins, so the line moves while pumps are busy.
//! - If every pump is busy the head parks on a release condition instead of
//!   spinning, and re-scans after each release.
//! - Every wait also watches the shutdown flag, so `stop` never leaves a car
//!   blocked.
//!
//! Everything is built from `parking_lot` mutexes and condition variables plus
//! a few atomics.
//!
//! ## Example
//!
//! ```rust
//! use station_queue::config::StationConfig;
//! use station_queue::core::Coordinator;
//! use std::time::Duration;
//!
//! let config = StationConfig::default()
//!     .with_pumps(2)
//!     .with_service_time(Duration::from_millis(2));
//! let station = Coordinator::new(&config).unwrap();
//!
//! station.start(5).unwrap();
//! std::thread::sleep(Duration::from_millis(50));
//! station.stop().unwrap();
//!
//! let report = station.results().unwrap();
//! assert_eq!(report.total_fills(), report.total_services());
//! assert!(report.max_fill_spread() <= 1);
//! ```
//!
//! For complete scenarios, see `tests/coordinator_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Pumps, the pump pool, cars and the line coordinator.
pub mod core;
/// Run configuration.
pub mod config;
/// Drivers that run a station for a fixed window.
pub mod runtime;
/// Shared utilities.
pub mod util;
