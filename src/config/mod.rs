//! Configuration for station runs.

pub mod station;

pub use station::StationConfig;
