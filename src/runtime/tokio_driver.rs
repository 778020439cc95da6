//! Tokio driver: run a station from async code.
//!
//! Car threads are plain OS threads either way. Only the wait and the blocking
//! `stop` join are adapted, the latter through `spawn_blocking` so the async
//! runtime is never stalled.

use std::sync::Arc;
use std::time::Duration;

use crate::core::{Coordinator, RunReport, StationError};

/// Start `cars` cars, sleep for `window`, stop and report.
///
/// A protocol-violation panic raised by `stop` is resumed on the caller.
///
/// # Errors
///
/// Propagates lifecycle errors, or [`StationError::Runtime`] if the blocking
/// stop task was cancelled.
pub async fn run_for_async(
    station: Arc<Coordinator>,
    cars: usize,
    window: Duration,
) -> Result<RunReport, StationError> {
    station.start(cars)?;
    tokio::time::sleep(window).await;
    stop_async(Arc::clone(&station)).await?;
    station.results()
}

/// Stop a station without blocking the async runtime.
///
/// # Errors
///
/// Returns [`StationError::NotRunning`] if no run is in progress, or
/// [`StationError::Runtime`] if the blocking task was cancelled.
pub async fn stop_async(station: Arc<Coordinator>) -> Result<(), StationError> {
    match tokio::task::spawn_blocking(move || station.stop()).await {
        Ok(stopped) => stopped,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(StationError::Runtime(e.to_string())),
    }
}
