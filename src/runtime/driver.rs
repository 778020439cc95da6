//! Blocking driver: run a station for a wall-clock window.

use std::time::Duration;

use crossbeam_channel::{after, bounded, select, Receiver, Sender};

use crate::config::StationConfig;
use crate::core::{Coordinator, RunReport, StationError};

/// Create a cancel channel for [`run_for`].
///
/// Sending on (or dropping) the returned sender ends the run early.
#[must_use]
pub fn cancellation() -> (Sender<()>, Receiver<()>) {
    bounded(1)
}

/// Start `cars` cars, wait out `window` or a cancel signal, stop and report.
///
/// # Errors
///
/// Propagates lifecycle errors from [`Coordinator::start`] and
/// [`Coordinator::stop`].
pub fn run_for(
    station: &Coordinator,
    cars: usize,
    window: Duration,
    cancel: &Receiver<()>,
) -> Result<RunReport, StationError> {
    station.start(cars)?;

    select! {
        recv(after(window)) -> _ => {
            let window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
            tracing::debug!(window_ms, "run window elapsed");
        }
        recv(cancel) -> _ => {
            tracing::info!("run cancelled before the window elapsed");
        }
    }

    station.stop()?;
    station.results()
}

/// Build a station from `config` and drive it for `config.run_duration()`.
///
/// # Errors
///
/// Returns [`StationError::InvalidConfig`] for a bad configuration, otherwise
/// propagates lifecycle errors.
pub fn run(config: &StationConfig, cancel: &Receiver<()>) -> Result<RunReport, StationError> {
    let station = Coordinator::new(config)?;
    run_for(&station, config.cars, config.run_duration(), cancel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_run_for_window() {
        let config = StationConfig::default()
            .with_pumps(2)
            .with_service_time(Duration::from_millis(1));
        let station = Coordinator::new(&config).unwrap();
        let (_tx, rx) = cancellation();

        let report = run_for(&station, 3, Duration::from_millis(40), &rx).unwrap();
        assert_eq!(report.fill_counts.len(), 3);
        assert_eq!(report.service_counts.len(), 2);
        assert!(report.total_fills() > 0);
        assert!(report.is_conserved());
    }

    #[test]
    fn test_cancel_ends_run_early() {
        let config = StationConfig::default()
            .with_service_time(Duration::from_millis(1))
            .with_run_duration(Duration::from_secs(60));
        let (tx, rx) = cancellation();
        tx.send(()).unwrap();

        let begun = Instant::now();
        let report = run(&config, &rx).unwrap();
        assert!(begun.elapsed() < Duration::from_secs(10));
        assert!(report.is_conserved());
    }

    #[test]
    fn test_run_rejects_bad_config() {
        let (_tx, rx) = cancellation();
        let config = StationConfig::default().with_cars(0);
        assert!(matches!(run(&config, &rx), Err(StationError::InvalidConfig(_))));
    }
}
