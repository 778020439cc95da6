//! Console driver: run the station for the configured window and print the
//! per-car and per-pump counters.
//!
//! Configured through `STATION_PUMPS`, `STATION_CARS`, `STATION_SERVICE_MS`
//! and `STATION_RUN_SECS` (a `.env` file is honoured).

use anyhow::{anyhow, Context};

use station_queue::config::StationConfig;
use station_queue::core::AppResult;
use station_queue::runtime::{cancellation, run};
use station_queue::util::init_tracing;

fn main() -> AppResult<()> {
    init_tracing();

    let config = StationConfig::from_env().map_err(|e| anyhow!(e))?;
    tracing::info!(
        pumps = config.pumps,
        cars = config.cars,
        service_ms = config.service_time_ms,
        run_secs = config.run_secs,
        "starting station"
    );

    // Held for the whole run so the window is never cut short.
    let (_cancel, cancelled) = cancellation();
    let report = run(&config, &cancelled).context("station run failed")?;

    println!("{report}");
    if !report.is_conserved() {
        return Err(anyhow!(
            "fill-ups ({}) do not match pump services ({})",
            report.total_fills(),
            report.total_services()
        ));
    }
    Ok(())
}
