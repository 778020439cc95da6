//! Results of a finished run.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-car and per-pump counters of a stopped run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Identifier logged at run start and stop.
    pub run_id: Uuid,
    /// Completed services per car, indexed by car id.
    pub fill_counts: Vec<u64>,
    /// Occupations per pump, indexed by pump id.
    pub service_counts: Vec<u64>,
    /// Most pumps ever occupied at the same time.
    pub peak_occupancy: usize,
    /// Wall-clock time between start and stop.
    pub elapsed: Duration,
}

impl RunReport {
    /// Sum of all car fill counts.
    #[must_use]
    pub fn total_fills(&self) -> u64 {
        self.fill_counts.iter().sum()
    }

    /// Sum of all pump service counts.
    #[must_use]
    pub fn total_services(&self) -> u64 {
        self.service_counts.iter().sum()
    }

    /// Every occupation was completed by exactly one car service.
    #[must_use]
    pub fn is_conserved(&self) -> bool {
        self.total_fills() == self.total_services()
    }

    /// Difference between the busiest and the least served car.
    #[must_use]
    pub fn max_fill_spread(&self) -> u64 {
        let max = self.fill_counts.iter().max().copied().unwrap_or(0);
        let min = self.fill_counts.iter().min().copied().unwrap_or(0);
        max - min
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "run {} ({:.1}s)", self.run_id, self.elapsed.as_secs_f64())?;
        for (car, fills) in self.fill_counts.iter().enumerate() {
            writeln!(f, "car {car:>3}: {fills} fill-ups")?;
        }
        for (pump, services) in self.service_counts.iter().enumerate() {
            writeln!(f, "pump {pump:>2}: {services} services")?;
        }
        write!(
            f,
            "total: {} fill-ups, {} services, peak occupancy {}",
            self.total_fills(),
            self.total_services(),
            self.peak_occupancy
        )
    }
}
