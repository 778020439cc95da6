//! Station run configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable overriding [`StationConfig::pumps`].
pub const ENV_PUMPS: &str = "STATION_PUMPS";
/// Environment variable overriding [`StationConfig::cars`].
pub const ENV_CARS: &str = "STATION_CARS";
/// Environment variable overriding [`StationConfig::service_time_ms`].
pub const ENV_SERVICE_MS: &str = "STATION_SERVICE_MS";
/// Environment variable overriding [`StationConfig::run_secs`].
pub const ENV_RUN_SECS: &str = "STATION_RUN_SECS";

/// Shape and timing of a station run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    /// Number of pumps in the pool.
    pub pumps: usize,
    /// Number of cars the driver lines up.
    pub cars: usize,
    /// Synthetic service duration per fill-up, in milliseconds.
    pub service_time_ms: u64,
    /// Wall-clock length of a driven run, in seconds.
    pub run_secs: u64,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            pumps: 2,
            cars: 10,
            service_time_ms: 100,
            run_secs: 30,
        }
    }
}

impl StationConfig {
    /// Set the number of pumps.
    #[must_use]
    pub const fn with_pumps(mut self, pumps: usize) -> Self {
        self.pumps = pumps;
        self
    }

    /// Set the number of cars.
    #[must_use]
    pub const fn with_cars(mut self, cars: usize) -> Self {
        self.cars = cars;
        self
    }

    /// Set the service duration. Sub-millisecond precision is dropped.
    #[must_use]
    pub fn with_service_time(mut self, service_time: Duration) -> Self {
        self.service_time_ms = u64::try_from(service_time.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the run duration. Sub-second precision is dropped.
    #[must_use]
    pub const fn with_run_duration(mut self, run: Duration) -> Self {
        self.run_secs = run.as_secs();
        self
    }

    /// Service duration per fill-up.
    #[must_use]
    pub const fn service_time(&self) -> Duration {
        Duration::from_millis(self.service_time_ms)
    }

    /// Length of a driven run.
    #[must_use]
    pub const fn run_duration(&self) -> Duration {
        Duration::from_secs(self.run_secs)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        if self.pumps == 0 {
            return Err("pumps must be greater than 0".into());
        }
        if self.cars == 0 {
            return Err("cars must be greater than 0".into());
        }
        if self.run_secs == 0 {
            return Err("run_secs must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate. Missing fields
    /// take their defaults.
    ///
    /// # Errors
    ///
    /// Returns a message on malformed JSON or invalid values.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the process environment, reading a `.env`
    /// file first if one exists. Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a message when a variable does not parse or the result is invalid.
    pub fn from_env() -> Result<Self, String> {
        // A missing .env file is fine.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, applying the same
    /// rules as [`StationConfig::from_env`].
    ///
    /// # Errors
    ///
    /// Returns a message when a value does not parse or the result is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = lookup(ENV_PUMPS) {
            cfg.pumps = parse_var(ENV_PUMPS, &v)?;
        }
        if let Some(v) = lookup(ENV_CARS) {
            cfg.cars = parse_var(ENV_CARS, &v)?;
        }
        if let Some(v) = lookup(ENV_SERVICE_MS) {
            cfg.service_time_ms = parse_var(ENV_SERVICE_MS, &v)?;
        }
        if let Some(v) = lookup(ENV_RUN_SECS) {
            cfg.run_secs = parse_var(ENV_RUN_SECS, &v)?;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| format!("{key}=`{value}` is invalid: {e}"))
}
