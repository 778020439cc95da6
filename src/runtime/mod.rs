//! Drivers that run a station for a fixed window and collect the report.

pub mod driver;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_driver;

pub use driver::{cancellation, run, run_for};
#[cfg(feature = "tokio-runtime")]
pub use tokio_driver::{run_for_async, stop_async};
