//! Mock manufacturing backends
//!
//! Three in-process simulators that populate a [`crate::ToolSet`] at
//! construction and answer with schema-consistent synthetic data:
//!
//! - [`telemetry::TelemetryBackend`]: equipment tags, time series, status
//! - [`analytics::AnalyticsBackend`]: production metrics and quality trends
//! - [`maintenance::MaintenanceBackend`]: work orders, inventory, tickets
//!
//! None of them are seeded in production; outputs are randomized per call
//! through the injected `IoContext`. Tests assert ranges and shapes, or
//! pin behavior with a seeded context.

pub mod analytics;
pub mod maintenance;
pub mod telemetry;

pub use analytics::AnalyticsBackend;
pub use maintenance::MaintenanceBackend;
pub use telemetry::TelemetryBackend;

use chrono::{DateTime, TimeZone, Utc};
use millwright_core::IoContext;

/// Current time as UTC, read through the injected clock
pub(crate) fn now_utc(io: &IoContext) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(io.now_ms() as i64)
        .single()
        .unwrap_or_default()
}

/// Round to two decimal places, the precision of all simulated readings
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
