//! mixload — mixed read/write load-testing harness
//!
//! Drives a randomized read/write workload against a pluggable backend
//! at a bounded concurrency level for a configurable duration, then
//! reports per-class latency and success-rate statistics.
//!
//! # Architecture
//!
//! ```text
//! mixload
//! ├── adapter/      # BackendAdapter trait + MySQL and HTTP implementations
//! ├── driver/       # Workload dispatch loop, admission control, key coordination
//! └── metrics/      # Latency recording and aggregate reporting
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use mixload::{RunConfig, WorkloadDriver};
//! use mixload::adapter::http::{HttpAdapter, HttpConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RunConfig {
//!         run_for: Duration::from_secs(30),
//!         concurrency: 64,
//!         ..RunConfig::default()
//!     };
//!     let adapter = Arc::new(HttpAdapter::new(HttpConfig::default())?);
//!     let driver = WorkloadDriver::new(config);
//!     let summary = mixload::run_against(&driver, adapter).await?;
//!     println!("{}", summary.reads);
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod driver;
pub mod error;
pub mod metrics;

use std::sync::Arc;

use serde::Serialize;

pub use adapter::BackendAdapter;
pub use driver::{KeyExistenceSet, RunConfig, RunStats, WorkloadDriver, WriteKind};
pub use error::HarnessError;
pub use metrics::{AggregateReport, LatencyRecorder, LatencyStats, SummaryPrinter};

/// Final per-class reports for one completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub reads: AggregateReport,
    pub writes: AggregateReport,
}

/// Full backend lifecycle around a single run: `setup()`, drive the
/// workload, snapshot both recorders, then best-effort `teardown()`.
///
/// Setup failures abort before any operation is dispatched. Teardown
/// failures are logged and swallowed; the statistics of a finished run
/// are valid regardless of whether the scratch resource was removed.
pub async fn run_against(
    driver: &WorkloadDriver,
    adapter: Arc<dyn BackendAdapter>,
) -> Result<RunSummary, HarnessError> {
    driver.config().validate()?;

    adapter.setup().await.map_err(HarnessError::Setup)?;

    let stats = driver.run(adapter.clone()).await?;
    let summary = RunSummary {
        reads: stats.reads.snapshot(),
        writes: stats.writes.snapshot(),
    };

    if let Err(err) = adapter.teardown().await {
        tracing::warn!(error = %err, "backend teardown failed");
    }

    Ok(summary)
}
