//! Backend adapters consumed by the workload driver.
//!
//! The driver only ever sees this trait; which backend a run hits is a
//! caller decision made in the binaries.

use anyhow::Result;
use async_trait::async_trait;

pub mod http;
pub mod mysql;

pub use http::HttpAdapter;
pub use mysql::MysqlAdapter;

/// Bytes written per insert/update.
pub const PAYLOAD_BYTES: usize = 1 << 10;

/// The fixed write payload.
pub fn payload() -> Vec<u8> {
    vec![0u8; PAYLOAD_BYTES]
}

/// One backend under test.
///
/// `read` succeeds whenever the backend answered, whether or not the
/// record existed. Operation errors are recorded by the driver as
/// failed tries; only `setup` failures are fatal to a run, and
/// `teardown` failures are logged and ignored.
#[async_trait]
pub trait BackendAdapter: Send + Sync {
    /// Create the scratch resource (table, namespace) for this run.
    async fn setup(&self) -> Result<()>;

    /// Remove the scratch resource. Best-effort.
    async fn teardown(&self) -> Result<()>;

    /// Fetch one record by id.
    async fn read(&self, id: u64) -> Result<()>;

    /// First write to `id`: create the record with the fixed payload.
    async fn insert(&self, id: u64) -> Result<()>;

    /// Overwrite an existing record's payload.
    async fn update(&self, id: u64) -> Result<()>;
}
