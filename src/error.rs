use thiserror::Error;

/// Errors that abort a run before or during startup.
///
/// Per-operation backend failures are never surfaced here; they are
/// absorbed into the statistics as failed tries.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The run configuration is invalid; nothing was dispatched.
    #[error("invalid run configuration: {0}")]
    InvalidConfig(String),

    /// The backend could not create its scratch resource.
    #[error("backend setup failed")]
    Setup(#[source] anyhow::Error),
}
