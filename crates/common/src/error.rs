use thiserror::Error;

/// Canonical DriftQ error taxonomy used across crates.
///
/// Classification guidance:
/// - [`DriftqError::InvalidConfig`]: plan/config contract violations discovered before execution
/// - [`DriftqError::Evaluation`]: expression evaluation failures against one item
/// - [`DriftqError::Storage`]: keyspace collaborator bulk-call failures
/// - [`DriftqError::Execution`]: runtime operator or channel-wiring failures
/// - [`DriftqError::Cancelled`]: pipeline stopped by cancellation or timeout
/// - [`DriftqError::Io`]: raw filesystem/network IO failures from std APIs
#[derive(Debug, Error)]
pub enum DriftqError {
    /// Invalid or inconsistent plan/configuration state.
    ///
    /// Examples:
    /// - mutation plan without a target keyspace
    /// - batch size or channel capacity of zero where one is required
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Expression evaluation failed for a single item.
    ///
    /// Examples:
    /// - missing field referenced by a key expression
    /// - key expression yielding a non-string value
    ///
    /// These are per-item conditions; consumers surface them as warnings
    /// and keep the pipeline running.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Keyspace collaborator call failed as a whole.
    ///
    /// Examples:
    /// - bulk upsert/delete rejected by the store
    /// - duplicate key on insert
    #[error("storage error: {0}")]
    Storage(String),

    /// Runtime pipeline failures after wiring succeeded.
    ///
    /// Examples:
    /// - operator output claimed twice
    /// - launch attempted on an already-started root
    #[error("execution error: {0}")]
    Execution(String),

    /// Pipeline stopped early by cancellation or deadline expiry.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// Transparent std IO failures.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Standard DriftQ result alias.
pub type Result<T> = std::result::Result<T, DriftqError>;
