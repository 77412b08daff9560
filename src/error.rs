use thiserror::Error;

/// Error type shared by every fallible operation in this crate.
///
/// Connection and statement errors from the underlying driver are surfaced
/// unmodified; nothing at this layer retries.
#[derive(Debug, Error)]
pub enum SqlAccessError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Result shaping error: {0}")]
    ShapeError(String),

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),
}
