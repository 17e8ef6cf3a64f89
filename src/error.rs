use thiserror::Error;

/// Failure outcome delivered through an order's completion handle.
///
/// Cloned once per affected order when a whole batch fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("can't fulfill orders: {0}")]
    Dispatch(String),
    #[error("backend protocol violation: {0}")]
    Protocol(String),
    #[error("order engine was stopped")]
    Shutdown,
}

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),
    #[error("Engine error: {0}")]
    EngineError(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
