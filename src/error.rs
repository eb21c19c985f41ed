//! Error types for call-notify.

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// SMS gateway dispatch errors.
///
/// Every variant is terminal: nothing in the dispatch path is retried.
/// A duplicate SMS to a customer is worse than a single missed one.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("SMS gateway not configured")]
    NotConfigured,

    #[error("customer phone not resolved")]
    CustomerPhoneUnresolved,

    #[error("gateway rejected send ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("gateway call timed out")]
    Timeout,
}

/// Voice-AI provider errors (call initiation path).
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("voice provider not configured")]
    NotConfigured,

    #[error("provider request failed ({status}): {detail}")]
    RequestFailed { status: u16, detail: String },

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
