use thiserror::Error;

/// Internal error type shared by the cache, providers, router, scorer and
/// pipeline. Carries enough shape to map cleanly onto an HTTP status at the
/// API boundary (see `api::error::ApiError`) without every module re-deriving
/// its own error enum.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("expired: {0}")]
    Expired(String),

    #[error("invalid quote: {0}")]
    InvalidQuote(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl RoutingError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        RoutingError::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        RoutingError::Internal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, RoutingError>;
