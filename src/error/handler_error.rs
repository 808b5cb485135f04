/// Failure raised while executing one action.
///
/// Every variant is recovered at the executor boundary and turned into an
/// `"error"` UI component; none of them is fatal to the session.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HandlerError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("no data found: {0}")]
    NoData(String),

    #[error("network failure: {0}")]
    Network(String),

    #[error("rate limited by upstream service: {0}")]
    RateLimited(String),

    #[error("unknown API: {0}")]
    UnknownApi(String),

    #[error("missing context value: {0}")]
    MissingContext(String),
}

impl HandlerError {
    pub fn invalid_param(key: &str) -> Self {
        HandlerError::InvalidParameters(format!("missing or invalid parameter '{key}'"))
    }

    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, HandlerError::Network(_) | HandlerError::RateLimited(_))
    }
}
