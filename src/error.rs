//! Error taxonomy for Thumbalizr API calls.

/// Result type for Thumbalizr operations
pub type ThumbalizrResult<T> = Result<T, ThumbalizrError>;

/// Errors that can occur while building, sending or interpreting a request
#[derive(Debug, thiserror::Error)]
pub enum ThumbalizrError {
    /// The request never produced a response (DNS, connect, TLS, timeout)
    #[error("Transport unavailable: {0}")]
    TransportUnavailable(String),

    /// HTTP 404; the response is still interpreted
    #[error("404: {0}")]
    NotFound(String),

    /// HTTP 403; the response is still interpreted
    #[error("403: {0}")]
    Forbidden(String),

    /// HTTP 401; the response is still interpreted
    #[error("401: {0}")]
    Unauthorized(String),

    /// Any other non-success status; the response is discarded
    #[error("Unrecognized server error {status} for {url}")]
    UnrecognizedServerError { status: u16, url: String },

    /// Headers or body could not be read
    #[error("Failed to parse response: {0}")]
    ResponseParsingFailure(String),

    #[error("Invalid screenshot options: {0}")]
    InvalidOptions(String),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl ThumbalizrError {
    /// Whether a response carrying this error class is still worth interpreting
    pub fn is_interpretable(&self) -> bool {
        matches!(
            self,
            ThumbalizrError::NotFound(_)
                | ThumbalizrError::Forbidden(_)
                | ThumbalizrError::Unauthorized(_)
        )
    }
}
