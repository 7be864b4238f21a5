use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{path} returned {status}")]
    Status {
        path: String,
        status: reqwest::StatusCode,
    },
    #[error("malformed response from {path}: {message}")]
    Decode { path: String, message: String },
    #[error("product {product_id} reports building '{found}' inside group '{expected}'")]
    InconsistentPayload {
        product_id: String,
        expected: String,
        found: String,
    },
    #[error("invalid api base url: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// Whether re-issuing the same request may succeed.
    pub fn is_retriable(&self) -> bool {
        !matches!(self, ApiError::InvalidBaseUrl(_))
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
