//! Feed error types.

/// Errors from fetching or decoding the realtime feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid API token or unauthorized
    #[error("unauthorized: check API_TOKEN")]
    Unauthorized,

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body exceeded the size limit
    #[error("feed response too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: usize, max: usize },

    /// Protobuf decoding failed
    #[error("protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// API token contains characters not allowed in a header
    #[error("invalid API token format")]
    InvalidToken,
}
