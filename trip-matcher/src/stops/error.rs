//! Stop directory error types.

/// Errors that can occur when fetching or caching stop records.
#[derive(Debug, thiserror::Error)]
pub enum StopError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unauthorized: check API_TOKEN")]
    Unauthorized,

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {message}")]
    Json { message: String },

    #[error("cache error: {message}")]
    Cache { message: String },
}
