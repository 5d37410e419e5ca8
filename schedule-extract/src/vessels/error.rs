//! Vessel registry error types.

/// Errors from a remote vessel store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication failed
    #[error("unauthorized: check the vessel store API key")]
    Unauthorized,

    /// Store returned an error status
    #[error("store error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// The call did not finish within the configured timeout
    #[error("store call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The store answered but holds no vessels
    #[error("store returned no vessels")]
    Empty,

    /// Tier is not configured
    #[error("not configured: {0}")]
    NotConfigured(String),
}

/// Errors from the local vessel cache file.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Invalid resolver configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid configuration for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StoreError::Api {
            status: 500,
            message: "Internal Server Error".into(),
        };
        assert_eq!(err.to_string(), "store error 500: Internal Server Error");

        let err = StoreError::Timeout { secs: 5 };
        assert_eq!(err.to_string(), "store call timed out after 5s");

        let err = StoreError::NotConfigured("secondary".into());
        assert_eq!(err.to_string(), "not configured: secondary");

        let err = ConfigError {
            key: "VESSEL_FUZZY_THRESHOLD",
            reason: "must be 0-100".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid configuration for VESSEL_FUZZY_THRESHOLD: must be 0-100"
        );
    }
}
