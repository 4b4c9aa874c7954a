use thiserror::Error;

/// Error from an external provider call (embedding or reasoning service).
///
/// Transient variants are retried according to each caller's policy;
/// validation variants are never retried — a malformed verdict stays malformed.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Response validation failed: {0}")]
    Validation(String),

    #[error("Provider returned empty content")]
    EmptyContent,

    #[error("Provider call timed out")]
    Timeout,
}

impl ProviderError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Timeouts, connection failures, rate limits, and 5xx responses are
    /// transient. A response that arrived but failed validation is not.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ProviderError::Timeout => true,
            ProviderError::Api { status, .. } => *status == 429 || *status >= 500,
            ProviderError::Parse(_) | ProviderError::Validation(_) | ProviderError::EmptyContent => {
                false
            }
        }
    }
}

/// Engine-level error surfaced to the host layer.
///
/// Per-candidate provider failures never appear here — they are contained
/// inside the batch as excluded-candidate markers. This type covers the
/// few conditions that are genuinely the caller's problem.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Document error: {0}")]
    Document(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_429_is_transient() {
        let err = ProviderError::Api {
            status: 429,
            message: "rate limited".to_string(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn test_api_500_is_transient() {
        let err = ProviderError::Api {
            status: 503,
            message: "overloaded".to_string(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn test_api_400_is_not_transient() {
        let err = ProviderError::Api {
            status: 400,
            message: "bad request".to_string(),
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn test_validation_is_not_transient() {
        let err = ProviderError::Validation("match_score out of range".to_string());
        assert!(!err.is_transient());
    }

    #[test]
    fn test_timeout_is_transient() {
        assert!(ProviderError::Timeout.is_transient());
    }

    #[test]
    fn test_empty_content_is_not_transient() {
        assert!(!ProviderError::EmptyContent.is_transient());
    }
}
