use thiserror::Error;

/// Unified error type for the entire holding-watch-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── API / Network ───────────────────────────────────────────────
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Configuration ───────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),

    // ── Dashboard state ─────────────────────────────────────────────
    #[error("Query validation failed: {0}")]
    ValidationError(String),

    #[error("Row not found: {0}")]
    RowNotFound(usize),
}

impl CoreError {
    /// Short message suitable for a transient notification to the user.
    ///
    /// Transport failures get fixed wording; everything else falls back
    /// to the `Display` text.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Http { status: 404 } => "resource not found".to_string(),
            CoreError::Http { status: 500 } => "internal server error".to_string(),
            CoreError::Http { status: 503 } => "service unavailable".to_string(),
            CoreError::Http { status } => format!("request failed ({status})"),
            CoreError::Timeout => "request timed out".to_string(),
            CoreError::Network(_) => "network error".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether this error came from the transport layer (as opposed to
    /// configuration or local state).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CoreError::Http { .. }
                | CoreError::Timeout
                | CoreError::Network(_)
                | CoreError::Deserialization(_)
        )
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Config(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return CoreError::Timeout;
        }
        if let Some(status) = e.status() {
            return CoreError::Http {
                status: status.as_u16(),
            };
        }
        if e.is_decode() {
            return CoreError::Deserialization(e.to_string());
        }
        // Strip query parameters: backend URLs carry actor names and filters.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
