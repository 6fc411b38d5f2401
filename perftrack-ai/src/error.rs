use thiserror::Error;

/// Failures of a single generate call.
#[derive(Debug, Error)]
pub enum AiError {
    /// The proxy has no credential for the upstream model.
    #[error("AI proxy is not configured: {0}")]
    ServerConfig(String),

    /// The proxy answered with a non-2xx status.
    #[error("Server error: {status}")]
    Upstream {
        status: String,
        message: Option<String>,
    },

    #[error("AI request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("No response")]
    Empty,

    #[error("unexpected AI response: {0}")]
    Malformed(String),
}
