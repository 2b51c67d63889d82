//! Forge client error types.

use thiserror::Error;

/// Errors returned by forge client operations.
#[derive(Debug, Error)]
pub enum ForgeError {
    /// The forge rejected the request as unauthenticated (HTTP 401).
    #[error("authentication required")]
    AuthRequired,

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The forge refused the request because the rate limit is exhausted.
    #[error("rate limited: {message}")]
    RateLimited { message: String },

    /// Any other GitHub API error.
    #[error("GitHub API error: {0}")]
    Api(#[source] octocrab::Error),

    /// Filesystem error.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Network or upstream failure without a more specific type.
    #[error("network error: {0}")]
    Network(String),

    /// A payload (e.g. a webhook body) could not be decoded.
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    /// The operation is not supported by this forge.
    #[error("not implemented: {0}")]
    NotImplemented(String),
}

impl From<octocrab::Error> for ForgeError {
    fn from(error: octocrab::Error) -> Self {
        let response = match &error {
            octocrab::Error::GitHub { source, .. } => {
                Some((source.status_code.as_u16(), source.message.clone()))
            }
            _ => None,
        };

        match response {
            Some((401, _)) => ForgeError::AuthRequired,
            Some((403 | 429, message)) if message.to_ascii_lowercase().contains("rate limit") => {
                ForgeError::RateLimited { message }
            }
            _ => ForgeError::Api(error),
        }
    }
}

impl ForgeError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        ForgeError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
