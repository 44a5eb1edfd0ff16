//! Error types for qontinui-client

/// Result type for qontinui-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the Qontinui backend
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Operation requires a session token and none is held
    #[error("not authenticated: {0}")]
    Auth(String),

    /// Backend answered with a non-2xx status
    #[error("API error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// Backend could not be reached
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered 2xx with a body that is not JSON
    #[error("invalid response body: {message}")]
    Decode { message: String },

    /// Invalid settings
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status carried by a remote error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => Some(*status),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether this is a remote error with the given status.
    pub fn is_status(&self, status: u16) -> bool {
        matches!(self, Error::Remote { status: s, .. } if *s == status)
    }
}
