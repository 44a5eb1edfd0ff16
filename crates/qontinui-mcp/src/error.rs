//! Error types for the MCP server

use thiserror::Error;

/// Result type alias for MCP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serving a tool call
#[derive(Debug, Error)]
pub enum Error {
    /// Unknown tool requested
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments rejected before any backend call
    #[error("invalid arguments for {tool}: {message}")]
    Validation { tool: String, message: String },

    /// Configuration collection has no element with this id
    #[error("{collection} element not found: {id}")]
    ElementNotFound { collection: String, id: String },

    /// Caller cancelled the request
    #[error("request cancelled")]
    Cancelled,

    /// Error from the backend client
    #[error(transparent)]
    Client(#[from] qontinui_client::Error),

    /// Error during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn validation(tool: &str, message: impl Into<String>) -> Self {
        Error::Validation {
            tool: tool.to_string(),
            message: message.into(),
        }
    }

    /// Stable machine-readable kind reported in failed tool results.
    pub fn kind(&self) -> &'static str {
        use qontinui_client::Error as ClientError;

        match self {
            Error::UnknownTool(_) => "unknown_tool",
            Error::Validation { .. } => "validation_error",
            Error::ElementNotFound { .. } => "not_found",
            Error::Cancelled => "cancelled",
            Error::Client(ClientError::Auth(_)) => "auth_error",
            Error::Client(ClientError::Remote { .. }) => "remote_error",
            Error::Client(ClientError::Transport(_)) => "transport_error",
            Error::Client(ClientError::Decode { .. }) => "decode_error",
            Error::Client(ClientError::Config(_)) => "config_error",
            Error::Json(_) => "json_error",
            Error::Io(_) => "io_error",
        }
    }

    /// HTTP status of a backend rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Client(e) => e.status(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Error::UnknownTool("x".into()), "unknown_tool")]
    #[case(Error::validation("create_workflow", "missing name"), "validation_error")]
    #[case(Error::Cancelled, "cancelled")]
    #[case(Error::Client(qontinui_client::Error::Auth("no token".into())), "auth_error")]
    #[case(
        Error::Client(qontinui_client::Error::Remote { status: 404, message: "gone".into() }),
        "remote_error"
    )]
    #[case(
        Error::ElementNotFound { collection: "workflows".into(), id: "workflow-1".into() },
        "not_found"
    )]
    fn kinds(#[case] error: Error, #[case] kind: &str) {
        assert_eq!(error.kind(), kind);
    }

    #[test]
    fn remote_status_is_exposed() {
        let err = Error::from(qontinui_client::Error::Remote {
            status: 404,
            message: "Project not found".into(),
        });
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "API error (404): Project not found");
    }

    #[test]
    fn unknown_tool_message() {
        assert_eq!(
            Error::UnknownTool("nope".into()).to_string(),
            "unknown tool: nope"
        );
    }
}
