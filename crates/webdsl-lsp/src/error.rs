//! LSP error types.

/// JSON-RPC error codes used in responses.
pub mod codes {
    /// Invalid JSON was received.
    pub const PARSE_ERROR: i32 = -32700;
    /// The message is not a valid request object, or is not legal in the
    /// current session state.
    pub const INVALID_REQUEST: i32 = -32600;
    /// The method does not exist.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid method parameters.
    pub const INVALID_PARAMS: i32 = -32602;
    /// A request arrived before `initialize`.
    pub const SERVER_NOT_INITIALIZED: i32 = -32002;
}

/// Errors from the language server and launcher.
#[derive(Debug, thiserror::Error)]
pub enum LspError {
    /// Backend process failed to start.
    #[error("server failed to start: {0}")]
    SpawnFailed(String),

    /// A protocol-level error that is answered with a JSON-RPC error.
    #[error("JSON-RPC error {code}: {message}")]
    Rpc {
        /// The error code.
        code: i32,
        /// The error message.
        message: String,
    },

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame or message did not follow the base protocol.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// The outgoing message channel has been closed.
    #[error("outgoing channel closed")]
    ChannelClosed,
}

impl LspError {
    /// Shorthand for an `Rpc` error.
    pub fn rpc(code: i32, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
        }
    }

    /// The JSON-RPC code this error is reported with.
    pub fn code(&self) -> i32 {
        match self {
            Self::Rpc { code, .. } => *code,
            Self::Serialization(_) => codes::PARSE_ERROR,
            Self::InvalidMessage(_) => codes::INVALID_REQUEST,
            _ => codes::INVALID_REQUEST,
        }
    }
}

impl From<serde_json::Error> for LspError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_spawn_failed_display() {
        let err = LspError::SpawnFailed("webdsl-ls: not found".into());
        assert_eq!(err.to_string(), "server failed to start: webdsl-ls: not found");
    }

    #[test]
    fn error_rpc_display() {
        let err = LspError::rpc(codes::METHOD_NOT_FOUND, "method not found: foo");
        assert_eq!(err.to_string(), "JSON-RPC error -32601: method not found: foo");
        assert_eq!(err.code(), -32601);
    }

    #[test]
    fn error_serialization_display() {
        let err = LspError::Serialization("bad json".into());
        assert_eq!(err.to_string(), "serialization error: bad json");
        assert_eq!(err.code(), codes::PARSE_ERROR);
    }

    #[test]
    fn error_io_from() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broken");
        let err = LspError::from(io);
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn error_invalid_message_display() {
        let err = LspError::InvalidMessage("missing Content-Length header".into());
        assert_eq!(
            err.to_string(),
            "invalid message: missing Content-Length header"
        );
        assert_eq!(err.code(), codes::INVALID_REQUEST);
    }

    #[test]
    fn error_channel_closed_display() {
        assert_eq!(LspError::ChannelClosed.to_string(), "outgoing channel closed");
    }

    #[test]
    fn serde_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = LspError::from(json_err);
        assert!(matches!(err, LspError::Serialization(_)));
    }
}
