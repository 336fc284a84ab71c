//! Error types for vmignore

use thiserror::Error;

/// Result type alias using vmignore Error
pub type Result<T> = std::result::Result<T, Error>;

/// vmignore error types
#[derive(Error, Debug)]
pub enum Error {
    // === Session Errors ===
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Transport error: {0}")]
    Transport(String),

    // === Response Errors ===
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("{message}")]
    Operation { message: String },

    #[error("{0}")]
    NotFound(String),

    // === Input Errors ===
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this error is fatal (should end the interactive session)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::AuthenticationFailed(_) | Error::Configuration(_) | Error::Io(_)
        )
    }

    /// Get an error code for logging
    pub fn code(&self) -> &'static str {
        match self {
            Error::AuthenticationFailed(_) => "AUTH_FAILED",
            Error::Transport(_) => "TRANSPORT_ERROR",
            Error::Parse(_) => "PARSE_ERROR",
            Error::Operation { .. } => "OPERATION_ERROR",
            Error::NotFound(_) => "NOT_FOUND",
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::Configuration(_) => "CONFIG_ERROR",
            Error::Io(_) => "IO_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(Error::AuthenticationFailed("bad password".into()).is_fatal());
        assert!(Error::Configuration("bad header".into()).is_fatal());
        // A timed-out call fails that action only
        assert!(!Error::Transport("timed out".into()).is_fatal());
        assert!(!Error::Parse("unexpected end".into()).is_fatal());
        assert!(!Error::Operation {
            message: "Invalid QID".into()
        }
        .is_fatal());
        assert!(!Error::NotFound("host".into()).is_fatal());
    }

    #[test]
    fn test_operation_message_is_verbatim() {
        let err = Error::Operation {
            message: "Invalid QID".into(),
        };
        assert_eq!(err.to_string(), "Invalid QID");
        assert_eq!(err.code(), "OPERATION_ERROR");
    }
}
