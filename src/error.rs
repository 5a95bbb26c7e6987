use thiserror::Error;

/// Type alias for Result with ReorgError
pub type Result<T> = std::result::Result<T, ReorgError>;

/// Error types for the mailbox reorganizer
#[derive(Error, Debug)]
pub enum ReorgError {
    /// TCP connection could not be established or was lost
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// TLS setup or handshake failed
    #[error("TLS error: {0}")]
    TlsError(String),

    /// Connecting or logging in took longer than the configured timeout
    #[error("Timed out after {secs} seconds while {during}")]
    Timeout { secs: u64, during: String },

    /// Login rejected by the server
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// Server answered NO/BAD or sent something unparseable
    #[error("IMAP error: {0}")]
    ImapError(String),

    /// Folder name cannot be sent on the wire
    #[error("Invalid mailbox name: {0}")]
    InvalidMailboxName(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// User cancelled operation
    #[error("Operation cancelled: {0}")]
    OperationCancelled(String),

    /// Interactive prompt failed
    #[error("Prompt error: {0}")]
    PromptError(String),
}

impl ReorgError {
    /// Errors that abort the run before any planning happens
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ReorgError::ConnectionError(_)
                | ReorgError::TlsError(_)
                | ReorgError::Timeout { .. }
                | ReorgError::AuthError(_)
        )
    }

    /// What the user can check after a fatal error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ReorgError::AuthError(_) => Some(
                "Make sure you're using an App Password, not your regular password.\n\
                 Create one at: https://myaccount.google.com/apppasswords",
            ),
            e if e.is_fatal() => Some(
                "Check the [server] host, port and timeout_secs settings and that IMAP is \
                 enabled for the account.",
            ),
            _ => None,
        }
    }
}

impl From<async_imap::error::Error> for ReorgError {
    fn from(error: async_imap::error::Error) -> Self {
        match error {
            async_imap::error::Error::No(msg) => ReorgError::ImapError(format!("NO {}", msg)),
            async_imap::error::Error::Bad(msg) => ReorgError::ImapError(format!("BAD {}", msg)),
            async_imap::error::Error::Io(e) => ReorgError::ConnectionError(e.to_string()),
            async_imap::error::Error::ConnectionLost => {
                ReorgError::ConnectionError("connection lost".to_string())
            }
            other => ReorgError::ImapError(other.to_string()),
        }
    }
}

impl From<inquire::InquireError> for ReorgError {
    fn from(error: inquire::InquireError) -> Self {
        match error {
            inquire::InquireError::OperationCanceled
            | inquire::InquireError::OperationInterrupted => {
                ReorgError::OperationCancelled("prompt dismissed".to_string())
            }
            other => ReorgError::PromptError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_errors() {
        assert!(ReorgError::AuthError("bad password".to_string()).is_fatal());
        assert!(ReorgError::ConnectionError("refused".to_string()).is_fatal());
        assert!(ReorgError::Timeout {
            secs: 30,
            during: "logging in".to_string()
        }
        .is_fatal());
    }

    #[test]
    fn test_operation_errors_are_not_fatal() {
        assert!(!ReorgError::ImapError("NO [NONEXISTENT] Unknown Mailbox".to_string()).is_fatal());
        assert!(!ReorgError::InvalidMailboxName("a\r\nb".to_string()).is_fatal());
    }

    #[test]
    fn test_hints_only_for_fatal_errors() {
        let auth = ReorgError::AuthError("[AUTHENTICATIONFAILED]".to_string());
        assert!(auth.hint().unwrap().contains("App Password"));

        let timeout = ReorgError::Timeout {
            secs: 30,
            during: "negotiating TLS".to_string(),
        };
        assert!(timeout.hint().unwrap().contains("[server]"));

        assert!(ReorgError::ConfigError("port must be non-zero".to_string())
            .hint()
            .is_none());
    }

    #[test]
    fn test_from_imap_no_response() {
        let err: ReorgError =
            async_imap::error::Error::No("[ALREADYEXISTS] Duplicate folder name".to_string()).into();
        let display = err.to_string();
        assert!(display.contains("IMAP error"));
        assert!(display.contains("ALREADYEXISTS"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_from_imap_io_is_connection_error() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: ReorgError = async_imap::error::Error::Io(io).into();
        assert!(matches!(err, ReorgError::ConnectionError(_)));
    }

    #[test]
    fn test_from_prompt_cancel() {
        let err: ReorgError = inquire::InquireError::OperationCanceled.into();
        assert!(matches!(err, ReorgError::OperationCancelled(_)));
    }

    #[test]
    fn test_timeout_display() {
        let err = ReorgError::Timeout {
            secs: 30,
            during: "connecting".to_string(),
        };
        assert_eq!(err.to_string(), "Timed out after 30 seconds while connecting");
    }
}
