use thiserror::Error;

/// Errors that can occur while opening a mail session or delivering a notice.
#[derive(Debug, Error)]
pub enum MailError {
    /// The relay could not be reached or refused STARTTLS.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The relay rejected the sender credentials.
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// A sender or recipient address could not be parsed.
    #[error("Invalid address `{address}`: {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The message could not be assembled.
    #[error("Message build failed: {0}")]
    Build(String),

    /// The relay did not accept the message.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// The session was used after `close`.
    #[error("Session closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, MailError>;
