use thiserror::Error;

/// Errors raised while reading from or writing to the backend tables.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend rejected request on `{table}` ({status}): {message}")]
    Api {
        table: String,
        status: u16,
        message: String,
    },

    /// The response body did not match the expected row shape.
    #[error("could not decode `{table}` rows: {reason}")]
    Decode { table: String, reason: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
