use rollcall_core::CoreError;
use rollcall_mailer::MailError;
use rollcall_store::StoreError;
use thiserror::Error;

/// Conditions that stop a run. Per-student delivery problems never show up
/// here; they are logged and counted in the run summary instead.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("Could not build backend client: {0}")]
    Backend(#[source] StoreError),

    #[error("Fetching `{table}` failed: {source}")]
    Fetch {
        table: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Mail transport unavailable: {0}")]
    Transport(#[source] MailError),
}

pub type Result<T> = std::result::Result<T, JobError>;
