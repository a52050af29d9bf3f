use async_trait::async_trait;

use crate::{error::Result, notice::Notice};

/// Opens mail sessions. Implemented by the SMTP relay and by test doubles.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Stable lowercase identifier for log lines (e.g. `"smtp"`).
    fn name(&self) -> &str;

    /// Connect and authenticate.
    ///
    /// An `Err` here means no notice can be sent this run; callers treat it
    /// as fatal rather than attempting individual sends.
    async fn open(&self) -> Result<Box<dyn MailSession>>;
}

/// An authenticated session, used serially for every notice of one run.
#[async_trait]
pub trait MailSession: Send {
    /// Deliver one notice to all of its recipients as a single message.
    async fn send(&mut self, notice: &Notice) -> Result<()>;

    /// Release the session. Sends after `close` return [`MailError::Closed`].
    ///
    /// [`MailError::Closed`]: crate::error::MailError::Closed
    async fn close(&mut self);
}
