//! SMTP delivery over the submission port with STARTTLS.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::response::Code;
use lettre::transport::smtp::PoolConfig;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use rollcall_core::config::MailConfig;
use tracing::{debug, info};

use crate::error::{MailError, Result};
use crate::notice::Notice;
use crate::transport::{MailSession, MailTransport};

/// Reply codes a relay uses to turn down a login: auth required, weak
/// mechanism, bad credentials, temporary auth failure.
const LOGIN_REJECTED: [u16; 4] = [530, 534, 535, 454];

/// Authenticated relay described by [`MailConfig`].
pub struct SmtpRelay {
    host: String,
    port: u16,
    credentials: Credentials,
    from: Mailbox,
}

impl SmtpRelay {
    pub fn new(config: &MailConfig) -> Result<Self> {
        Ok(Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            credentials: Credentials::new(
                config.sender_email.clone(),
                config.sender_password.clone(),
            ),
            from: parse_mailbox(&config.sender_email)?,
        })
    }
}

#[async_trait]
impl MailTransport for SmtpRelay {
    fn name(&self) -> &str {
        "smtp"
    }

    async fn open(&self) -> Result<Box<dyn MailSession>> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(|e| MailError::ConnectionFailed(e.to_string()))?
            .port(self.port)
            .credentials(self.credentials.clone())
            // One connection, reused for every notice of the run.
            .pool_config(PoolConfig::new().max_size(1))
            .build();

        // Connects, upgrades to TLS and logs in; nothing is sent yet.
        match transport.test_connection().await {
            Ok(true) => {}
            Ok(false) => {
                return Err(MailError::ConnectionFailed(format!(
                    "{}:{} did not accept the session",
                    self.host, self.port
                )))
            }
            Err(e) => return Err(session_error(e)),
        }

        info!(host = %self.host, port = self.port, "smtp session established");
        Ok(Box::new(SmtpSession {
            transport: Some(transport),
            from: self.from.clone(),
        }))
    }
}

struct SmtpSession {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
}

#[async_trait]
impl MailSession for SmtpSession {
    async fn send(&mut self, notice: &Notice) -> Result<()> {
        let transport = self.transport.as_ref().ok_or(MailError::Closed)?;
        let message = build_message(&self.from, notice)?;
        transport
            .send(message)
            .await
            .map_err(|e| MailError::SendFailed(e.to_string()))?;
        debug!(
            student_id = %notice.student_id,
            recipients = notice.recipients.len(),
            "message accepted by relay"
        );
        Ok(())
    }

    /// Says QUIT on the pooled connection and waits for it. Dropping the
    /// transport instead would leave that to a detached task.
    async fn close(&mut self) {
        if let Some(transport) = self.transport.take() {
            transport.shutdown().await;
            info!("smtp session closed");
        }
    }
}

/// Splits a failed session check into a rejected login and everything else
/// (DNS, TCP, STARTTLS, greeting).
fn session_error(e: lettre::transport::smtp::Error) -> MailError {
    if is_login_rejection(e.status()) {
        MailError::AuthFailed(e.to_string())
    } else {
        MailError::ConnectionFailed(e.to_string())
    }
}

fn is_login_rejection(status: Option<Code>) -> bool {
    status.is_some_and(|code| LOGIN_REJECTED.contains(&u16::from(code)))
}

/// One plain-text message addressed to every recipient of `notice`.
pub fn build_message(from: &Mailbox, notice: &Notice) -> Result<Message> {
    let mut builder = Message::builder()
        .from(from.clone())
        .subject(notice.subject.as_str())
        .header(ContentType::TEXT_PLAIN);
    for address in &notice.recipients {
        builder = builder.to(parse_mailbox(address)?);
    }
    builder
        .body(notice.body.clone())
        .map_err(|e| MailError::Build(e.to_string()))
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse::<Mailbox>()
        .map_err(|e| MailError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}
