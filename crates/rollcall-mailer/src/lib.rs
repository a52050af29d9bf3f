//! `rollcall-mailer` — absence notices and the mail transport that delivers them.
//!
//! A [`MailTransport`] opens one authenticated [`MailSession`] per run; the
//! session sends one [`Notice`] per absent student and is closed after the loop.

pub mod error;
pub mod notice;
pub mod smtp;
pub mod transport;

pub use error::{MailError, Result};
pub use notice::Notice;
pub use smtp::SmtpRelay;
pub use transport::{MailSession, MailTransport};
