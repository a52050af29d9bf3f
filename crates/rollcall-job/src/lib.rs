//! `rollcall-job` — one pass of the daily absence notice job.
//!
//! [`run::run_daily`] fetches the roster, today's check-ins and the guardian
//! contacts, works out who is absent, and hands that list to
//! [`notifier::notify_guardians`], which mails each student's guardians and
//! appends an audit row per delivered notice.

pub mod error;
pub mod notifier;
pub mod run;

pub use error::{JobError, Result};
pub use notifier::RunSummary;
pub use run::{run_daily, RunOptions};
