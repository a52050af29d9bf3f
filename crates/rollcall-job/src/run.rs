use rollcall_core::config::NoticeConfig;
use rollcall_core::{find_absent, CheckTime, ParentContact, Student};
use rollcall_mailer::MailTransport;
use rollcall_store::store::{ATTENDANCES, PARENTS, STUDENTS};
use rollcall_store::RosterStore;
use tracing::info;

use crate::error::{JobError, Result};
use crate::notifier::{notify_guardians, preview, RunSummary};

/// Inputs of one run that do not come from the backend.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub check: CheckTime,
    pub labels: NoticeConfig,
    /// Evaluate and render, but open no mail session and write nothing.
    pub dry_run: bool,
}

/// Absent students and the contact table needed to reach their guardians.
struct Evaluation {
    absent: Vec<Student>,
    contacts: Vec<ParentContact>,
}

/// One full pass: evaluate, then notify.
///
/// Returns `Err` only for the fatal cases: a failed fetch, or a mail session
/// that cannot be opened. With nobody absent, no session is opened.
pub async fn run_daily(
    store: &dyn RosterStore,
    transport: &dyn MailTransport,
    opts: &RunOptions,
) -> Result<RunSummary> {
    info!(date = %opts.check.iso_date(), time = %opts.check.clock_time(), "absence check started");

    let Evaluation { absent, contacts } = evaluate(store, &opts.check).await?;

    if absent.is_empty() {
        info!("every student has checked in, no notices to send");
        return Ok(RunSummary::default());
    }
    info!(count = absent.len(), "students without a check-in");

    if opts.dry_run {
        let summary = preview(&absent, &contacts, &opts.check);
        info!(?summary, "dry run finished");
        return Ok(summary);
    }

    let mut session = transport.open().await.map_err(JobError::Transport)?;
    let summary = notify_guardians(
        session.as_mut(),
        store,
        &absent,
        &contacts,
        &opts.check,
        &opts.labels,
    )
    .await;
    session.close().await;

    info!(
        transport = transport.name(),
        absent = summary.absent,
        sent = summary.sent,
        skipped = summary.skipped,
        failed = summary.failed,
        unlogged = summary.unlogged,
        "absence check finished"
    );
    Ok(summary)
}

/// Fetch all three tables, then classify. Any fetch error aborts before
/// classification starts.
async fn evaluate(store: &dyn RosterStore, check: &CheckTime) -> Result<Evaluation> {
    let students = store.students().await.map_err(|source| JobError::Fetch {
        table: STUDENTS,
        source,
    })?;
    let attendances = store
        .attendances_on(check.date)
        .await
        .map_err(|source| JobError::Fetch {
            table: ATTENDANCES,
            source,
        })?;
    let contacts = store.parents().await.map_err(|source| JobError::Fetch {
        table: PARENTS,
        source,
    })?;
    info!(
        students = students.len(),
        attendances = attendances.len(),
        contacts = contacts.len(),
        "tables loaded"
    );

    Ok(Evaluation {
        absent: find_absent(&students, &attendances, check.date),
        contacts,
    })
}
