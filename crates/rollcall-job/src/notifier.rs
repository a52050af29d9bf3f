use rollcall_core::config::NoticeConfig;
use rollcall_core::{guardian_emails, CheckTime, CommunicationLogEntry, ParentContact, Student};
use rollcall_mailer::{MailSession, Notice};
use rollcall_store::RosterStore;
use tracing::{error, info, warn};

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Students classified absent.
    pub absent: usize,
    /// Notices accepted by the relay.
    pub sent: usize,
    /// Absent students with no guardian email on file.
    pub skipped: usize,
    /// Notices the relay did not accept.
    pub failed: usize,
    /// Sent notices whose audit row could not be written.
    pub unlogged: usize,
}

enum Outcome {
    Sent,
    SentUnlogged,
    Skipped,
    Failed,
}

/// Mail every absent student's guardians, one message per student, in order.
///
/// Nothing here aborts the run: a missing contact, a rejected message or a
/// failed audit insert only affects the student concerned.
pub async fn notify_guardians(
    session: &mut dyn MailSession,
    store: &dyn RosterStore,
    absent: &[Student],
    contacts: &[ParentContact],
    check: &CheckTime,
    labels: &NoticeConfig,
) -> RunSummary {
    let mut summary = RunSummary {
        absent: absent.len(),
        ..RunSummary::default()
    };

    for student in absent {
        match notify_one(session, store, student, contacts, check, labels).await {
            Outcome::Sent => summary.sent += 1,
            Outcome::SentUnlogged => {
                summary.sent += 1;
                summary.unlogged += 1;
            }
            Outcome::Skipped => summary.skipped += 1,
            Outcome::Failed => summary.failed += 1,
        }
    }
    summary
}

async fn notify_one(
    session: &mut dyn MailSession,
    store: &dyn RosterStore,
    student: &Student,
    contacts: &[ParentContact],
    check: &CheckTime,
    labels: &NoticeConfig,
) -> Outcome {
    let recipients = guardian_emails(contacts, &student.id);
    let Some(notice) = Notice::compose(student, recipients, check) else {
        warn!(
            student_id = %student.id,
            name = %student.display_name,
            "no guardian email on file, skipping"
        );
        return Outcome::Skipped;
    };

    if let Err(e) = session.send(&notice).await {
        error!(
            student_id = %student.id,
            name = %student.display_name,
            error = %e,
            "notice delivery failed"
        );
        return Outcome::Failed;
    }
    info!(
        student_id = %student.id,
        name = %student.display_name,
        recipients = %notice.recipient_list(),
        "notice sent"
    );

    let entry = audit_entry(&notice, labels);
    match store.append_log(&entry).await {
        Ok(()) => Outcome::Sent,
        Err(e) => {
            error!(student_id = %student.id, error = %e, "notice sent but audit row not written");
            Outcome::SentUnlogged
        }
    }
}

/// The `communication_logs` row for a delivered notice.
pub fn audit_entry(notice: &Notice, labels: &NoticeConfig) -> CommunicationLogEntry {
    CommunicationLogEntry {
        student_id: notice.student_id.clone(),
        notification_type: labels.notification_type.clone(),
        sent_by: labels.sent_by.clone(),
        recipient_emails: notice.recipient_list(),
        message_content: notice.body.clone(),
    }
}

/// Log what a live run would send, without opening a session or writing rows.
pub fn preview(absent: &[Student], contacts: &[ParentContact], check: &CheckTime) -> RunSummary {
    let mut summary = RunSummary {
        absent: absent.len(),
        ..RunSummary::default()
    };
    for student in absent {
        let recipients = guardian_emails(contacts, &student.id);
        match Notice::compose(student, recipients, check) {
            Some(notice) => info!(
                student_id = %student.id,
                name = %student.display_name,
                recipients = %notice.recipient_list(),
                subject = %notice.subject,
                "dry run: would send notice"
            ),
            None => {
                warn!(
                    student_id = %student.id,
                    name = %student.display_name,
                    "dry run: no guardian email on file"
                );
                summary.skipped += 1;
            }
        }
    }
    summary
}
