use async_trait::async_trait;
use chrono::NaiveDate;
use rollcall_core::{AttendanceRecord, CommunicationLogEntry, ParentContact, Student};

use crate::error::Result;

pub const STUDENTS: &str = "students";
pub const ATTENDANCES: &str = "attendances";
pub const PARENTS: &str = "parents";
pub const COMMUNICATION_LOGS: &str = "communication_logs";

/// The four backend tables the daily job touches.
///
/// One handle is built per run and passed to whichever routine needs it.
/// Calls are made one at a time; implementations need not support
/// concurrent use beyond `Send + Sync`.
#[async_trait]
pub trait RosterStore: Send + Sync {
    /// Every row of `students`, in the order the backend returns them.
    async fn students(&self) -> Result<Vec<Student>>;

    /// Rows of `attendances` whose `record_date` equals `date`.
    async fn attendances_on(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>>;

    /// Every row of `parents`.
    async fn parents(&self) -> Result<Vec<ParentContact>>;

    /// Append one row to `communication_logs`.
    async fn append_log(&self, entry: &CommunicationLogEntry) -> Result<()>;
}
