use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::types::{AttendanceRecord, AttendanceStatus, ParentContact, Student, StudentId};

/// Students with no check-in on `date`, in roster order.
///
/// A student is absent when there is no record for them dated `date`, or
/// when that record's status is not-arrived. Records for other dates are
/// ignored. If a student has several records that day, the first one wins.
pub fn find_absent(
    students: &[Student],
    records: &[AttendanceRecord],
    date: NaiveDate,
) -> Vec<Student> {
    let mut today: HashMap<&StudentId, &AttendanceRecord> = HashMap::new();
    for record in records.iter().filter(|r| r.record_date == date) {
        if today.contains_key(&record.student_id) {
            debug!(student_id = %record.student_id, "duplicate attendance record ignored");
            continue;
        }
        today.insert(&record.student_id, record);
    }

    students
        .iter()
        .filter(|s| match today.get(&s.id) {
            None => true,
            Some(r) => r.status == AttendanceStatus::NotArrived,
        })
        .cloned()
        .collect()
}

/// Non-blank guardian emails for `student`, in contact order.
pub fn guardian_emails(contacts: &[ParentContact], student: &StudentId) -> Vec<String> {
    contacts
        .iter()
        .filter(|c| &c.student_id == student)
        .filter_map(|c| c.email.as_deref())
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(String::from)
        .collect()
}
