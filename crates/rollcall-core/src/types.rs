use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Primary key of a `students` row, also used as the foreign key in
/// `attendances`, `parents` and `communication_logs`.
///
/// The backend may hand back integer or text keys depending on how the table
/// was created. The original shape is kept so it serializes back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StudentId {
    Int(i64),
    Text(String),
}

impl std::fmt::Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StudentId::Int(n) => write!(f, "{n}"),
            StudentId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for StudentId {
    fn from(n: i64) -> Self {
        StudentId::Int(n)
    }
}

impl From<&str> for StudentId {
    fn from(s: &str) -> Self {
        StudentId::Text(s.to_string())
    }
}

/// A row of the `students` table. Extra columns are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    /// Empty when the row has no name; the run goes on for such a student.
    #[serde(
        rename = "real_name",
        alias = "name",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub display_name: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Check-in status recorded for a student on a given day.
///
/// Deployed tables store the Traditional Chinese labels (`已到` / `未到`);
/// English spellings are accepted as well. Anything else is carried verbatim
/// in [`AttendanceStatus::Other`] and never counts as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum AttendanceStatus {
    Arrived,
    NotArrived,
    Other(String),
}

impl std::str::FromStr for AttendanceStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(parse_status(s))
    }
}

impl From<Option<String>> for AttendanceStatus {
    fn from(raw: Option<String>) -> Self {
        raw.as_deref().map_or(AttendanceStatus::Other(String::new()), parse_status)
    }
}

fn parse_status(s: &str) -> AttendanceStatus {
    match s.trim() {
        "已到" | "arrived" => AttendanceStatus::Arrived,
        "未到" | "not-arrived" | "not_arrived" => AttendanceStatus::NotArrived,
        other => AttendanceStatus::Other(other.to_string()),
    }
}

impl From<AttendanceStatus> for String {
    fn from(status: AttendanceStatus) -> Self {
        status.to_string()
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AttendanceStatus::Arrived => "已到",
            AttendanceStatus::NotArrived => "未到",
            AttendanceStatus::Other(s) => s.as_str(),
        };
        write!(f, "{s}")
    }
}

/// A row of the `attendances` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub student_id: StudentId,
    pub record_date: NaiveDate,
    pub status: AttendanceStatus,
}

/// A row of the `parents` table. One student may have any number of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentContact {
    pub student_id: StudentId,
    /// Nullable in the table; blank values are skipped when resolving recipients.
    #[serde(default)]
    pub email: Option<String>,
}

/// A row appended to `communication_logs` after a notice is delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunicationLogEntry {
    pub student_id: StudentId,
    pub notification_type: String,
    pub sent_by: String,
    /// Recipients joined with `", "`, in contact order.
    pub recipient_emails: String,
    pub message_content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_accepts_integer_and_text_ids() {
        let a: Student = serde_json::from_str(r#"{"id":7,"real_name":"王小明"}"#).unwrap();
        let b: Student =
            serde_json::from_str(r#"{"id":"s-7","real_name":"Lin","class":"3A"}"#).unwrap();
        assert_eq!(a.id, StudentId::Int(7));
        assert_eq!(a.display_name, "王小明");
        assert_eq!(b.id, StudentId::Text("s-7".into()));
    }

    #[test]
    fn unnamed_student_does_not_break_the_roster() {
        let roster: Vec<Student> = serde_json::from_str(
            r#"[{"id":1,"real_name":"S1"},{"id":2,"real_name":null},{"id":3}]"#,
        )
        .unwrap();
        assert_eq!(roster.len(), 3);
        assert_eq!(roster[0].display_name, "S1");
        assert_eq!(roster[1].display_name, "");
        assert_eq!(roster[2].display_name, "");
    }

    #[test]
    fn status_labels_parse_in_both_languages() {
        let parse = |s: &str| s.parse::<AttendanceStatus>().unwrap();
        assert_eq!(parse("未到"), AttendanceStatus::NotArrived);
        assert_eq!(parse("not-arrived"), AttendanceStatus::NotArrived);
        assert_eq!(parse("已到"), AttendanceStatus::Arrived);
        assert_eq!(parse("arrived"), AttendanceStatus::Arrived);
        assert_eq!(parse("請假"), AttendanceStatus::Other("請假".into()));
    }

    #[test]
    fn null_status_deserializes_as_other() {
        let rec: AttendanceRecord = serde_json::from_str(
            r#"{"student_id":1,"record_date":"2026-10-19","status":null}"#,
        )
        .unwrap();
        assert_eq!(rec.status, AttendanceStatus::Other(String::new()));
        assert_eq!(rec.record_date, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
    }

    #[test]
    fn stored_status_goes_through_the_same_labels() {
        let status = |json: &str| serde_json::from_str::<AttendanceStatus>(json).unwrap();
        assert_eq!(status(r#"" 未到 ""#), AttendanceStatus::NotArrived);
        assert_eq!(status(r#""not_arrived""#), AttendanceStatus::NotArrived);
        assert_eq!(status(r#""已到""#), AttendanceStatus::Arrived);
        assert_eq!(status(r#""請假""#), AttendanceStatus::Other("請假".into()));
    }

    #[test]
    fn parent_email_may_be_missing() {
        let p: ParentContact = serde_json::from_str(r#"{"student_id":1}"#).unwrap();
        assert!(p.email.is_none());
    }

    #[test]
    fn log_entry_keeps_integer_student_id() {
        let entry = CommunicationLogEntry {
            student_id: StudentId::Int(3),
            notification_type: "late arrival auto-notice".into(),
            sent_by: "System Cron".into(),
            recipient_emails: "a@x.com, b@x.com".into(),
            message_content: "body".into(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["student_id"], serde_json::json!(3));
        assert_eq!(json["recipient_emails"], "a@x.com, b@x.com");
    }
}
