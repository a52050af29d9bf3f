use rollcall_core::{CheckTime, Student, StudentId};

/// A rendered absence notice for one student, addressed to all of their guardians.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub student_id: StudentId,
    pub student_name: String,
    /// Guardian addresses in contact order. Never empty for a composed notice.
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl Notice {
    /// Render the notice for `student`. Returns `None` when there is nobody to send to.
    pub fn compose(student: &Student, recipients: Vec<String>, check: &CheckTime) -> Option<Self> {
        if recipients.is_empty() {
            return None;
        }
        let name = match student.display_name.trim() {
            "" => format!("student {}", student.id),
            name => name.to_string(),
        };
        Some(Self {
            student_id: student.id.clone(),
            subject: subject_line(&name),
            body: render_body(&name, check),
            student_name: name,
            recipients,
        })
    }

    /// Recipients as stored in the audit log: `"a@x.com, b@x.com"`.
    pub fn recipient_list(&self) -> String {
        self.recipients.join(", ")
    }
}

fn subject_line(name: &str) -> String {
    format!("⚠️ School attendance notice - {name} has not checked in")
}

fn render_body(name: &str, check: &CheckTime) -> String {
    format!(
        "Dear parent or guardian,\n\n\
         Our attendance system has no check-in recorded for your child 【{name}】 \
         today ({date}) as of {time}.\n\n\
         If your child is on leave, please disregard this message. If your child has \
         already left for school, please look out for their safety on the way, and feel \
         free to reach the homeroom teacher through the contact book or by phone.\n\n\
         Homeroom Teacher\n\
         (This message was sent automatically. Please do not reply.)",
        date = check.iso_date(),
        time = check.clock_time(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn check() -> CheckTime {
        let offset = FixedOffset::east_opt(8 * 3600).unwrap();
        CheckTime::from_instant(offset.with_ymd_and_hms(2026, 10, 19, 8, 5, 0).unwrap())
    }

    fn student() -> Student {
        Student {
            id: StudentId::Int(2),
            display_name: "陳小華".to_string(),
        }
    }

    #[test]
    fn body_carries_name_date_and_time() {
        let notice = Notice::compose(&student(), vec!["p2@x.com".into()], &check()).unwrap();
        assert!(notice.subject.contains("陳小華"));
        assert!(notice.body.contains("【陳小華】"));
        assert!(notice.body.contains("2026-10-19"));
        assert!(notice.body.contains("08:05"));
        assert!(notice.body.contains("no check-in recorded"));
    }

    #[test]
    fn recipients_join_with_comma_space() {
        let notice = Notice::compose(
            &student(),
            vec!["a@x.com".into(), "b@x.com".into()],
            &check(),
        )
        .unwrap();
        assert_eq!(notice.recipient_list(), "a@x.com, b@x.com");
    }

    #[test]
    fn no_recipients_means_no_notice() {
        assert!(Notice::compose(&student(), Vec::new(), &check()).is_none());
    }

    #[test]
    fn unnamed_student_is_addressed_by_id() {
        let unnamed = Student {
            id: StudentId::Int(9),
            display_name: String::new(),
        };
        let notice = Notice::compose(&unnamed, vec!["p9@x.com".into()], &check()).unwrap();
        assert_eq!(notice.student_name, "student 9");
        assert!(notice.body.contains("【student 9】"));
    }
}
