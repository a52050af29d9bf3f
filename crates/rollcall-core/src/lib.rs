//! `rollcall-core` — shared types for the daily absence notice job.
//!
//! # Overview
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | `config`   | Layered configuration (TOML file + env overrides)          |
//! | `error`    | [`CoreError`] and the crate-level [`Result`] alias          |
//! | `types`    | Rows of the `students`, `attendances`, `parents` and       |
//! |            | `communication_logs` tables                                |
//! | `clock`    | Fixed-offset local date/time used for "today"              |
//! | `absence`  | Absence evaluation and guardian lookup                     |

pub mod absence;
pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use absence::{find_absent, guardian_emails};
pub use clock::CheckTime;
pub use config::RollcallConfig;
pub use error::{CoreError, Result};
pub use types::{
    AttendanceRecord, AttendanceStatus, CommunicationLogEntry, ParentContact, Student, StudentId,
};
