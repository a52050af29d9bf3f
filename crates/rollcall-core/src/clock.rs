use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::error::{CoreError, Result};

/// Offset of the school's local time (Taiwan, UTC+8).
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 8;

/// Build a [`FixedOffset`] east of UTC from whole hours.
pub fn offset_from_hours(hours: i32) -> Result<FixedOffset> {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .ok_or(CoreError::InvalidOffset { hours })
}

/// The local date being evaluated and the wall-clock moment of the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckTime {
    /// The day whose attendance is evaluated.
    pub date: NaiveDate,
    /// When the check ran, in local time.
    pub at: DateTime<FixedOffset>,
}

impl CheckTime {
    /// Current local time at `offset`; `date` is today's local date.
    pub fn now(offset: FixedOffset) -> Self {
        Self::from_instant(Utc::now().with_timezone(&offset))
    }

    pub fn from_instant(at: DateTime<FixedOffset>) -> Self {
        Self {
            date: at.date_naive(),
            at,
        }
    }

    /// Evaluate `date` instead of today, keeping the current local clock time.
    pub fn for_date(date: NaiveDate, offset: FixedOffset) -> Self {
        Self {
            date,
            ..Self::now(offset)
        }
    }

    /// `YYYY-MM-DD`, the format of the `record_date` column.
    pub fn iso_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// `HH:MM` of the check, for the notice body.
    pub fn clock_time(&self) -> String {
        self.at.format("%H:%M").to_string()
    }
}
