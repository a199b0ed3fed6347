//! Date stepping for future rows

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// How the forecaster advances from one date to the next
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPolicy {
    /// Monday to Friday, no holiday calendar
    #[default]
    BusinessDay,
    /// Every calendar day
    CalendarDay,
}

impl StepPolicy {
    /// Map the exclude-weekends switch onto a policy
    pub fn from_exclude_weekends(exclude_weekends: bool) -> Self {
        if exclude_weekends {
            StepPolicy::BusinessDay
        } else {
            StepPolicy::CalendarDay
        }
    }

    /// Whether weekends are skipped
    pub fn excludes_weekends(self) -> bool {
        matches!(self, StepPolicy::BusinessDay)
    }

    /// The first date strictly after `date` allowed by the policy
    pub fn next_date(self, date: NaiveDate) -> NaiveDate {
        let mut next = date + Duration::days(1);
        if self.excludes_weekends() {
            while is_weekend(next) {
                next += Duration::days(1);
            }
        }
        next
    }

    /// The `count` successive dates following `last`
    pub fn future_dates(self, last: NaiveDate, count: usize) -> Vec<NaiveDate> {
        let mut dates = Vec::with_capacity(count);
        let mut current = last;
        for _ in 0..count {
            current = self.next_date(current);
            dates.push(current);
        }
        dates
    }
}

/// Saturday or Sunday
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
