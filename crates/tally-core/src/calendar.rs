//! Calendar month arithmetic shared by the aggregators and analyzers

use std::fmt;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// A calendar month (year + 1-based month)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Build a month, returning None when `month` is outside 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Months since year 0, used for ordering and shifting
    fn index(&self) -> i64 {
        self.year as i64 * 12 + self.month as i64 - 1
    }

    /// Move forward (positive) or backward (negative) by whole months
    pub fn shift(&self, months: i32) -> Self {
        let index = self.index() + months as i64;
        Self {
            year: index
                .div_euclid(12)
                .clamp(i32::MIN as i64, i32::MAX as i64) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn next(&self) -> Self {
        self.shift(1)
    }

    pub fn prev(&self) -> Self {
        self.shift(-1)
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn days_in_month(&self) -> u32 {
        (self.next().first_day() - self.first_day()).num_days() as u32
    }

    /// All calendar days of the month from `from_day` (1-based, inclusive) to month end
    pub fn days_from(&self, from_day: u32) -> impl Iterator<Item = NaiveDate> + '_ {
        let last = self.days_in_month();
        (from_day.max(1)..=last)
            .filter_map(move |day| NaiveDate::from_ymd_opt(self.year, self.month, day))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// `days` calendar days earlier, saturating at the earliest representable date
pub fn days_before(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_sub_days(Days::new(days.into())).unwrap_or(NaiveDate::MIN)
}

/// Saturday and Sunday count as weekend days
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Same calendar day `months` months earlier, clamped to the target month's length
pub fn months_before(date: NaiveDate, months: u32) -> NaiveDate {
    let months = i32::try_from(months).unwrap_or(i32::MAX);
    let target = YearMonth::from_date(date).shift(-months);
    let day = date.day().min(target.days_in_month());
    NaiveDate::from_ymd_opt(target.year, target.month, day).unwrap_or(target.first_day())
}
