//! Inclusive ranges of calendar days used to load several days at once.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// An inclusive `first..=last` span of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayRange {
    first: NaiveDate,
    last: NaiveDate,
}

impl DayRange {
    /// Returns `None` when `last` is before `first`.
    pub fn new(first: NaiveDate, last: NaiveDate) -> Option<Self> {
        (first <= last).then_some(Self { first, last })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self {
            first: day,
            last: day,
        }
    }

    /// Every day of the given month.
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Self::new(first, next_month.pred_opt()?)
    }

    pub fn first(&self) -> NaiveDate {
        self.first
    }

    pub fn last(&self) -> NaiveDate {
        self.last
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.first <= day && day <= self.last
    }

    pub fn len(&self) -> usize {
        (self.last - self.first).num_days() as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Days in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let last = self.last;
        self.first.iter_days().take_while(move |d| *d <= last)
    }
}

impl From<NaiveDate> for DayRange {
    fn from(day: NaiveDate) -> Self {
        Self::single(day)
    }
}

/// Week (Monday to Sunday) containing `day`, or `None` when the week runs
/// past the representable calendar.
pub fn week_of(day: NaiveDate) -> Option<DayRange> {
    let back = i64::from(day.weekday().num_days_from_monday());
    let monday = day.checked_sub_signed(chrono::Duration::days(back))?;
    let sunday = monday.checked_add_signed(chrono::Duration::days(6))?;
    DayRange::new(monday, sunday)
}
