use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashSet;

use crate::event::NonWorkingDay;

const WEEKEND_DAYS_PER_WEEK: i64 = 2;

/// Signed number of business days from `start` to `end`.
///
/// Whole weeks are assumed to carry exactly two weekend days; the weekday of
/// each individual date is never inspected. Every distinct date of `excluded`
/// lying in the closed interval between the two bounds is subtracted as well,
/// including exclusions that already fall on a weekend.
pub fn business_days_between(start: NaiveDate, end: NaiveDate, excluded: &[NaiveDate]) -> i64 {
    ExclusionSet::from_dates(excluded.iter().copied()).business_days_between(start, end)
}

/// The distinct calendar dates removed from business-day counting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    dates: HashSet<NaiveDate>,
}

impl ExclusionSet {
    pub fn from_dates<I>(dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    /// Reduce non-working day records to their dates.
    pub fn from_days(days: &[NonWorkingDay]) -> Self {
        Self::from_dates(days.iter().map(|day| day.date))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    /// Count exclusions inside the closed interval between `a` and `b`, in either order.
    pub fn count_within(&self, a: NaiveDate, b: NaiveDate) -> i64 {
        let (lower, upper) = if a <= b { (a, b) } else { (b, a) };
        self.dates
            .iter()
            .filter(|date| **date >= lower && **date <= upper)
            .count() as i64
    }

    pub fn business_days_between(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        if start == end {
            return 0;
        }
        let total_days = (end - start).num_days();
        // Integer division truncates toward zero, keeping the sign of total_days.
        let weeks = total_days / 7;
        total_days - WEEKEND_DAYS_PER_WEEK * weeks - self.count_within(start, end) - 1
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
