use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Pricing tier for a single calendar night.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateCategory {
    Weekday,
    Friday,
    Weekend,
    Sunday,
    Holiday,
}

impl RateCategory {
    pub fn label_zh(&self) -> &'static str {
        match self {
            Self::Weekday => "平日",
            Self::Friday => "週五",
            Self::Weekend => "週六",
            Self::Sunday => "週日",
            Self::Holiday => "連假",
        }
    }
}

/// Explicit holiday dates for the operative calendar years. There is no
/// recurrence rule: each year's table is supplied by configuration, and a
/// missing year is a configuration gap rather than a runtime error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    dates: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self { dates: dates.into_iter().collect() }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn covers_year(&self, year: i32) -> bool {
        self.dates.iter().any(|date| date.year() == year)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Holiday membership wins over the day-of-week mapping. Total over any date.
pub fn classify(date: NaiveDate, holidays: &HolidayCalendar) -> RateCategory {
    if holidays.contains(date) {
        return RateCategory::Holiday;
    }

    match date.weekday() {
        Weekday::Fri => RateCategory::Friday,
        Weekday::Sat => RateCategory::Weekend,
        Weekday::Sun => RateCategory::Sunday,
        _ => RateCategory::Weekday,
    }
}
