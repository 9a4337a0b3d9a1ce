use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayState {
    Past,
    Unavailable,
    Available,
}

impl DayState {
    pub fn is_selectable(&self) -> bool {
        *self == DayState::Available
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub state: DayState,
}

/// One month laid out for a Sunday-first week grid.
#[derive(Debug, Clone, Serialize)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
}

impl MonthView {
    pub fn title(&self) -> String {
        let name = MONTH_NAMES
            .get(self.month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("?");
        format!("{name} {}", self.year)
    }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.days.iter().find(|d| d.date == date)
    }
}

/// Past wins over unavailable.
pub fn classify_day(date: NaiveDate, today: NaiveDate, unavailable: &BTreeSet<String>) -> DayState {
    if date < today {
        DayState::Past
    } else if unavailable.contains(&date.format("%Y-%m-%d").to_string()) {
        DayState::Unavailable
    } else {
        DayState::Available
    }
}

/// `None` for an invalid month.
pub fn month_view(
    year: i32,
    month: u32,
    today: NaiveDate,
    unavailable: &BTreeSet<String>,
) -> Option<MonthView> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let days = first
        .iter_days()
        .take_while(|d| d.month() == month)
        .map(|date| CalendarDay {
            date,
            state: classify_day(date, today, unavailable),
        })
        .collect();

    Some(MonthView {
        year,
        month,
        leading_blanks: first.weekday().num_days_from_sunday(),
        days,
    })
}

pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

pub fn prev_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}
