//! Budget period windows and the calendar arithmetic behind them.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use once_cell::sync::Lazy;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Sentinel end date for one-off budgets without an explicit end.
pub static FAR_FUTURE: Lazy<NaiveDate> =
    Lazy::new(|| NaiveDate::from_ymd_opt(2099, 12, 31).unwrap());

/// How often a budget resets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PeriodKind {
    Weekly,
    Monthly,
    Yearly,
    Once,
}

impl PeriodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Weekly => "weekly",
            PeriodKind::Monthly => "monthly",
            PeriodKind::Yearly => "yearly",
            PeriodKind::Once => "once",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "weekly" => Some(PeriodKind::Weekly),
            "monthly" => Some(PeriodKind::Monthly),
            "yearly" => Some(PeriodKind::Yearly),
            "once" => Some(PeriodKind::Once),
            _ => None,
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for PeriodKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for PeriodKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        PeriodKind::parse(raw).ok_or(FromSqlError::InvalidType)
    }
}

/// A closed calendar interval; both bounds are inclusive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeriodWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Computes the Nth period window relative to `today`.
///
/// `offset` selects the period: 0 is the period containing `today`, negative
/// values walk backwards, positive values forwards. For `Once` the window is
/// fixed to the budget's own dates and `offset` is ignored. For every other
/// kind the budget's stored start/end dates are not consulted; the window
/// derives solely from `today` and `offset`.
pub fn period_window(
    kind: PeriodKind,
    budget_start: NaiveDate,
    budget_end: Option<NaiveDate>,
    today: NaiveDate,
    offset: i32,
) -> PeriodWindow {
    match kind {
        PeriodKind::Weekly => {
            let ordinal = today.weekday().num_days_from_monday() as i64;
            let start = today - Duration::days(ordinal) + Duration::days(7 * offset as i64);
            PeriodWindow {
                start,
                end: start + Duration::days(6),
            }
        }
        PeriodKind::Monthly => {
            let (year, month) = shift_month(today.year(), today.month(), offset);
            PeriodWindow {
                start: NaiveDate::from_ymd_opt(year, month, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)).unwrap(),
            }
        }
        PeriodKind::Yearly => {
            let year = today.year() + offset;
            PeriodWindow {
                start: NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(year, 12, 31).unwrap(),
            }
        }
        PeriodKind::Once => PeriodWindow {
            start: budget_start,
            end: budget_end.unwrap_or(*FAR_FUTURE),
        },
    }
}

/// Shifts a calendar month by `offset`, carrying year boundaries in both directions.
fn shift_month(year: i32, month: u32, offset: i32) -> (i32, u32) {
    let mut year = year;
    let mut month = month as i32 + offset;
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    (year, month as u32)
}

/// Adds whole calendar months to a date, clamping the day to the target month.
pub fn add_months(date: NaiveDate, offset: i32) -> NaiveDate {
    let (year, month) = shift_month(date.year(), date.month(), offset);
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Number of days in a calendar month under the Gregorian leap rule.
///
/// The fallback arm is unreachable for well-formed months.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}
