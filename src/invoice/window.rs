use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;

use super::record::{parse_timestamp, Invoice};
use crate::error::{ReportError, Result};

/// The three reporting periods, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    LastMonth,
    CurrentMonth,
    YearToDate,
}

impl Period {
    pub const ALL: [Period; 3] = [Period::LastMonth, Period::CurrentMonth, Period::YearToDate];

    pub fn label(self) -> &'static str {
        match self {
            Period::LastMonth => "Last Month Total",
            Period::CurrentMonth => "Current Month Total",
            Period::YearToDate => "Year to Date Total",
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A date range; `start` is always inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub end_inclusive: bool,
}

impl DateWindow {
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        if ts < self.start {
            return false;
        }
        if self.end_inclusive {
            ts <= self.end
        } else {
            ts < self.end
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Windows {
    pub last_month: DateWindow,
    pub current_month: DateWindow,
    pub year_to_date: DateWindow,
}

impl Windows {
    pub fn get(&self, period: Period) -> &DateWindow {
        match period {
            Period::LastMonth => &self.last_month,
            Period::CurrentMonth => &self.current_month,
            Period::YearToDate => &self.year_to_date,
        }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// Derive the three calendar windows from the reference instant `now`
/// Reference instant for the windows.
///
/// Invoice dates are UTC, so the default is the current UTC time. A bare
/// `YYYY-MM-DD` means the last instant of that day, so invoices issued later
/// that day still land in the current month and year to date.
pub fn resolve_reference_time(raw: Option<&str>) -> Result<NaiveDateTime> {
    let Some(raw) = raw else {
        return Ok(Utc::now().naive_utc());
    };

    let parsed = match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => date.and_hms_nano_opt(23, 59, 59, 999_999_999),
        Err(_) => parse_timestamp(raw),
    };
    parsed.ok_or_else(|| ReportError::InvalidDate(raw.to_string()))
}

pub fn compute_windows(now: NaiveDateTime) -> Windows {
    let today = now.date();
    let current_month = first_of_month(today);
    // The day before the 1st is always in the previous month, across year ends too
    let last_month = first_of_month(current_month - Days::new(1));
    let year = today - Days::new(u64::from(today.ordinal0()));

    let start_of_current_month = current_month.and_time(NaiveTime::MIN);

    Windows {
        last_month: DateWindow {
            start: last_month.and_time(NaiveTime::MIN),
            end: start_of_current_month,
            end_inclusive: false,
        },
        current_month: DateWindow {
            start: start_of_current_month,
            end: now,
            end_inclusive: true,
        },
        year_to_date: DateWindow {
            start: year.and_time(NaiveTime::MIN),
            end: now,
            end_inclusive: true,
        },
    }
}

/// Invoices bucketed per period. One invoice may sit in several buckets.
#[derive(Debug, Default)]
pub struct Partitions<'a> {
    pub last_month: Vec<&'a Invoice>,
    pub current_month: Vec<&'a Invoice>,
    pub year_to_date: Vec<&'a Invoice>,
}

impl<'a> Partitions<'a> {
    pub fn get(&self, period: Period) -> &[&'a Invoice] {
        match period {
            Period::LastMonth => &self.last_month,
            Period::CurrentMonth => &self.current_month,
            Period::YearToDate => &self.year_to_date,
        }
    }
}

pub fn partition<'a>(invoices: &'a [Invoice], windows: &Windows) -> Partitions<'a> {
    let mut partitions = Partitions::default();

    for invoice in invoices {
        if windows.last_month.contains(invoice.date) {
            partitions.last_month.push(invoice);
        }
        if windows.current_month.contains(invoice.date) {
            partitions.current_month.push(invoice);
        }
        if windows.year_to_date.contains(invoice.date) {
            partitions.year_to_date.push(invoice);
        }
    }

    partitions
}
