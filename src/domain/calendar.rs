// src/domain/calendar.rs

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::domain::entities::Appointment;
use crate::store::Stored;

/// Calendar date of an ISO date-time, as written (no timezone shift).
///
/// Accepts RFC 3339, `datetime-local` values with or without seconds, and a
/// bare date. Anything else has no calendar day.
pub fn calendar_day(date_time: &str) -> Option<NaiveDate> {
    let s = date_time.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// First and last day of the month, `None` for an invalid year/month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

/// Every calendar day of the month, first to last.
pub fn days_of_month(year: i32, month: u32) -> Vec<NaiveDate> {
    let Some((first, last)) = month_bounds(year, month) else {
        return Vec::new();
    };
    first.iter_days().take_while(|d| *d <= last).collect()
}

pub fn appointments_on<'a>(
    appointments: &'a [Stored<Appointment>],
    day: NaiveDate,
) -> Vec<&'a Stored<Appointment>> {
    appointments
        .iter()
        .filter(|a| calendar_day(&a.data.date_time) == Some(day))
        .collect()
}

#[derive(Debug, Clone)]
pub struct DayBucket<'a> {
    pub date: NaiveDate,
    pub appointments: Vec<&'a Stored<Appointment>>,
}

impl DayBucket<'_> {
    pub fn day(&self) -> u32 {
        self.date.day()
    }
}

/// One bucket per day of the month, in order, including empty days.
pub fn bin_month(appointments: &[Stored<Appointment>], year: i32, month: u32) -> Vec<DayBucket<'_>> {
    days_of_month(year, month)
        .into_iter()
        .map(|date| DayBucket {
            date,
            appointments: appointments_on(appointments, date),
        })
        .collect()
}
