// Shelf - Smart shelves for a personal media library
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Calendar arithmetic for relative date operators
//!
//! All periods are computed in UTC. Months and years are subtracted on the
//! calendar (Mar 31 minus one month is Feb 28/29), weeks are seven days and
//! weeks start on Monday.

use crate::rules::value::start_of_day;
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};

/// Unit for WITHIN_LAST / OLDER_THAN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Days,
    Weeks,
    Months,
    Years,
}

impl TimeUnit {
    /// Accepts singular or plural, any case
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "day" | "days" => Some(TimeUnit::Days),
            "week" | "weeks" => Some(TimeUnit::Weeks),
            "month" | "months" => Some(TimeUnit::Months),
            "year" | "years" => Some(TimeUnit::Years),
            _ => None,
        }
    }
}

/// Calendar period for THIS_PERIOD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
}

impl Period {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "day" | "days" | "today" => Some(Period::Day),
            "week" | "weeks" => Some(Period::Week),
            "month" | "months" => Some(Period::Month),
            "year" | "years" => Some(Period::Year),
            _ => None,
        }
    }
}

/// `now - count * unit`
///
/// Returns `None` when the result falls outside chrono's representable range.
pub fn threshold(now: DateTime<Utc>, count: i64, unit: TimeUnit) -> Option<DateTime<Utc>> {
    match unit {
        TimeUnit::Days => now.checked_sub_signed(Duration::try_days(count)?),
        TimeUnit::Weeks => now.checked_sub_signed(Duration::try_weeks(count)?),
        TimeUnit::Months => shift_months(now, count),
        TimeUnit::Years => shift_months(now, count.checked_mul(12)?),
    }
}

fn shift_months(now: DateTime<Utc>, months: i64) -> Option<DateTime<Utc>> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        now.checked_sub_months(magnitude)
    } else {
        now.checked_add_months(magnitude)
    }
}

/// First instant of the current period containing `now`
pub fn period_start(now: DateTime<Utc>, period: Period) -> DateTime<Utc> {
    let today = now.date_naive();
    let first_day = match period {
        Period::Day => Some(today),
        Period::Week => {
            today.checked_sub_signed(Duration::days(today.weekday().num_days_from_monday() as i64))
        }
        Period::Month => today.with_day(1),
        Period::Year => NaiveDate::from_ymd_opt(today.year(), 1, 1),
    };
    start_of_day(first_day.unwrap_or(today))
}
