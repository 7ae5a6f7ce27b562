//! Billing-cycle windows.
//!
//! A cycle opens on the 5th of a month at 00:00:01 UTC and closes on the 4th of the
//! following month at 23:59:59 UTC, so consecutive cycles are separated by a 2 second gap.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::error::PeriodError;
use crate::models::{PeriodOverview, TimeWindow, WindowView};

/// Day of month on which a cycle starts.
pub const CYCLE_START_DAY: u32 = 5;

/// Bounds of the cycle `offset` cycles away from the one running now.
pub fn period_bounds(offset: i32) -> Result<TimeWindow, PeriodError> {
    period_bounds_at(Utc::now(), offset)
}

/// Same as [`period_bounds`] with an explicit clock.
pub fn period_bounds_at(now: DateTime<Utc>, offset: i32) -> Result<TimeWindow, PeriodError> {
    // Before the 5th the running cycle is still the one anchored last month.
    let anchor = now.year() as i64 * 12 + now.month0() as i64
        - i64::from(now.day() < CYCLE_START_DAY);
    let first = anchor + i64::from(offset);

    let start = month_instant(first, CYCLE_START_DAY, (0, 0, 1))?;
    let end = month_instant(first + 1, CYCLE_START_DAY - 1, (23, 59, 59))?;
    Ok(TimeWindow::new(start, end)?)
}

/// `total_months` counts months since year 0 (January = 0).
fn month_instant(
    total_months: i64,
    day: u32,
    (h, m, s): (u32, u32, u32),
) -> Result<DateTime<Utc>, PeriodError> {
    let year = total_months.div_euclid(12);
    let month = total_months.rem_euclid(12) as u32 + 1;
    let year = i32::try_from(year).map_err(|_| PeriodError::OutOfRange {
        year: i32::MAX,
        month,
    })?;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(h, m, s))
        .map(|naive| naive.and_utc())
        .ok_or(PeriodError::OutOfRange { year, month })
}

/// Current, previous and next cycle as shown by the `/period` route.
pub fn overview_at(now: DateTime<Utc>) -> Result<PeriodOverview, PeriodError> {
    Ok(PeriodOverview {
        current: WindowView::from(&period_bounds_at(now, 0)?),
        previous: WindowView::from(&period_bounds_at(now, -1)?),
        next: WindowView::from(&period_bounds_at(now, 1)?),
    })
}
