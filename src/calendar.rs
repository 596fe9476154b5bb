//! Month views and per-day assignment buckets.
//!
//! Day membership is decided in the presentation time zone passed by the
//! caller. Lists are never truncated here; [`DayCell::overflow`] only reports
//! how many entries a compact view would hide.

use std::collections::HashMap;
use std::iter::FusedIterator;

use chrono::{Datelike, Duration, NaiveDate, TimeZone, Weekday};
use serde::Serialize;

use crate::error::EngineError;
use crate::models::Assignment;

pub const DEFAULT_WEEK_START: Weekday = Weekday::Sun;

/// Calendar date of `assignment`'s due instant in `tz`.
pub fn due_day<Tz: TimeZone>(assignment: &Assignment, tz: &Tz) -> Option<NaiveDate> {
    assignment
        .due_at()
        .map(|due| due.with_timezone(tz).date_naive())
}

/// All assignments due on `day` in `tz`, in input order.
pub fn assignments_on_day<'a, Tz: TimeZone>(
    assignments: &'a [Assignment],
    day: NaiveDate,
    tz: &Tz,
) -> Vec<&'a Assignment> {
    assignments
        .iter()
        .filter(|a| due_day(a, tz) == Some(day))
        .collect()
}

/// Whole weeks covering one month, as a restartable lazy sequence of dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarGrid {
    next: Option<NaiveDate>,
    last: NaiveDate,
}

impl Iterator for CalendarGrid {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next?;
        self.next = if current < self.last {
            current.succ_opt()
        } else {
            None
        };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .next
            .map(|next| (self.last - next).num_days() as usize + 1)
            .unwrap_or(0);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CalendarGrid {}
impl FusedIterator for CalendarGrid {}

/// Cells for a month view, from the start of the week holding the 1st to
/// the end of the week holding the last day of the month.
pub fn calendar_grid(
    month: u32,
    year: i32,
    week_start: Weekday,
) -> Result<CalendarGrid, EngineError> {
    let (first_of_month, last_of_month) = month_bounds(month, year)?;
    let first = week_first_day(first_of_month, week_start);
    let last = week_first_day(last_of_month, week_start)
        .and_then(|start| start.checked_add_signed(Duration::days(6)));
    let (Some(first), Some(last)) = (first, last) else {
        return Err(EngineError::InvalidYear(year));
    };
    Ok(CalendarGrid {
        next: Some(first),
        last,
    })
}

fn month_bounds(month: u32, year: i32) -> Result<(NaiveDate, NaiveDate), EngineError> {
    if !(1..=12).contains(&month) {
        return Err(EngineError::InvalidMonth(month));
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(EngineError::InvalidYear(year))?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let last = next_month
        .and_then(|date| date.pred_opt())
        .ok_or(EngineError::InvalidYear(year))?;
    Ok((first, last))
}

/// `None` when the week would start before the earliest representable date.
fn week_first_day(date: NaiveDate, week_start: Weekday) -> Option<NaiveDate> {
    let offset =
        (date.weekday().num_days_from_monday() + 7 - week_start.num_days_from_monday()) % 7;
    date.checked_sub_signed(Duration::days(i64::from(offset)))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell<'a> {
    pub date: NaiveDate,
    pub in_month: bool,
    pub assignments: Vec<&'a Assignment>,
}

impl DayCell<'_> {
    /// Entries a view showing at most `shown` would leave out.
    pub fn overflow(&self, shown: usize) -> usize {
        self.assignments.len().saturating_sub(shown)
    }
}

/// Buckets assignments into every cell of the month grid.
pub fn month_view<'a, Tz: TimeZone>(
    assignments: &'a [Assignment],
    month: u32,
    year: i32,
    week_start: Weekday,
    tz: &Tz,
) -> Result<Vec<DayCell<'a>>, EngineError> {
    let grid = calendar_grid(month, year, week_start)?;

    let mut buckets: HashMap<NaiveDate, Vec<&'a Assignment>> = HashMap::new();
    for assignment in assignments {
        if let Some(day) = due_day(assignment, tz) {
            buckets.entry(day).or_default().push(assignment);
        }
    }

    Ok(grid
        .map(|date| DayCell {
            date,
            in_month: date.month() == month && date.year() == year,
            assignments: buckets.remove(&date).unwrap_or_default(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::assignment;
    use chrono::{FixedOffset, Utc};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn grid_covers_whole_weeks_around_the_month() {
        // March 2024 starts on a Friday and ends on a Sunday.
        let grid: Vec<_> = calendar_grid(3, 2024, Weekday::Sun).unwrap().collect();
        assert_eq!(grid.len(), 42);
        assert_eq!(grid[0], date(2024, 2, 25));
        assert_eq!(*grid.last().unwrap(), date(2024, 4, 6));
    }

    #[test]
    fn every_month_grid_is_week_aligned_and_complete() {
        for year in [2023, 2024, 2026] {
            for month in 1..=12 {
                for week_start in [Weekday::Sun, Weekday::Mon] {
                    let grid: Vec<_> = calendar_grid(month, year, week_start).unwrap().collect();
                    assert_eq!(grid.len() % 7, 0, "{year}-{month}");
                    assert!((28..=42).contains(&grid.len()));
                    assert_eq!(grid[0].weekday(), week_start);

                    let in_month: Vec<_> = grid
                        .iter()
                        .filter(|d| d.month() == month && d.year() == year)
                        .collect();
                    let (first, last) = month_bounds(month, year).unwrap();
                    assert_eq!(in_month.len() as u32, last.day());
                    assert_eq!(*in_month[0], first);
                    assert!(grid.windows(2).all(|pair| pair[1] == pair[0].succ_opt().unwrap()));
                    assert!(grid[..7].contains(&first));
                    assert!(grid[grid.len() - 7..].contains(&last));
                }
            }
        }
    }

    #[test]
    fn february_starting_on_week_start_fills_four_weeks() {
        // February 2026 starts on a Sunday and has 28 days.
        let grid = calendar_grid(2, 2026, Weekday::Sun).unwrap();
        assert_eq!(grid.len(), 28);
    }

    #[test]
    fn grid_is_restartable() {
        let grid = calendar_grid(12, 2024, Weekday::Sun).unwrap();
        let once: Vec<_> = grid.clone().collect();
        let twice: Vec<_> = grid.collect();
        assert_eq!(once, twice);
        assert_eq!(
            calendar_grid(12, 2024, Weekday::Sun).unwrap(),
            calendar_grid(12, 2024, Weekday::Sun).unwrap()
        );
    }

    #[test]
    fn rejects_out_of_range_month() {
        assert_eq!(
            calendar_grid(13, 2024, Weekday::Sun).unwrap_err(),
            EngineError::InvalidMonth(13)
        );
        assert!(calendar_grid(0, 2024, Weekday::Sun).is_err());
    }

    #[test]
    fn months_at_the_edge_of_the_date_range_are_errors() {
        let earliest = NaiveDate::MIN.year();
        assert_eq!(
            calendar_grid(1, earliest, Weekday::Sun).unwrap_err(),
            EngineError::InvalidYear(earliest)
        );
        let latest = NaiveDate::MAX.year();
        assert_eq!(
            calendar_grid(12, latest, Weekday::Sun).unwrap_err(),
            EngineError::InvalidYear(latest)
        );
        assert!(month_view(&[], 1, earliest, Weekday::Sun, &Utc).is_err());
    }

    #[test]
    fn day_lookup_ignores_time_of_day() {
        let assignments = vec![
            assignment(1, 1, "2024-03-03T00:15:00Z"),
            assignment(2, 1, "2024-03-03T23:45:00Z"),
            assignment(3, 1, "2024-03-04T00:00:00Z"),
            assignment(4, 1, "bogus"),
        ];
        let hits = assignments_on_day(&assignments, date(2024, 3, 3), &Utc);
        let ids: Vec<_> = hits.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(hits[1].due_date, "2024-03-03T23:45:00Z");
    }

    #[test]
    fn day_lookup_uses_presentation_zone() {
        let assignments = vec![assignment(1, 1, "2024-03-03T23:30:00Z")];
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        assert!(assignments_on_day(&assignments, date(2024, 3, 3), &tokyo).is_empty());
        assert_eq!(assignments_on_day(&assignments, date(2024, 3, 4), &tokyo).len(), 1);
    }

    #[test]
    fn month_view_keeps_full_day_lists() {
        let assignments = vec![
            assignment(1, 1, "2024-03-12T09:00:00Z"),
            assignment(2, 1, "2024-03-12T11:00:00Z"),
            assignment(3, 1, "2024-03-12T15:00:00Z"),
            assignment(4, 1, "2024-02-26T10:00:00Z"),
            assignment(5, 1, "2024-05-01T10:00:00Z"),
        ];
        let cells = month_view(&assignments, 3, 2024, Weekday::Sun, &Utc).unwrap();
        assert_eq!(cells.len(), 42);

        let busy = cells.iter().find(|c| c.date == date(2024, 3, 12)).unwrap();
        assert!(busy.in_month);
        assert_eq!(busy.assignments.len(), 3);
        assert_eq!(busy.overflow(2), 1);
        assert_eq!(busy.overflow(5), 0);

        let leading = cells.iter().find(|c| c.date == date(2024, 2, 26)).unwrap();
        assert!(!leading.in_month);
        assert_eq!(leading.assignments.len(), 1);

        let total: usize = cells.iter().map(|c| c.assignments.len()).sum();
        assert_eq!(total, 4);
    }
}
