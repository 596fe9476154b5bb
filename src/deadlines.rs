use chrono::{DateTime, Duration, Utc};

use crate::models::Assignment;
use crate::pipeline::sort_by_due_date;

pub const DEFAULT_WINDOW_DAYS: u32 = 7;
pub const DEFAULT_UPCOMING_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineWindow {
    pub days: u32,
    pub limit: usize,
}

impl Default for DeadlineWindow {
    fn default() -> Self {
        Self {
            days: DEFAULT_WINDOW_DAYS,
            limit: DEFAULT_UPCOMING_LIMIT,
        }
    }
}

impl DeadlineWindow {
    /// Last instant inside the window. Clamps to the latest representable
    /// instant when the window runs past it.
    pub fn end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(Duration::days(i64::from(self.days)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Open assignments due within `[now, now + days]`, earliest first.
///
/// The limit applies after sorting.
pub fn upcoming(
    assignments: &[Assignment],
    now: DateTime<Utc>,
    window: DeadlineWindow,
) -> Vec<&Assignment> {
    let end = window.end(now);
    let mut selected: Vec<&Assignment> = assignments
        .iter()
        .filter(|a| !a.is_completed())
        .filter(|a| a.due_at().is_some_and(|due| due >= now && due <= end))
        .collect();
    sort_by_due_date(&mut selected);
    selected.truncate(window.limit);
    selected
}

/// Open assignments whose due instant has already passed, earliest first.
pub fn overdue(assignments: &[Assignment], now: DateTime<Utc>) -> Vec<&Assignment> {
    let mut selected: Vec<&Assignment> = assignments.iter().filter(|a| a.is_overdue(now)).collect();
    sort_by_due_date(&mut selected);
    selected
}
