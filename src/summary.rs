use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::completion::{completion_rate, count_by_status};
use crate::deadlines::{upcoming, DeadlineWindow};
use crate::grades::{overall_gpa, Gpa};
use crate::models::{Assignment, Course, Status};

/// The dashboard stat block.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary<'a> {
    pub gpa: Gpa,
    pub total_courses: usize,
    pub pending: usize,
    pub completion_rate: u8,
    pub upcoming: Vec<&'a Assignment>,
}

pub fn dashboard<'a>(
    courses: &[Course],
    assignments: &'a [Assignment],
    now: DateTime<Utc>,
    window: DeadlineWindow,
) -> DashboardSummary<'a> {
    DashboardSummary {
        gpa: overall_gpa(courses, assignments),
        total_courses: courses.len(),
        pending: count_by_status(assignments, Status::Pending),
        completion_rate: completion_rate(assignments),
        upcoming: upcoming(assignments, now, window),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{assignment, course, graded, with_status};
    use crate::models::parse_timestamp;

    #[test]
    fn empty_records_produce_no_data_sentinels() {
        let now = parse_timestamp("2024-03-01").unwrap();
        let summary = dashboard(&[], &[], now, DeadlineWindow::default());
        assert_eq!(summary.gpa, Gpa::NotAvailable);
        assert_eq!(summary.total_courses, 0);
        assert_eq!(summary.pending, 0);
        assert_eq!(summary.completion_rate, 0);
        assert!(summary.upcoming.is_empty());
    }

    #[test]
    fn summary_combines_independent_metrics() {
        let now = parse_timestamp("2024-03-01").unwrap();
        let courses = vec![course(1, "Statistics"), course(2, "Drawing")];
        let assignments = vec![
            graded(1, 1, 87.0, 100.0, 20.0),
            assignment(2, 1, "2024-03-03"),
            with_status(assignment(3, 2, "2024-03-04"), Status::InProgress),
            assignment(4, 2, "2024-04-20"),
        ];
        let summary = dashboard(&courses, &assignments, now, DeadlineWindow::default());

        assert_eq!(summary.gpa, Gpa::Value(3.48));
        assert_eq!(summary.total_courses, 2);
        assert_eq!(summary.pending, 2);
        assert_eq!(summary.completion_rate, 25);
        let upcoming: Vec<_> = summary.upcoming.iter().map(|a| a.id).collect();
        assert_eq!(upcoming, vec![2, 3]);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["gpa"], 3.48);
        assert_eq!(json["completionRate"], 25);
    }
}
