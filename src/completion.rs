use serde::Serialize;

use crate::models::{Assignment, Status};

/// Share of completed assignments as a whole percentage.
///
/// An empty list yields 0. Halves round up.
pub fn completion_rate(assignments: &[Assignment]) -> u8 {
    if assignments.is_empty() {
        return 0;
    }
    let completed = count_by_status(assignments, Status::Completed);
    let rate = (completed as f64 / assignments.len() as f64 * 100.0).round();
    rate as u8
}

pub fn count_by_status(assignments: &[Assignment], status: Status) -> usize {
    assignments.iter().filter(|a| a.status == status).count()
}

/// Badge counts for the status tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub all: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl StatusCounts {
    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::Pending => self.pending,
            Status::InProgress => self.in_progress,
            Status::Completed => self.completed,
        }
    }
}

pub fn status_counts(assignments: &[Assignment]) -> StatusCounts {
    assignments
        .iter()
        .fold(StatusCounts::default(), |mut counts, assignment| {
            counts.all += 1;
            match assignment.status {
                Status::Pending => counts.pending += 1,
                Status::InProgress => counts.in_progress += 1,
                Status::Completed => counts.completed += 1,
            }
            counts
        })
}
