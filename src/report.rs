use std::fmt::Write;

use chrono::{DateTime, FixedOffset, Utc};

use crate::completion::status_counts;
use crate::deadlines::{overdue, DeadlineWindow};
use crate::grades::course_breakdown;
use crate::join::CourseDirectory;
use crate::models::Assignment;
use crate::store::Snapshot;
use crate::summary::dashboard;

fn due_label(assignment: &Assignment, zone: &FixedOffset) -> String {
    match assignment.due_at() {
        Some(due) => due.with_timezone(zone).format("%b %-d, %Y %H:%M").to_string(),
        None => assignment.due_date.clone(),
    }
}

pub fn build_report(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    window: DeadlineWindow,
    zone: &FixedOffset,
) -> String {
    let courses = &snapshot.courses;
    let assignments = &snapshot.assignments;
    let directory = CourseDirectory::new(courses);
    let summary = dashboard(courses, assignments, now, window);
    let counts = status_counts(assignments);
    let grades = course_breakdown(courses, assignments);
    let late = overdue(assignments, now);

    let mut output = String::new();

    let _ = writeln!(output, "# Academic Progress Report");
    let _ = writeln!(
        output,
        "Generated {} ({} courses, {} assignments)",
        now.with_timezone(zone).format("%B %-d, %Y %H:%M"),
        summary.total_courses,
        counts.all
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(output, "- Current GPA: {}", summary.gpa);
    let _ = writeln!(output, "- Completion rate: {}%", summary.completion_rate);
    let _ = writeln!(
        output,
        "- Pending: {}, in progress: {}, completed: {}",
        counts.pending, counts.in_progress, counts.completed
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Course Grades");

    if grades.is_empty() {
        let _ = writeln!(output, "No graded assignments yet.");
    } else {
        for grade in grades.iter() {
            let _ = writeln!(
                output,
                "- {}: {:.2}% ({}) across {} graded assignments",
                grade.course_name,
                grade.rounded_percent,
                grade.letter,
                grade.graded.len()
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Upcoming Deadlines (next {} days)", window.days);

    if summary.upcoming.is_empty() {
        let _ = writeln!(output, "Nothing due in this window.");
    } else {
        for assignment in summary.upcoming.iter() {
            let _ = writeln!(
                output,
                "- {} ({}) due {} [{}]",
                assignment.title,
                directory.name_of(assignment.course_id),
                due_label(assignment, zone),
                assignment.priority
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Overdue");

    if late.is_empty() {
        let _ = writeln!(output, "No overdue assignments.");
    } else {
        for assignment in late.iter() {
            let _ = writeln!(
                output,
                "- {} ({}) was due {}",
                assignment.title,
                directory.name_of(assignment.course_id),
                due_label(assignment, zone)
            );
        }
    }

    output
}
