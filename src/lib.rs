//! Academic progress aggregation.
//!
//! Pure computations over course and assignment records: weighted course
//! grades, GPA, completion statistics, deadline windows, calendar buckets and
//! the assignment list pipeline. Storage lives behind [`store::RecordProvider`]
//! and the Postgres layer in [`db`]; the engine modules never perform I/O.

pub mod calendar;
pub mod completion;
pub mod config;
pub mod db;
pub mod deadlines;
pub mod error;
pub mod grades;
pub mod join;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod store;
pub mod summary;

pub use calendar::{assignments_on_day, calendar_grid, month_view, CalendarGrid, DayCell};
pub use completion::{completion_rate, count_by_status, status_counts, StatusCounts};
pub use deadlines::{overdue, upcoming, DeadlineWindow};
pub use error::{EngineError, RecordError};
pub use grades::{
    compute_course_grade, course_breakdown, course_grade, letter_grade, overall_gpa, CourseGrade,
    Gpa, LetterGrade,
};
pub use join::{CourseDirectory, UNKNOWN_COURSE};
pub use models::{
    parse_timestamp, Assignment, AssignmentId, Course, CourseId, Priority, Status, StatusFilter,
};
pub use pipeline::filter_and_sort;
pub use store::{InMemoryStore, RecordProvider, Snapshot, StoreError};
pub use summary::{dashboard, DashboardSummary};
