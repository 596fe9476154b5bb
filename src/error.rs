use thiserror::Error;

use crate::models::{AssignmentId, CourseId};

/// Structural problems found while ingesting a record.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecordError {
    #[error("course {id}: name must not be empty")]
    EmptyCourseName { id: CourseId },

    #[error("course {id}: credit hours must be positive, got {credit_hours}")]
    InvalidCreditHours { id: CourseId, credit_hours: i32 },

    #[error("assignment {id}: title must not be empty")]
    EmptyTitle { id: AssignmentId },

    #[error("assignment {id}: max grade must be a positive number, got {max_grade}")]
    InvalidMaxGrade { id: AssignmentId, max_grade: f64 },

    #[error("assignment {id}: weight must be a non-negative number, got {weight}")]
    InvalidWeight { id: AssignmentId, weight: f64 },

    #[error("assignment {id}: grade must be a non-negative number, got {grade}")]
    InvalidGrade { id: AssignmentId, grade: f64 },

    #[error("unknown status `{0}` (expected pending, in-progress or completed)")]
    UnknownStatus(String),

    #[error("unknown priority `{0}` (expected low, medium or high)")]
    UnknownPriority(String),

    #[error("unknown status filter `{0}` (expected all, pending, in-progress or completed)")]
    UnknownStatusFilter(String),
}

/// Errors raised by engine operations given out-of-range arguments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    #[error("year {0} is outside the supported calendar range")]
    InvalidYear(i32),
}
