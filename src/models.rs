use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RecordError;

pub type CourseId = i64;
pub type AssignmentId = i64;

pub const DEFAULT_MAX_GRADE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "Id")]
    pub id: CourseId,
    pub name: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub semester: String,
    pub credit_hours: i32,
}

impl Course {
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.name.trim().is_empty() {
            return Err(RecordError::EmptyCourseName { id: self.id });
        }
        if self.credit_hours <= 0 {
            return Err(RecordError::InvalidCreditHours {
                id: self.id,
                credit_hours: self.credit_hours,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pending,
    InProgress,
    Completed,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::InProgress, Status::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in-progress",
            Status::Completed => "completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = RecordError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Status::Pending),
            "in-progress" => Ok(Status::InProgress),
            "completed" => Ok(Status::Completed),
            other => Err(RecordError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = RecordError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(RecordError::UnknownPriority(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(rename = "Id")]
    pub id: AssignmentId,
    pub course_id: CourseId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Raw ISO-8601 text; see [`parse_timestamp`] for the accepted forms.
    pub due_date: String,
    pub priority: Priority,
    pub status: Status,
    #[serde(default)]
    pub grade: Option<f64>,
    #[serde(default = "default_max_grade")]
    pub max_grade: f64,
    #[serde(default)]
    pub weight: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

fn default_max_grade() -> f64 {
    DEFAULT_MAX_GRADE
}

impl Assignment {
    /// The due instant, or `None` when `due_date` cannot be parsed.
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.due_date)
    }

    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }

    pub fn is_graded(&self) -> bool {
        self.grade.is_some()
    }

    /// Score as a percentage of `max_grade`, when graded.
    pub fn percentage(&self) -> Option<f64> {
        self.grade.map(|grade| grade / self.max_grade * 100.0)
    }

    /// Past due and still open. Unparseable due dates are never overdue.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed() && self.due_at().is_some_and(|due| due < now)
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        if self.title.trim().is_empty() {
            return Err(RecordError::EmptyTitle { id: self.id });
        }
        if !self.max_grade.is_finite() || self.max_grade <= 0.0 {
            return Err(RecordError::InvalidMaxGrade {
                id: self.id,
                max_grade: self.max_grade,
            });
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(RecordError::InvalidWeight {
                id: self.id,
                weight: self.weight,
            });
        }
        if let Some(grade) = self.grade {
            if !grade.is_finite() || grade < 0.0 {
                return Err(RecordError::InvalidGrade { id: self.id, grade });
            }
        }
        Ok(())
    }
}

/// Parses an ISO-8601 timestamp.
///
/// Values carrying an offset are taken as exact instants. Naive date-times
/// and bare dates are read as UTC, a bare date meaning midnight.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Status predicate used by list views: everything, or one exact status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    pub fn matches(self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(expected) => expected == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = RecordError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value == "all" {
            return Ok(StatusFilter::All);
        }
        value
            .parse::<Status>()
            .map(StatusFilter::Only)
            .map_err(|_| RecordError::UnknownStatusFilter(value.to_string()))
    }
}
