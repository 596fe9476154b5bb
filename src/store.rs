//! Record storage behind the engine.
//!
//! The engine only ever sees materialized slices of records. Anything that
//! creates, edits or deletes records goes through a [`RecordProvider`], which
//! callers inject; there is no process-wide record list.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::RecordError;
use crate::models::{
    Assignment, AssignmentId, Course, CourseId, Priority, Status, DEFAULT_MAX_GRADE,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    #[error("invalid record: {0}")]
    Invalid(#[from] RecordError),

    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Fields supplied when creating a course; the store assigns the id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
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

/// Partial course edit; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct CourseUpdate {
    pub name: Option<String>,
    pub instructor: Option<String>,
    pub schedule: Option<String>,
    pub location: Option<String>,
    pub color: Option<String>,
    pub semester: Option<String>,
    pub credit_hours: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignment {
    pub course_id: CourseId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub due_date: String,
    pub priority: Priority,
    pub status: Status,
    #[serde(default)]
    pub grade: Option<f64>,
    #[serde(default)]
    pub max_grade: Option<f64>,
    #[serde(default)]
    pub weight: f64,
}

/// Partial assignment edit. `grade: Some(None)` clears a grade.
#[derive(Debug, Clone, Default)]
pub struct AssignmentUpdate {
    pub course_id: Option<CourseId>,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub due_date: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub grade: Option<Option<f64>>,
    pub max_grade: Option<f64>,
    pub weight: Option<f64>,
}

pub trait RecordProvider {
    fn list_courses(&self) -> Vec<Course>;
    fn list_assignments(&self) -> Vec<Assignment>;

    fn create_course(&mut self, course: NewCourse) -> StoreResult<Course>;
    fn update_course(&mut self, id: CourseId, update: CourseUpdate) -> StoreResult<Course>;
    /// Removes the course together with its assignments.
    fn delete_course(&mut self, id: CourseId) -> StoreResult<()>;

    fn create_assignment(
        &mut self,
        assignment: NewAssignment,
        now: DateTime<Utc>,
    ) -> StoreResult<Assignment>;
    fn update_assignment(
        &mut self,
        id: AssignmentId,
        update: AssignmentUpdate,
        now: DateTime<Utc>,
    ) -> StoreResult<Assignment>;
    fn delete_assignment(&mut self, id: AssignmentId) -> StoreResult<()>;

    /// Flips completed work back to pending and anything else to completed.
    fn toggle_status(&mut self, id: AssignmentId, now: DateTime<Utc>) -> StoreResult<Assignment>;

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            courses: self.list_courses(),
            assignments: self.list_assignments(),
        }
    }
}

/// Both record sets, fully materialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

impl Snapshot {
    pub fn validate(&self) -> Result<(), RecordError> {
        for course in &self.courses {
            course.validate()?;
        }
        for assignment in &self.assignments {
            assignment.validate()?;
        }
        Ok(())
    }

    pub fn load(path: &Path) -> StoreResult<Self> {
        let raw = fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        snapshot.validate()?;
        info!(
            path = %path.display(),
            courses = snapshot.courses.len(),
            assignments = snapshot.assignments.len(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }

    pub fn save(&self, path: &Path) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Keeps `completed_at` in step with a status change.
pub fn apply_status(assignment: &mut Assignment, status: Status, now: DateTime<Utc>) {
    let was_completed = assignment.is_completed();
    assignment.status = status;
    match (was_completed, status == Status::Completed) {
        (false, true) => assignment.completed_at = Some(now),
        (true, false) => assignment.completed_at = None,
        _ => {}
    }
}

pub fn toggled(status: Status) -> Status {
    if status == Status::Completed {
        Status::Pending
    } else {
        Status::Completed
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    courses: Vec<Course>,
    assignments: Vec<Assignment>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> StoreResult<Self> {
        snapshot.validate()?;
        Ok(Self {
            courses: snapshot.courses,
            assignments: snapshot.assignments,
        })
    }

    fn next_course_id(&self) -> CourseId {
        self.courses.iter().map(|c| c.id).max().unwrap_or(0) + 1
    }

    fn next_assignment_id(&self) -> AssignmentId {
        self.assignments.iter().map(|a| a.id).max().unwrap_or(0) + 1
    }

    fn course_mut(&mut self, id: CourseId) -> StoreResult<&mut Course> {
        self.courses
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound { kind: "course", id })
    }

    fn assignment_mut(&mut self, id: AssignmentId) -> StoreResult<&mut Assignment> {
        self.assignments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StoreError::NotFound {
                kind: "assignment",
                id,
            })
    }
}

impl RecordProvider for InMemoryStore {
    fn list_courses(&self) -> Vec<Course> {
        self.courses.clone()
    }

    fn list_assignments(&self) -> Vec<Assignment> {
        self.assignments.clone()
    }

    fn create_course(&mut self, course: NewCourse) -> StoreResult<Course> {
        let course = Course {
            id: self.next_course_id(),
            name: course.name,
            instructor: course.instructor,
            schedule: course.schedule,
            location: course.location,
            color: course.color,
            semester: course.semester,
            credit_hours: course.credit_hours,
        };
        course.validate()?;
        debug!(course_id = course.id, "created course");
        self.courses.push(course.clone());
        Ok(course)
    }

    fn update_course(&mut self, id: CourseId, update: CourseUpdate) -> StoreResult<Course> {
        let current = self.course_mut(id)?;
        let mut edited = current.clone();
        if let Some(name) = update.name {
            edited.name = name;
        }
        if let Some(instructor) = update.instructor {
            edited.instructor = instructor;
        }
        if let Some(schedule) = update.schedule {
            edited.schedule = schedule;
        }
        if let Some(location) = update.location {
            edited.location = location;
        }
        if let Some(color) = update.color {
            edited.color = color;
        }
        if let Some(semester) = update.semester {
            edited.semester = semester;
        }
        if let Some(credit_hours) = update.credit_hours {
            edited.credit_hours = credit_hours;
        }
        edited.validate()?;
        *current = edited.clone();
        Ok(edited)
    }

    fn delete_course(&mut self, id: CourseId) -> StoreResult<()> {
        let index = self
            .courses
            .iter()
            .position(|c| c.id == id)
            .ok_or(StoreError::NotFound { kind: "course", id })?;
        let before = self.assignments.len();
        self.assignments.retain(|a| a.course_id != id);
        self.courses.remove(index);
        debug!(
            course_id = id,
            removed_assignments = before - self.assignments.len(),
            "deleted course"
        );
        Ok(())
    }

    fn create_assignment(
        &mut self,
        assignment: NewAssignment,
        now: DateTime<Utc>,
    ) -> StoreResult<Assignment> {
        let mut created = Assignment {
            id: self.next_assignment_id(),
            course_id: assignment.course_id,
            title: assignment.title,
            description: assignment.description,
            due_date: assignment.due_date,
            priority: assignment.priority,
            status: Status::Pending,
            grade: assignment.grade,
            max_grade: assignment.max_grade.unwrap_or(DEFAULT_MAX_GRADE),
            weight: assignment.weight,
            created_at: now,
            completed_at: None,
        };
        apply_status(&mut created, assignment.status, now);
        created.validate()?;
        debug!(assignment_id = created.id, course_id = created.course_id, "created assignment");
        self.assignments.push(created.clone());
        Ok(created)
    }

    fn update_assignment(
        &mut self,
        id: AssignmentId,
        update: AssignmentUpdate,
        now: DateTime<Utc>,
    ) -> StoreResult<Assignment> {
        let current = self.assignment_mut(id)?;
        let mut edited = current.clone();
        if let Some(course_id) = update.course_id {
            edited.course_id = course_id;
        }
        if let Some(title) = update.title {
            edited.title = title;
        }
        if let Some(description) = update.description {
            edited.description = description;
        }
        if let Some(due_date) = update.due_date {
            edited.due_date = due_date;
        }
        if let Some(priority) = update.priority {
            edited.priority = priority;
        }
        if let Some(grade) = update.grade {
            edited.grade = grade;
        }
        if let Some(max_grade) = update.max_grade {
            edited.max_grade = max_grade;
        }
        if let Some(weight) = update.weight {
            edited.weight = weight;
        }
        if let Some(status) = update.status {
            apply_status(&mut edited, status, now);
        }
        edited.validate()?;
        *current = edited.clone();
        Ok(edited)
    }

    fn delete_assignment(&mut self, id: AssignmentId) -> StoreResult<()> {
        let index = self
            .assignments
            .iter()
            .position(|a| a.id == id)
            .ok_or(StoreError::NotFound {
                kind: "assignment",
                id,
            })?;
        self.assignments.remove(index);
        Ok(())
    }

    fn toggle_status(&mut self, id: AssignmentId, now: DateTime<Utc>) -> StoreResult<Assignment> {
        let assignment = self.assignment_mut(id)?;
        let next = toggled(assignment.status);
        apply_status(assignment, next, now);
        debug!(assignment_id = id, status = %next, "toggled status");
        Ok(assignment.clone())
    }
}
