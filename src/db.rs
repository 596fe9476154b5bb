use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;

use crate::models::{
    Assignment, AssignmentId, Course, CourseId, Priority, Status, DEFAULT_MAX_GRADE,
};
use crate::store::{apply_status, toggled, Snapshot};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool, now: DateTime<Utc>) -> anyhow::Result<()> {
    let courses = vec![
        (
            "seed-course-calc",
            "Calculus II",
            "Dr. Maya Chen",
            "MWF 9:00-9:50",
            "Math Building 204",
            "#4F46E5",
            "Spring 2026",
            4,
        ),
        (
            "seed-course-chem",
            "Organic Chemistry",
            "Prof. Daniel Okafor",
            "TTh 11:00-12:15",
            "Science Hall 110",
            "#10B981",
            "Spring 2026",
            3,
        ),
        (
            "seed-course-lit",
            "World Literature",
            "Dr. Sofia Alvarez",
            "MW 14:00-15:15",
            "Humanities 302",
            "#F59E0B",
            "Spring 2026",
            3,
        ),
    ];

    for (source_key, name, instructor, schedule, location, color, semester, credit_hours) in
        courses
    {
        sqlx::query(
            r#"
            INSERT INTO academic_progress.courses
            (name, instructor, schedule, location, color, semester, credit_hours, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (source_key) DO UPDATE
            SET name = EXCLUDED.name, instructor = EXCLUDED.instructor
            "#,
        )
        .bind(name)
        .bind(instructor)
        .bind(schedule)
        .bind(location)
        .bind(color)
        .bind(semester)
        .bind(credit_hours)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    let assignments = vec![
        (
            "seed-hw-001",
            "seed-course-calc",
            "Series convergence problem set",
            "2026-02-06T23:59:00Z",
            "medium",
            "completed",
            Some(92.0),
            15.0,
        ),
        (
            "seed-hw-002",
            "seed-course-calc",
            "Midterm exam",
            "2026-03-04T10:00:00Z",
            "high",
            "pending",
            None,
            30.0,
        ),
        (
            "seed-hw-003",
            "seed-course-chem",
            "Lab report: esterification",
            "2026-02-12T17:00:00Z",
            "high",
            "completed",
            Some(41.0),
            20.0,
        ),
        (
            "seed-hw-004",
            "seed-course-chem",
            "Reaction mechanisms quiz",
            "2026-03-02T09:00:00Z",
            "medium",
            "in-progress",
            None,
            10.0,
        ),
        (
            "seed-hw-005",
            "seed-course-lit",
            "Essay on magical realism",
            "2026-03-09T23:59:00Z",
            "low",
            "pending",
            None,
            25.0,
        ),
    ];

    for (source_key, course_key, title, due_date, priority, status, grade, weight) in assignments {
        let course_id: i64 =
            sqlx::query("SELECT id FROM academic_progress.courses WHERE source_key = $1")
                .bind(course_key)
                .fetch_one(pool)
                .await?
                .get("id");

        let max_grade = if course_key == "seed-course-chem" {
            50.0
        } else {
            DEFAULT_MAX_GRADE
        };
        let completed_at: Option<DateTime<Utc>> = (status == "completed").then_some(now);

        sqlx::query(
            r#"
            INSERT INTO academic_progress.assignments
            (course_id, title, due_date, priority, status, grade, max_grade, weight, completed_at, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(course_id)
        .bind(title)
        .bind(due_date)
        .bind(priority)
        .bind(status)
        .bind(grade)
        .bind(max_grade)
        .bind(weight)
        .bind(completed_at)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn import_courses_csv(
    pool: &PgPool,
    csv_path: &std::path::Path,
) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        name: String,
        #[serde(default)]
        instructor: String,
        #[serde(default)]
        schedule: String,
        #[serde(default)]
        location: String,
        #[serde(default)]
        color: String,
        #[serde(default)]
        semester: String,
        credit_hours: i32,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("malformed course row {}", line + 1))?;
        let course = Course {
            id: 0,
            name: row.name,
            instructor: row.instructor,
            schedule: row.schedule,
            location: row.location,
            color: row.color,
            semester: row.semester,
            credit_hours: row.credit_hours,
        };
        course
            .validate()
            .with_context(|| format!("invalid course row {}", line + 1))?;

        let result = sqlx::query(
            r#"
            INSERT INTO academic_progress.courses
            (name, instructor, schedule, location, color, semester, credit_hours, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(&course.name)
        .bind(&course.instructor)
        .bind(&course.schedule)
        .bind(&course.location)
        .bind(&course.color)
        .bind(&course.semester)
        .bind(course.credit_hours)
        .bind(row.source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    info!(inserted, path = %csv_path.display(), "imported courses");
    Ok(inserted)
}

pub async fn import_assignments_csv(
    pool: &PgPool,
    csv_path: &std::path::Path,
    now: DateTime<Utc>,
) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        course_name: String,
        title: String,
        description: Option<String>,
        due_date: String,
        priority: Priority,
        status: Status,
        grade: Option<f64>,
        max_grade: Option<f64>,
        weight: f64,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("malformed assignment row {}", line + 1))?;
        let matches: Vec<CourseId> =
            sqlx::query_scalar("SELECT id FROM academic_progress.courses WHERE name = $1")
                .bind(&row.course_name)
                .fetch_all(pool)
                .await?;
        let course_id = single_course(&row.course_name, &matches)
            .with_context(|| format!("assignment row {}", line + 1))?;

        let mut assignment = Assignment {
            id: 0,
            course_id,
            title: row.title,
            description: row.description.filter(|d| !d.trim().is_empty()),
            due_date: row.due_date,
            priority: row.priority,
            status: Status::Pending,
            grade: row.grade,
            max_grade: row.max_grade.unwrap_or(DEFAULT_MAX_GRADE),
            weight: row.weight,
            created_at: now,
            completed_at: None,
        };
        apply_status(&mut assignment, row.status, now);
        assignment
            .validate()
            .with_context(|| format!("invalid assignment row {}", line + 1))?;

        let result = sqlx::query(
            r#"
            INSERT INTO academic_progress.assignments
            (course_id, title, description, due_date, priority, status, grade, max_grade,
             weight, created_at, completed_at, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(assignment.course_id)
        .bind(&assignment.title)
        .bind(&assignment.description)
        .bind(&assignment.due_date)
        .bind(assignment.priority.as_str())
        .bind(assignment.status.as_str())
        .bind(assignment.grade)
        .bind(assignment.max_grade)
        .bind(assignment.weight)
        .bind(assignment.created_at)
        .bind(assignment.completed_at)
        .bind(row.source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    info!(inserted, path = %csv_path.display(), "imported assignments");
    Ok(inserted)
}

/// Course names are not unique, so a name only resolves when exactly one
/// course carries it.
fn single_course(name: &str, matches: &[CourseId]) -> anyhow::Result<CourseId> {
    match matches {
        [id] => Ok(*id),
        [] => bail!("unknown course `{name}`"),
        _ => bail!(
            "course name `{name}` is ambiguous ({} courses share it)",
            matches.len()
        ),
    }
}

/// Loads every course and assignment, validated and ready for the engine.
pub async fn fetch_snapshot(pool: &PgPool) -> anyhow::Result<Snapshot> {
    let course_rows = sqlx::query(
        "SELECT id, name, instructor, schedule, location, color, semester, credit_hours \
         FROM academic_progress.courses ORDER BY id",
    )
    .fetch_all(pool)
    .await
    .context("failed to fetch courses")?;

    let mut courses = Vec::with_capacity(course_rows.len());
    for row in course_rows {
        let course = Course {
            id: row.get("id"),
            name: row.get("name"),
            instructor: row.get("instructor"),
            schedule: row.get("schedule"),
            location: row.get("location"),
            color: row.get("color"),
            semester: row.get("semester"),
            credit_hours: row.get("credit_hours"),
        };
        course.validate()?;
        courses.push(course);
    }

    let assignment_rows = sqlx::query(
        "SELECT id, course_id, title, description, due_date, priority, status, grade, \
         max_grade, weight, created_at, completed_at \
         FROM academic_progress.assignments ORDER BY id",
    )
    .fetch_all(pool)
    .await
    .context("failed to fetch assignments")?;

    let mut assignments = Vec::with_capacity(assignment_rows.len());
    for row in assignment_rows {
        assignments.push(assignment_from_row(&row)?);
    }

    info!(
        courses = courses.len(),
        assignments = assignments.len(),
        "fetched records"
    );
    Ok(Snapshot {
        courses,
        assignments,
    })
}

fn assignment_from_row(row: &PgRow) -> anyhow::Result<Assignment> {
    let id: AssignmentId = row.get("id");
    let priority: String = row.get("priority");
    let status: String = row.get("status");
    let assignment = Assignment {
        id,
        course_id: row.get("course_id"),
        title: row.get("title"),
        description: row.get("description"),
        due_date: row.get("due_date"),
        priority: priority
            .parse()
            .with_context(|| format!("assignment {id} has a bad priority"))?,
        status: status
            .parse()
            .with_context(|| format!("assignment {id} has a bad status"))?,
        grade: row.get("grade"),
        max_grade: row.get("max_grade"),
        weight: row.get("weight"),
        created_at: row.get("created_at"),
        completed_at: row.get("completed_at"),
    };
    assignment.validate()?;
    Ok(assignment)
}

pub async fn toggle_status(
    pool: &PgPool,
    id: AssignmentId,
    now: DateTime<Utc>,
) -> anyhow::Result<Assignment> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query(
        "SELECT id, course_id, title, description, due_date, priority, status, grade, \
         max_grade, weight, created_at, completed_at \
         FROM academic_progress.assignments WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .with_context(|| format!("assignment {id} not found"))?;

    let mut assignment = assignment_from_row(&row)?;
    let next = toggled(assignment.status);
    apply_status(&mut assignment, next, now);

    sqlx::query(
        "UPDATE academic_progress.assignments SET status = $1, completed_at = $2 WHERE id = $3",
    )
    .bind(assignment.status.as_str())
    .bind(assignment.completed_at)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(assignment_id = id, status = %assignment.status, "toggled status");
    Ok(assignment)
}
