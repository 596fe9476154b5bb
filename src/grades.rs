use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::join::CourseDirectory;
use crate::models::{Assignment, Course, CourseId};

pub const GPA_SCALE: f64 = 4.0;

/// Weighted percentage grade for one course at full precision.
///
/// Only graded assignments of the course take part, and weights are
/// normalized by the sum actually present. Returns `None` when nothing is
/// graded or the graded weights sum to zero.
pub fn course_grade(course_id: CourseId, assignments: &[Assignment]) -> Option<f64> {
    let mut total_weight = 0.0;
    let mut weighted = 0.0;
    let mut graded = 0usize;

    for assignment in assignments.iter().filter(|a| a.course_id == course_id) {
        let Some(percentage) = assignment.percentage() else {
            continue;
        };
        graded += 1;
        total_weight += assignment.weight;
        weighted += percentage * assignment.weight;
    }

    if graded == 0 {
        return None;
    }
    if total_weight == 0.0 {
        debug!(course_id, graded, "graded assignments carry no weight");
        return None;
    }

    let grade = weighted / total_weight;
    grade.is_finite().then_some(grade)
}

/// [`course_grade`] rounded to two decimals for display.
pub fn compute_course_grade(course_id: CourseId, assignments: &[Assignment]) -> Option<f64> {
    course_grade(course_id, assignments).map(round2)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gpa {
    NotAvailable,
    Value(f64),
}

impl fmt::Display for Gpa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gpa::NotAvailable => f.write_str("N/A"),
            Gpa::Value(value) => write!(f, "{value:.2}"),
        }
    }
}

impl Serialize for Gpa {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Gpa::NotAvailable => serializer.serialize_str("N/A"),
            Gpa::Value(value) => serializer.serialize_f64(*value),
        }
    }
}

/// Unweighted mean of per-course 4.0-scale points.
///
/// Credit hours are deliberately not used. Ungraded courses are left out
/// rather than counted as zero.
pub fn overall_gpa(courses: &[Course], assignments: &[Assignment]) -> Gpa {
    let points: Vec<f64> = courses
        .iter()
        .filter_map(|course| course_grade(course.id, assignments))
        .map(|percent| percent / 100.0 * GPA_SCALE)
        .collect();

    if points.is_empty() {
        return Gpa::NotAvailable;
    }
    Gpa::Value(round2(points.iter().sum::<f64>() / points.len() as f64))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        };
        f.write_str(letter)
    }
}

/// Bands are inclusive at their lower bound. Pass the unrounded percentage.
pub fn letter_grade(percent: f64) -> LetterGrade {
    if percent >= 90.0 {
        LetterGrade::A
    } else if percent >= 80.0 {
        LetterGrade::B
    } else if percent >= 70.0 {
        LetterGrade::C
    } else if percent >= 60.0 {
        LetterGrade::D
    } else {
        LetterGrade::F
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseGrade<'a> {
    pub course_id: CourseId,
    pub course_name: &'a str,
    #[serde(skip)]
    pub percent: f64,
    #[serde(rename = "percent")]
    pub rounded_percent: f64,
    pub letter: LetterGrade,
    pub graded: Vec<&'a Assignment>,
}

/// One entry per course that has a grade, in course order.
pub fn course_breakdown<'a>(
    courses: &'a [Course],
    assignments: &'a [Assignment],
) -> Vec<CourseGrade<'a>> {
    let directory = CourseDirectory::new(courses);
    let groups = directory.group_by_course(assignments.iter().filter(|a| a.is_graded()));

    courses
        .iter()
        .filter_map(|course| {
            let percent = course_grade(course.id, assignments)?;
            let graded = groups.known.get(&course.id).cloned().unwrap_or_default();
            Some(CourseGrade {
                course_id: course.id,
                course_name: course.name.as_str(),
                percent,
                rounded_percent: round2(percent),
                letter: letter_grade(percent),
                graded,
            })
        })
        .collect()
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{assignment, course, graded, with_status};
    use crate::models::Status;

    #[test]
    fn weighted_grade_normalizes_by_present_weights() {
        let assignments = vec![
            graded(1, 1, 80.0, 100.0, 30.0),
            graded(2, 1, 90.0, 100.0, 70.0),
        ];
        assert_eq!(compute_course_grade(1, &assignments), Some(87.0));

        // Weights summing to 50 give the same mean as the scaled-up pair.
        let partial = vec![graded(1, 1, 40.0, 50.0, 10.0), graded(2, 1, 18.0, 20.0, 40.0)];
        assert_eq!(compute_course_grade(1, &partial), Some(88.0));
    }

    #[test]
    fn ungraded_and_other_course_assignments_are_ignored() {
        let assignments = vec![
            graded(1, 1, 70.0, 100.0, 50.0),
            assignment(2, 1, "2024-03-01"),
            graded(3, 2, 10.0, 100.0, 50.0),
            with_status(assignment(4, 1, "2024-03-02"), Status::Completed),
        ];
        assert_eq!(compute_course_grade(1, &assignments), Some(70.0));
        assert_eq!(compute_course_grade(3, &assignments), None);
    }

    #[test]
    fn zero_total_weight_yields_none_not_nan() {
        let assignments = vec![graded(1, 1, 80.0, 100.0, 0.0), graded(2, 1, 95.0, 100.0, 0.0)];
        assert_eq!(course_grade(1, &assignments), None);
    }

    #[test]
    fn rounding_happens_after_full_precision_math() {
        let assignments = vec![
            graded(1, 1, 2.0, 3.0, 1.0),
            graded(2, 1, 1.0, 3.0, 1.0),
            graded(3, 1, 1.0, 3.0, 1.0),
        ];
        let exact = course_grade(1, &assignments).unwrap();
        assert!((exact - 44.444_444).abs() < 1e-5);
        assert_eq!(compute_course_grade(1, &assignments), Some(44.44));
    }

    #[test]
    fn gpa_is_not_available_without_grades() {
        assert_eq!(overall_gpa(&[], &[]), Gpa::NotAvailable);
        assert_eq!(Gpa::NotAvailable.to_string(), "N/A");

        let courses = vec![course(1, "History")];
        let assignments = vec![assignment(1, 1, "2024-03-01")];
        assert_eq!(overall_gpa(&courses, &assignments), Gpa::NotAvailable);
    }

    #[test]
    fn gpa_for_single_course_scales_to_four_points() {
        let courses = vec![course(1, "Biology")];
        let assignments = vec![graded(1, 1, 87.0, 100.0, 10.0)];
        assert_eq!(overall_gpa(&courses, &assignments), Gpa::Value(3.48));
    }

    #[test]
    fn gpa_is_unweighted_mean_over_graded_courses() {
        let mut heavy = course(1, "Physics");
        heavy.credit_hours = 5;
        let courses = vec![heavy, course(2, "Art"), course(3, "Ungraded Seminar")];
        let assignments = vec![
            graded(1, 1, 100.0, 100.0, 10.0),
            graded(2, 2, 50.0, 100.0, 10.0),
            assignment(3, 3, "2024-03-01"),
        ];
        // (4.0 + 2.0) / 2, credit hours and the ungraded course play no part.
        assert_eq!(overall_gpa(&courses, &assignments), Gpa::Value(3.0));
    }

    #[test]
    fn zero_percent_course_is_a_real_gpa() {
        let courses = vec![course(1, "Latin")];
        let assignments = vec![graded(1, 1, 0.0, 100.0, 10.0)];
        assert_eq!(overall_gpa(&courses, &assignments), Gpa::Value(0.0));
    }

    #[test]
    fn letter_bands_are_inclusive_at_lower_bound() {
        assert_eq!(letter_grade(90.0), LetterGrade::A);
        assert_eq!(letter_grade(89.999), LetterGrade::B);
        assert_eq!(letter_grade(80.0), LetterGrade::B);
        assert_eq!(letter_grade(70.0), LetterGrade::C);
        assert_eq!(letter_grade(60.0), LetterGrade::D);
        assert_eq!(letter_grade(59.99), LetterGrade::F);
        assert_eq!(letter_grade(105.0), LetterGrade::A);
    }

    #[test]
    fn breakdown_lists_graded_courses_with_their_work() {
        let courses = vec![course(1, "Biology"), course(2, "Ungraded"), course(3, "Music")];
        let assignments = vec![
            graded(1, 1, 45.0, 50.0, 20.0),
            assignment(2, 1, "2024-03-01"),
            assignment(3, 2, "2024-03-01"),
            graded(4, 3, 72.0, 100.0, 5.0),
        ];
        let breakdown = course_breakdown(&courses, &assignments);

        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].course_name, "Biology");
        assert_eq!(breakdown[0].rounded_percent, 90.0);
        assert_eq!(breakdown[0].letter, LetterGrade::A);
        assert_eq!(breakdown[0].graded.len(), 1);
        assert_eq!(breakdown[1].letter, LetterGrade::C);
    }
}
