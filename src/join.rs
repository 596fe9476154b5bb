//! Course lookup for assignments.
//!
//! Every `course_id -> Course` resolution goes through [`CourseDirectory`] so
//! that assignments whose course no longer exists render the same way
//! everywhere.

use std::collections::{BTreeMap, HashMap};

use crate::models::{Assignment, Course, CourseId};

pub const UNKNOWN_COURSE: &str = "Unknown course";

pub struct CourseDirectory<'a> {
    by_id: HashMap<CourseId, &'a Course>,
}

/// Assignments bucketed by course id, with orphans kept apart.
#[derive(Debug, Default)]
pub struct CourseGroups<'a> {
    pub known: BTreeMap<CourseId, Vec<&'a Assignment>>,
    pub orphaned: Vec<&'a Assignment>,
}

impl<'a> CourseDirectory<'a> {
    pub fn new(courses: &'a [Course]) -> Self {
        let mut by_id = HashMap::with_capacity(courses.len());
        for course in courses {
            by_id.entry(course.id).or_insert(course);
        }
        Self { by_id }
    }

    pub fn get(&self, id: CourseId) -> Option<&'a Course> {
        self.by_id.get(&id).copied()
    }

    pub fn for_assignment(&self, assignment: &Assignment) -> Option<&'a Course> {
        self.get(assignment.course_id)
    }

    pub fn name_of(&self, id: CourseId) -> &'a str {
        self.get(id)
            .map(|course| course.name.as_str())
            .unwrap_or(UNKNOWN_COURSE)
    }

    pub fn group_by_course<I>(&self, assignments: I) -> CourseGroups<'a>
    where
        I: IntoIterator<Item = &'a Assignment>,
    {
        let mut groups = CourseGroups::default();
        for assignment in assignments {
            if self.by_id.contains_key(&assignment.course_id) {
                groups
                    .known
                    .entry(assignment.course_id)
                    .or_default()
                    .push(assignment);
            } else {
                groups.orphaned.push(assignment);
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{assignment, course};

    #[test]
    fn resolves_known_and_unknown_courses() {
        let courses = vec![course(1, "Calculus II"), course(2, "Organic Chemistry")];
        let directory = CourseDirectory::new(&courses);

        assert_eq!(directory.name_of(2), "Organic Chemistry");
        assert_eq!(directory.name_of(99), UNKNOWN_COURSE);

        let orphan = assignment(5, 99, "2024-03-01");
        assert!(directory.for_assignment(&orphan).is_none());
    }

    #[test]
    fn groups_keep_input_order_and_separate_orphans() {
        let courses = vec![course(1, "Calculus II")];
        let assignments = vec![
            assignment(1, 1, "2024-03-04"),
            assignment(2, 42, "2024-03-02"),
            assignment(3, 1, "2024-03-01"),
        ];
        let groups = CourseDirectory::new(&courses).group_by_course(&assignments);

        let ids: Vec<_> = groups.known[&1].iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(groups.orphaned.len(), 1);
        assert_eq!(groups.orphaned[0].id, 2);
    }
}
