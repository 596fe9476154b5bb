use crate::models::{Assignment, StatusFilter};

/// Filters by text query and status, then orders by due date.
///
/// The query is a case-insensitive substring match against the title or
/// description; an empty query matches everything. Sorting always runs and
/// is stable, with unparseable due dates placed last.
pub fn filter_and_sort<'a>(
    assignments: &'a [Assignment],
    query: &str,
    status_filter: StatusFilter,
) -> Vec<&'a Assignment> {
    let needle = query.to_lowercase();
    let mut selected: Vec<&Assignment> = assignments
        .iter()
        .filter(|a| status_filter.matches(a.status) && matches_query(a, &needle))
        .collect();
    sort_by_due_date(&mut selected);
    selected
}

/// `needle` must already be lowercase.
fn matches_query(assignment: &Assignment, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    assignment.title.to_lowercase().contains(needle)
        || assignment
            .description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(needle))
}

/// Stable ascending sort by due instant; unparseable dates keep their
/// relative order after every dated assignment.
pub fn sort_by_due_date(assignments: &mut [&Assignment]) {
    assignments.sort_by_cached_key(|a| {
        let due = a.due_at();
        (due.is_none(), due)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{assignment, with_status};
    use crate::models::Status;

    fn ids(assignments: &[&Assignment]) -> Vec<i64> {
        assignments.iter().map(|a| a.id).collect()
    }

    #[test]
    fn empty_query_and_all_filter_is_sorted_permutation() {
        let assignments = vec![
            assignment(1, 1, "2024-03-09"),
            assignment(2, 1, "2024-03-02"),
            assignment(3, 2, "2024-03-05T12:00:00Z"),
        ];
        let result = filter_and_sort(&assignments, "", StatusFilter::All);
        assert_eq!(ids(&result), vec![2, 3, 1]);
    }

    #[test]
    fn query_matches_title_or_description_case_insensitively() {
        let mut essay = assignment(1, 1, "2024-03-04");
        essay.title = "History Essay".to_string();
        let mut lab = assignment(2, 1, "2024-03-03");
        lab.title = "Lab 3".to_string();
        lab.description = Some("Write up the ESSAY section".to_string());
        let mut quiz = assignment(3, 1, "2024-03-01");
        quiz.title = "Quiz".to_string();

        let assignments = vec![essay, lab, quiz];
        let result = filter_and_sort(&assignments, "essay", StatusFilter::All);
        assert_eq!(ids(&result), vec![2, 1]);

        assert!(filter_and_sort(&assignments, "midterm", StatusFilter::All).is_empty());
    }

    #[test]
    fn status_and_query_are_combined() {
        let mut first = with_status(assignment(1, 1, "2024-03-01"), Status::Completed);
        first.title = "Problem set 1".to_string();
        let mut second = assignment(2, 1, "2024-03-02");
        second.title = "Problem set 2".to_string();
        let mut third = assignment(3, 1, "2024-03-03");
        third.title = "Reading".to_string();

        let assignments = vec![first, second, third];
        let result = filter_and_sort(
            &assignments,
            "problem",
            StatusFilter::Only(Status::Pending),
        );
        assert_eq!(ids(&result), vec![2]);
    }

    #[test]
    fn ties_and_unparseable_dates_are_deterministic() {
        let assignments = vec![
            assignment(1, 1, "not a date"),
            assignment(2, 1, "2024-03-05T10:00:00Z"),
            assignment(3, 1, "2024-03-01"),
            assignment(4, 1, ""),
            assignment(5, 1, "2024-03-05T10:00:00Z"),
        ];
        let first = filter_and_sort(&assignments, "", StatusFilter::All);
        let second = filter_and_sort(&assignments, "", StatusFilter::All);
        assert_eq!(ids(&first), vec![3, 2, 5, 1, 4]);
        assert_eq!(ids(&first), ids(&second));
    }
}
