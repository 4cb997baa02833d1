//! Read-only roster views used by the gate, classroom and parent screens.

use std::collections::HashSet;

use chrono::DateTime;
use serde::Serialize;

use crate::models::{Section, Student, StudentId, StudentStatus};

/// Maximum number of rows the gate list renders.
pub const GATE_LIST_LIMIT: usize = 150;

/// Gate list filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GateQuery {
    /// Matches English name or id (case-insensitive) or Arabic name
    pub search: String,
    pub section: Option<Section>,
    pub status: Option<StudentStatus>,
}

/// Students matching the gate filter, in roster order, capped at
/// [`GATE_LIST_LIMIT`].
pub fn gate_filter<'a>(roster: &'a [Student], query: &GateQuery) -> Vec<&'a Student> {
    let term = query.search.trim().to_lowercase();
    roster
        .iter()
        .filter(|student| {
            term.is_empty()
                || student.name_en.to_lowercase().contains(&term)
                || student.name_ar.contains(&term)
                || student.id.as_str().to_lowercase().contains(&term)
        })
        .filter(|student| query.section.is_none_or(|section| student.section == section))
        .filter(|student| query.status.is_none_or(|status| student.status == status))
        .take(GATE_LIST_LIMIT)
        .collect()
}

/// Classroom display filter. Empty grade/class means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassroomFilter {
    pub section: Option<Section>,
    pub grade: String,
    pub class_name: String,
}

impl ClassroomFilter {
    fn matches(&self, student: &Student) -> bool {
        self.section.is_none_or(|section| student.section == section)
            && (self.grade.is_empty() || student.grade == self.grade)
            && (self.class_name.is_empty() || student.class_name == self.class_name)
    }
}

/// Called and on-the-way students, most recent change first.
///
/// Exam mode shows every such student regardless of the filter.
pub fn classroom_feed<'a>(
    roster: &'a [Student],
    filter: &ClassroomFilter,
    exam_mode: bool,
) -> Vec<&'a Student> {
    let mut active = roster
        .iter()
        .filter(|student| {
            matches!(
                student.status,
                StudentStatus::Called | StudentStatus::OnTheWay
            )
        })
        .filter(|student| exam_mode || filter.matches(student))
        .collect::<Vec<_>>();
    active.sort_by_key(|student| std::cmp::Reverse(change_millis(student)));
    active
}

/// Ids of students currently called that the classroom should alert on.
pub fn called_ids(roster: &[Student], filter: &ClassroomFilter, exam_mode: bool) -> HashSet<StudentId> {
    roster
        .iter()
        .filter(|student| student.status == StudentStatus::Called)
        .filter(|student| exam_mode || filter.matches(student))
        .map(|student| student.id.clone())
        .collect()
}

/// Ids called now that were not called in `previous`.
pub fn newly_called(previous: &HashSet<StudentId>, current: &HashSet<StudentId>) -> Vec<StudentId> {
    current.difference(previous).cloned().collect()
}

/// Look a student up by the id a parent typed.
pub fn find_by_id<'a>(roster: &'a [Student], raw: &str) -> Option<&'a Student> {
    let wanted = StudentId::from(raw);
    if wanted.as_str().trim().is_empty() {
        return None;
    }
    roster.iter().find(|student| student.id == wanted)
}

/// Status counts for the admin overview
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterStats {
    pub total: usize,
    pub in_class: usize,
    pub called: usize,
    pub on_the_way: usize,
    pub dismissed: usize,
}

impl RosterStats {
    pub fn from_roster(roster: &[Student]) -> Self {
        roster.iter().fold(
            Self {
                total: roster.len(),
                ..Self::default()
            },
            |mut stats, student| {
                match student.status {
                    StudentStatus::InClass => stats.in_class += 1,
                    StudentStatus::Called => stats.called += 1,
                    StudentStatus::OnTheWay => stats.on_the_way += 1,
                    StudentStatus::Dismissed => stats.dismissed += 1,
                }
                stats
            },
        )
    }
}

/// Unparseable timestamps sort last.
fn change_millis(student: &Student) -> i64 {
    DateTime::parse_from_rfc3339(student.time.trim())
        .map_or(i64::MIN, |time| time.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn student(id: &str, name: &str, section: Section, status: StudentStatus, time: &str) -> Student {
        Student {
            id: StudentId::from(id),
            name_en: name.to_string(),
            name_ar: format!("اسم {id}"),
            section,
            grade: if section == Section::Elementary { "3" } else { "9" }.to_string(),
            class_name: if section == Section::Elementary { "3A" } else { "9B" }.to_string(),
            status,
            time: time.to_string(),
        }
    }

    fn roster() -> Vec<Student> {
        vec![
            student("1", "Lina Haddad", Section::Elementary, StudentStatus::InClass, "2026-03-02T08:00:00+03:00"),
            student("2", "Omar Saleh", Section::MiddleHigh, StudentStatus::Called, "2026-03-02T09:05:00+03:00"),
            student("3", "Sara Khalil", Section::Elementary, StudentStatus::OnTheWay, "2026-03-02T09:10:00+03:00"),
            student("4", "Yousef Nasser", Section::Elementary, StudentStatus::Called, "garbage"),
        ]
    }

    fn ids(students: &[&Student]) -> Vec<String> {
        students.iter().map(|student| student.id.to_string()).collect()
    }

    #[test]
    fn gate_filter_matches_name_id_and_status() {
        let roster = roster();

        let by_name = GateQuery {
            search: "OMAR".to_string(),
            ..GateQuery::default()
        };
        assert_eq!(ids(&gate_filter(&roster, &by_name)), vec!["2"]);

        let by_arabic = GateQuery {
            search: "اسم 3".to_string(),
            ..GateQuery::default()
        };
        assert_eq!(ids(&gate_filter(&roster, &by_arabic)), vec!["3"]);

        let called_elementary = GateQuery {
            search: String::new(),
            section: Some(Section::Elementary),
            status: Some(StudentStatus::Called),
        };
        assert_eq!(ids(&gate_filter(&roster, &called_elementary)), vec!["4"]);
    }

    #[test]
    fn gate_filter_caps_results() {
        let roster = (0..200)
            .map(|n| student(&n.to_string(), "Kid", Section::Elementary, StudentStatus::InClass, ""))
            .collect::<Vec<_>>();
        assert_eq!(gate_filter(&roster, &GateQuery::default()).len(), GATE_LIST_LIMIT);
    }

    #[test]
    fn classroom_feed_sorts_newest_first() {
        let roster = roster();
        let feed = classroom_feed(&roster, &ClassroomFilter::default(), false);
        assert_eq!(ids(&feed), vec!["3", "2", "4"]);
    }

    #[test]
    fn classroom_feed_filter_is_bypassed_in_exam_mode() {
        let roster = roster();
        let filter = ClassroomFilter {
            section: Some(Section::MiddleHigh),
            ..ClassroomFilter::default()
        };

        assert_eq!(ids(&classroom_feed(&roster, &filter, false)), vec!["2"]);
        assert_eq!(ids(&classroom_feed(&roster, &filter, true)), vec!["3", "2", "4"]);
    }

    #[test]
    fn newly_called_reports_only_new_ids() {
        let mut roster = roster();
        let filter = ClassroomFilter::default();
        let before = called_ids(&roster, &filter, false);

        roster[0].status = StudentStatus::Called;
        let after = called_ids(&roster, &filter, false);

        assert_eq!(newly_called(&before, &after), vec![StudentId::from("1")]);
    }

    #[test]
    fn find_by_id_ignores_leading_zeros() {
        let roster = roster();
        assert_eq!(find_by_id(&roster, "0003").map(|s| s.name_en.as_str()), Some("Sara Khalil"));
        assert!(find_by_id(&roster, "99").is_none());
        assert!(find_by_id(&roster, "  ").is_none());
    }

    #[test]
    fn stats_count_each_status() {
        assert_eq!(
            RosterStats::from_roster(&roster()),
            RosterStats {
                total: 4,
                in_class: 1,
                called: 2,
                on_the_way: 1,
                dismissed: 0,
            }
        );
    }
}
