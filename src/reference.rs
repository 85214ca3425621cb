//! Static reference data and reviewer email checks.

pub const DOMAIN_GATECH: &str = "gatech.edu";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Semester {
    pub id: &'static str,
    pub term: u8,
    pub name: &'static str,
}

static SEMESTERS: [Semester; 3] = [
    Semester {
        id: "sp",
        term: 1,
        name: "Spring",
    },
    Semester {
        id: "sm",
        term: 2,
        name: "Summer",
    },
    Semester {
        id: "fa",
        term: 3,
        name: "Fall",
    },
];

pub fn get_semesters() -> &'static [Semester] {
    &SEMESTERS
}

pub fn get_semester(semester_id: &str) -> Option<&'static Semester> {
    SEMESTERS.iter().find(|semester| semester.id == semester_id)
}

/// Maps the term segment of a review id (`"1"`, `"2"`, `"3"`) to its semester.
pub fn semester_for_term(term: &str) -> Option<&'static Semester> {
    let term: u8 = term.parse().ok()?;
    SEMESTERS.iter().find(|semester| semester.term == term)
}

pub fn is_gt_email(email: &str) -> bool {
    email.trim().to_lowercase().ends_with(DOMAIN_GATECH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_semesters_by_id_and_term() {
        assert_eq!(get_semesters().len(), 3);
        assert_eq!(get_semester("fa").map(|s| s.term), Some(3));
        assert_eq!(semester_for_term("1").map(|s| s.name), Some("Spring"));
        assert!(semester_for_term("4").is_none());
        assert!(semester_for_term("x").is_none());
    }

    #[test]
    fn gt_email_is_a_case_insensitive_suffix() {
        assert!(is_gt_email("Buzz@GATECH.edu"));
        assert!(!is_gt_email("gatech.edu@example.com"));
        assert!(!is_gt_email("someone@outlook.com"));
    }
}
