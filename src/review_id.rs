use crate::error::{Result, StatsError};
use crate::models::ParsedReviewId;

/// Splits `<courseId>-<year>-<term>-<suffix>` into its course, year and term.
/// Year, term and suffix must all be decimal digits.
///
/// The course id may itself contain hyphens (section codes such as `CS-1234-O99`),
/// so only the last three segments are treated as year, term and suffix.
pub fn parse_review_id(review_id: &str) -> Result<ParsedReviewId> {
    let segments: Vec<&str> = review_id.split('-').collect();
    if segments.len() < 4 || segments.iter().any(|segment| segment.is_empty()) {
        return Err(StatsError::MalformedReviewId(review_id.to_string()));
    }

    let split_at = segments.len() - 3;
    let year = segments[split_at];
    let semester_term = segments[split_at + 1];
    let suffix = segments[split_at + 2];

    if !is_digits(year) || !is_digits(semester_term) || !is_digits(suffix) {
        return Err(StatsError::MalformedReviewId(review_id.to_string()));
    }

    Ok(ParsedReviewId {
        course_id: segments[..split_at].join("-"),
        year: year.to_string(),
        semester_term: semester_term.to_string(),
    })
}

fn is_digits(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
}
