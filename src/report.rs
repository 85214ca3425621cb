use std::fmt::Write;

use crate::models::{CourseAggregate, RecentsBuffer};
use crate::reference;

fn format_average(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:.2}"),
        None => "n/a".to_string(),
    }
}

fn term_label(term: &str) -> String {
    reference::semester_for_term(term)
        .map(|semester| semester.name.to_string())
        .unwrap_or_else(|| format!("term {term}"))
}

pub fn build_report(
    course_id: &str,
    course: &CourseAggregate,
    recents: Option<&RecentsBuffer>,
    recent_limit: usize,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Course Review Report: {course_id}");
    let _ = writeln!(output, "{} reviews on record", course.num_reviews);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Averages");
    let _ = writeln!(output, "- Workload: {}", format_average(course.avg_workload));
    let _ = writeln!(output, "- Difficulty: {}", format_average(course.avg_difficulty));
    let _ = writeln!(output, "- Overall: {}", format_average(course.avg_overall));
    let _ = writeln!(
        output,
        "- Staff support: {}",
        format_average(course.avg_staff_support)
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Reviews by Semester");

    if course.reviews_counts_by_year_sem.is_empty() {
        let _ = writeln!(output, "No reviews recorded for this course.");
    } else {
        for (year, terms) in course.reviews_counts_by_year_sem.iter().rev() {
            for (term, count) in terms.iter().rev() {
                let _ = writeln!(output, "- {} {}: {}", term_label(term), year, count);
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Reviews");

    let recent = recents.map(|buffer| buffer.data.as_slice()).unwrap_or_default();
    if recent.is_empty() {
        let _ = writeln!(output, "No recent reviews.");
    } else {
        for review in recent.iter().rev().take(recent_limit) {
            let _ = writeln!(
                output,
                "- {} (workload {:.1}, difficulty {:.1}, overall {:.1}): {}",
                review.review_id, review.workload, review.difficulty, review.overall, review.body
            );
        }
    }

    output
}
