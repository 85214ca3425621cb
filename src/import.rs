use std::io;
use std::path::Path;

use anyhow::{anyhow, Context};
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};

use crate::fanout::{FanOut, ReviewEvent};
use crate::models::Review;
use crate::reference;
use crate::store::{self, DocumentStore};

#[derive(Debug, Deserialize)]
struct CsvRow {
    user_id: String,
    reviewer_email: Option<String>,
    course_id: String,
    year: u16,
    semester: String,
    workload: f64,
    difficulty: f64,
    overall: f64,
    staff_support: Option<f64>,
    #[serde(default)]
    body: String,
    created: Option<i64>,
    suffix: Option<String>,
}

fn review_from_row(row: CsvRow, index: usize) -> anyhow::Result<(String, Review)> {
    let semester = reference::get_semester(&row.semester).ok_or_else(|| {
        let known: Vec<&str> = reference::get_semesters().iter().map(|s| s.id).collect();
        anyhow!("unknown semester {:?}, expected one of {known:?}", row.semester)
    })?;
    let created = row.created.unwrap_or_else(|| Utc::now().timestamp_millis());
    let suffix = row.suffix.unwrap_or_else(|| format!("{created}{index}"));
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(anyhow!("review suffix {suffix:?} must be decimal digits"));
    }

    let review = Review {
        review_id: format!("{}-{}-{}-{suffix}", row.course_id, row.year, semester.term),
        reviewer_id: row.user_id.clone(),
        is_legacy: false,
        is_gt_verified_reviewer: row
            .reviewer_email
            .as_deref()
            .is_some_and(reference::is_gt_email),
        created,
        modified: None,
        body: row.body,
        upvotes: 0,
        downvotes: 0,
        workload: row.workload,
        difficulty: row.difficulty,
        overall: row.overall,
        staff_support: row.staff_support,
    };

    Ok((row.user_id, review))
}

/// Fans each CSV row out as an added review. Rows whose review id already exists
/// are skipped; returns how many reviews were added.
pub async fn import_reviews<S, R>(store: &S, recents_capacity: usize, source: R) -> anyhow::Result<usize>
where
    S: DocumentStore + ?Sized,
    R: io::Read,
{
    let fan_out = FanOut::new(store, recents_capacity);
    let mut reader = csv::Reader::from_reader(source);
    let mut inserted = 0usize;

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid CSV row {}", index + 1))?;
        let (user_id, review) = review_from_row(row, index)?;

        if store::get_review(store, &review.review_id).await?.is_some() {
            debug!(review_id = %review.review_id, "review already imported");
            continue;
        }

        fan_out.apply(&user_id, &ReviewEvent::Add(review)).await?;
        inserted += 1;
    }

    info!(inserted, "review import finished");
    Ok(inserted)
}

pub async fn import_csv<S: DocumentStore + ?Sized>(
    store: &S,
    recents_capacity: usize,
    csv_path: &Path,
) -> anyhow::Result<usize> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    import_reviews(store, recents_capacity, file).await
}
