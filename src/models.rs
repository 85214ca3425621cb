use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Counts of reviews keyed by year, then by semester term.
pub type YearTermCounts = BTreeMap<String, BTreeMap<String, u32>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub review_id: String,
    pub reviewer_id: String,
    #[serde(default)]
    pub is_legacy: bool,
    #[serde(default, rename = "isGTVerifiedReviewer")]
    pub is_gt_verified_reviewer: bool,
    pub created: i64,
    #[serde(default)]
    pub modified: Option<i64>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub upvotes: u32,
    #[serde(default)]
    pub downvotes: u32,
    pub workload: f64,
    pub difficulty: f64,
    pub overall: f64,
    #[serde(default)]
    pub staff_support: Option<f64>,
}

impl Review {
    pub fn metrics(&self) -> ReviewMetrics {
        ReviewMetrics {
            workload: self.workload,
            difficulty: self.difficulty,
            overall: self.overall,
            staff_support: self.staff_support,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewMetrics {
    pub workload: f64,
    pub difficulty: f64,
    pub overall: f64,
    pub staff_support: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseAggregate {
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub num_reviews: u32,
    #[serde(default)]
    pub avg_workload: Option<f64>,
    #[serde(default)]
    pub avg_difficulty: Option<f64>,
    #[serde(default)]
    pub avg_overall: Option<f64>,
    #[serde(default)]
    pub avg_staff_support: Option<f64>,
    #[serde(default)]
    pub reviews_counts_by_year_sem: YearTermCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecentsBuffer {
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub data: Vec<Review>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub user_id: String,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub reviews: BTreeMap<String, Review>,
}

impl UserRecord {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            version: 0,
            reviews: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReviewId {
    pub course_id: String,
    pub year: String,
    pub semester_term: String,
}
