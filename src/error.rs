use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Malformed review id: {0}")]
    MalformedReviewId(String),

    #[error("Review {0} already exists")]
    DuplicateReview(String),

    #[error("Operation failed while {step}: {source}")]
    OperationFailed {
        step: &'static str,
        #[source]
        source: Box<StatsError>,
    },

    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StatsError {
    pub fn failed(step: &'static str, source: StatsError) -> Self {
        StatsError::OperationFailed {
            step,
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;
