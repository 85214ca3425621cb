//! Pure transitions for the denormalized views a review event touches.
//!
//! Each function takes a record by value and returns the next version of it;
//! nothing here reads or writes the store.

use tracing::warn;

use crate::averages::{update_averages, Averages, ReviewChange};
use crate::models::{CourseAggregate, ParsedReviewId, RecentsBuffer, Review, UserRecord};

impl CourseAggregate {
    fn averages(&self) -> Averages {
        Averages {
            workload: self.avg_workload,
            difficulty: self.avg_difficulty,
            overall: self.avg_overall,
            staff_support: self.avg_staff_support,
        }
    }

    fn with_averages(mut self, new_count: u32, averages: Averages) -> Self {
        self.num_reviews = new_count;
        self.avg_workload = averages.workload;
        self.avg_difficulty = averages.difficulty;
        self.avg_overall = averages.overall;
        // staff support has its own population; only cleared with the rest
        if new_count == 0 {
            self.avg_staff_support = None;
        }
        self.version += 1;
        self
    }

    pub fn on_add(self, id: &ParsedReviewId, review: &Review) -> Self {
        let old_count = self.num_reviews;
        let new_count = old_count + 1;
        let averages = update_averages(
            self.averages(),
            old_count,
            new_count,
            ReviewChange::Add(review.metrics()),
        );

        let mut next = self.with_averages(new_count, averages);
        *next
            .reviews_counts_by_year_sem
            .entry(id.year.clone())
            .or_default()
            .entry(id.semester_term.clone())
            .or_insert(0) += 1;
        next
    }

    pub fn on_edit(self, old: &Review, new: &Review) -> Self {
        let count = self.num_reviews;
        let averages = update_averages(
            self.averages(),
            count,
            count,
            ReviewChange::Edit {
                old: old.metrics(),
                new: new.metrics(),
            },
        );
        self.with_averages(count, averages)
    }

    pub fn on_delete(self, id: &ParsedReviewId, old: &Review) -> Self {
        let old_count = self.num_reviews;
        if old_count == 0 {
            warn!(year = %id.year, term = %id.semester_term, "delete on course with no reviews");
            return self;
        }

        let new_count = old_count - 1;
        let averages = update_averages(
            self.averages(),
            old_count,
            new_count,
            ReviewChange::Delete(old.metrics()),
        );

        let mut next = self.with_averages(new_count, averages);
        let counts = &mut next.reviews_counts_by_year_sem;
        if let Some(terms) = counts.get_mut(&id.year) {
            match terms.get(&id.semester_term).copied() {
                Some(count) if count > 1 => {
                    terms.insert(id.semester_term.clone(), count - 1);
                }
                Some(_) => {
                    terms.remove(&id.semester_term);
                }
                None => {}
            }
            if terms.is_empty() {
                counts.remove(&id.year);
            }
        }
        next
    }
}

impl RecentsBuffer {
    fn position(&self, review_id: &str) -> Option<usize> {
        self.data.iter().position(|review| review.review_id == review_id)
    }

    /// Appends the review, evicting from the front until `capacity` holds.
    pub fn on_add(mut self, review: &Review, capacity: usize) -> Self {
        self.data.push(review.clone());
        if self.data.len() > capacity {
            let overflow = self.data.len() - capacity;
            self.data.drain(..overflow);
        }
        self.version += 1;
        self
    }

    /// Replaces the review in place. Returns `None` when it is not buffered.
    pub fn on_edit(mut self, review: &Review) -> Option<Self> {
        let index = self.position(&review.review_id)?;
        self.data[index] = review.clone();
        self.version += 1;
        Some(self)
    }

    /// Removes the review. Returns `None` when it is not buffered.
    pub fn on_delete(mut self, review_id: &str) -> Option<Self> {
        let index = self.position(review_id)?;
        self.data.remove(index);
        self.version += 1;
        Some(self)
    }
}

impl UserRecord {
    pub fn on_add(mut self, review: &Review) -> Self {
        self.reviews.insert(review.review_id.clone(), review.clone());
        self.version += 1;
        self
    }

    pub fn on_edit(mut self, review: &Review) -> Option<Self> {
        let slot = self.reviews.get_mut(&review.review_id)?;
        *slot = review.clone();
        self.version += 1;
        Some(self)
    }

    pub fn on_delete(mut self, review_id: &str) -> Option<Self> {
        self.reviews.remove(review_id)?;
        self.version += 1;
        Some(self)
    }
}
