//! Fans a review add/edit/delete out to the course aggregate, the per-course and
//! global recents buffers, the author's review map and the review document itself.
//!
//! Steps run one after another and are not atomic: a failing step is logged and
//! surfaced as [`StatsError::OperationFailed`], earlier steps stay written.

use std::future::Future;

use tracing::{debug, error, info, warn};

use crate::error::{Result, StatsError};
use crate::models::{ParsedReviewId, Review};
use crate::review_id::parse_review_id;
use crate::store::{self, DocumentStore};

#[derive(Debug, Clone, PartialEq)]
pub enum ReviewEvent {
    Add(Review),
    Edit(Review),
    Delete(String),
}

impl ReviewEvent {
    pub fn review_id(&self) -> &str {
        match self {
            ReviewEvent::Add(review) | ReviewEvent::Edit(review) => &review.review_id,
            ReviewEvent::Delete(review_id) => review_id,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ReviewEvent::Add(_) => "add",
            ReviewEvent::Edit(_) => "edit",
            ReviewEvent::Delete(_) => "delete",
        }
    }
}

pub struct FanOut<'a, S: ?Sized> {
    store: &'a S,
    recents_capacity: usize,
}

async fn step<T>(name: &'static str, work: impl Future<Output = Result<T>>) -> Result<T> {
    work.await.map_err(|err| {
        error!(step = name, error = %err, "review fan-out step failed");
        StatsError::failed(name, err)
    })
}

impl<'a, S: DocumentStore + ?Sized> FanOut<'a, S> {
    pub fn new(store: &'a S, recents_capacity: usize) -> Self {
        Self {
            store,
            recents_capacity,
        }
    }

    pub async fn apply(&self, user_id: &str, event: &ReviewEvent) -> Result<()> {
        let id = parse_review_id(event.review_id())?;
        info!(
            review_id = event.review_id(),
            user_id,
            event = event.kind(),
            "applying review event"
        );

        match event {
            ReviewEvent::Add(review) => self.on_add(user_id, &id, review).await,
            ReviewEvent::Edit(review) => self.on_edit(user_id, &id, review).await,
            ReviewEvent::Delete(review_id) => self.on_delete(user_id, &id, review_id).await,
        }
    }

    async fn on_add(&self, user_id: &str, id: &ParsedReviewId, review: &Review) -> Result<()> {
        let stored = step(
            "reading stored review",
            store::get_review(self.store, &review.review_id),
        )
        .await?;
        if stored.is_some() {
            warn!(review_id = %review.review_id, "review already stored, add rejected");
            return Err(StatsError::DuplicateReview(review.review_id.clone()));
        }

        step("updating course aggregate", async {
            let Some(course) = store::get_course(self.store, &id.course_id).await? else {
                warn!(course_id = %id.course_id, "course not found, aggregate left untouched");
                return Ok(());
            };
            let course = course.on_add(id, review);
            store::update_course(self.store, &id.course_id, &course).await
        })
        .await?;

        for scope in [Some(id.course_id.as_str()), None] {
            step("updating recent reviews", async {
                let buffer = store::get_reviews_recent(self.store, scope)
                    .await?
                    .unwrap_or_default()
                    .on_add(review, self.recents_capacity);
                store::set_reviews_recent(self.store, scope, &buffer).await
            })
            .await?;
        }

        step("updating user reviews", async {
            let Some(user) = store::get_user(self.store, user_id).await? else {
                warn!(user_id, "user not found, review map left untouched");
                return Ok(());
            };
            store::set_user(self.store, &user.on_add(review)).await
        })
        .await?;

        step(
            "writing review",
            store::add_or_update_review(self.store, review),
        )
        .await
    }

    async fn on_edit(&self, user_id: &str, id: &ParsedReviewId, review: &Review) -> Result<()> {
        // must be read before the review document is overwritten below
        let stored = step(
            "reading stored review",
            store::get_review(self.store, &review.review_id),
        )
        .await?;

        step("updating course aggregate", async {
            let Some(old) = stored.as_ref() else {
                debug!(review_id = %review.review_id, "no stored review, aggregate left untouched");
                return Ok(());
            };
            let Some(course) = store::get_course(self.store, &id.course_id).await? else {
                warn!(course_id = %id.course_id, "course not found, aggregate left untouched");
                return Ok(());
            };
            let course = course.on_edit(old, review);
            store::update_course(self.store, &id.course_id, &course).await
        })
        .await?;

        for scope in [Some(id.course_id.as_str()), None] {
            step("updating recent reviews", async {
                let edited = store::get_reviews_recent(self.store, scope)
                    .await?
                    .and_then(|buffer| buffer.on_edit(review));
                match edited {
                    Some(buffer) => store::set_reviews_recent(self.store, scope, &buffer).await,
                    None => Ok(()),
                }
            })
            .await?;
        }

        step("updating user reviews", async {
            let edited = store::get_user(self.store, user_id)
                .await?
                .and_then(|user| user.on_edit(review));
            match edited {
                Some(user) => store::set_user(self.store, &user).await,
                None => Ok(()),
            }
        })
        .await?;

        if stored.is_none() {
            return Ok(());
        }
        step(
            "writing review",
            store::add_or_update_review(self.store, review),
        )
        .await
    }

    async fn on_delete(&self, user_id: &str, id: &ParsedReviewId, review_id: &str) -> Result<()> {
        let stored = step(
            "reading stored review",
            store::get_review(self.store, review_id),
        )
        .await?;

        step("updating course aggregate", async {
            let Some(old) = stored.as_ref() else {
                debug!(review_id, "no stored review, aggregate left untouched");
                return Ok(());
            };
            let Some(course) = store::get_course(self.store, &id.course_id).await? else {
                warn!(course_id = %id.course_id, "course not found, aggregate left untouched");
                return Ok(());
            };
            let course = course.on_delete(id, old);
            store::update_course(self.store, &id.course_id, &course).await
        })
        .await?;

        for scope in [Some(id.course_id.as_str()), None] {
            step("updating recent reviews", async {
                let remaining = store::get_reviews_recent(self.store, scope)
                    .await?
                    .and_then(|buffer| buffer.on_delete(review_id));
                match remaining {
                    Some(buffer) => store::set_reviews_recent(self.store, scope, &buffer).await,
                    None => Ok(()),
                }
            })
            .await?;
        }

        step("updating user reviews", async {
            let remaining = store::get_user(self.store, user_id)
                .await?
                .and_then(|user| user.on_delete(review_id));
            match remaining {
                Some(user) => store::set_user(self.store, &user).await,
                None => Ok(()),
            }
        })
        .await?;

        step("removing review", async {
            store::delete_review(self.store, review_id).await.map(|_| ())
        })
        .await
    }
}
