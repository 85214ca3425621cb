use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::models::{CourseAggregate, RecentsBuffer, Review, UserRecord};
use crate::review_id::parse_review_id;

pub const COURSES_PATH: &str = "coreData/courses";
pub const RECENTS_AGGREGATE_DOC: &str = "_aggregateData";

/// Opaque key-document store addressed by slash-separated paths.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, path: &str) -> Result<Option<Value>>;

    async fn set(&self, path: &str, data: Value) -> Result<()>;

    async fn delete(&self, path: &str) -> Result<()>;
}

pub fn reviews_path(course_id: &str, year: &str, semester_term: &str) -> String {
    format!("reviewsData/{course_id}/{year}-{semester_term}/data")
}

/// `None` addresses the buffer shared by all courses.
pub fn recents_path(course_id: Option<&str>) -> String {
    format!("recentsData/{}", course_id.unwrap_or(RECENTS_AGGREGATE_DOC))
}

pub fn user_path(user_id: &str) -> String {
    format!("usersData/{user_id}")
}

async fn get_typed<S, T>(store: &S, path: &str) -> Result<Option<T>>
where
    S: DocumentStore + ?Sized,
    T: DeserializeOwned,
{
    match store.get(path).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

async fn set_typed<S, T>(store: &S, path: &str, data: &T) -> Result<()>
where
    S: DocumentStore + ?Sized,
    T: Serialize,
{
    store.set(path, serde_json::to_value(data)?).await
}

pub async fn get_courses<S: DocumentStore + ?Sized>(
    store: &S,
) -> Result<BTreeMap<String, CourseAggregate>> {
    Ok(get_typed(store, COURSES_PATH).await?.unwrap_or_default())
}

pub async fn get_course<S: DocumentStore + ?Sized>(
    store: &S,
    course_id: &str,
) -> Result<Option<CourseAggregate>> {
    Ok(get_courses(store).await?.remove(course_id))
}

/// Inserts or replaces one course inside the shared courses document.
pub async fn update_course<S: DocumentStore + ?Sized>(
    store: &S,
    course_id: &str,
    course: &CourseAggregate,
) -> Result<()> {
    let mut courses = get_courses(store).await?;
    courses.insert(course_id.to_string(), course.clone());
    set_typed(store, COURSES_PATH, &courses).await
}

pub async fn get_reviews<S: DocumentStore + ?Sized>(
    store: &S,
    course_id: &str,
    year: &str,
    semester_term: &str,
) -> Result<BTreeMap<String, Review>> {
    let path = reviews_path(course_id, year, semester_term);
    Ok(get_typed(store, &path).await?.unwrap_or_default())
}

pub async fn get_review<S: DocumentStore + ?Sized>(
    store: &S,
    review_id: &str,
) -> Result<Option<Review>> {
    let id = parse_review_id(review_id)?;
    let mut reviews = get_reviews(store, &id.course_id, &id.year, &id.semester_term).await?;
    Ok(reviews.remove(review_id))
}

pub async fn add_or_update_review<S: DocumentStore + ?Sized>(
    store: &S,
    review: &Review,
) -> Result<()> {
    let id = parse_review_id(&review.review_id)?;
    let mut reviews = get_reviews(store, &id.course_id, &id.year, &id.semester_term).await?;
    reviews.insert(review.review_id.clone(), review.clone());
    let path = reviews_path(&id.course_id, &id.year, &id.semester_term);
    set_typed(store, &path, &reviews).await
}

/// Returns whether the review was present.
pub async fn delete_review<S: DocumentStore + ?Sized>(store: &S, review_id: &str) -> Result<bool> {
    let id = parse_review_id(review_id)?;
    let mut reviews = get_reviews(store, &id.course_id, &id.year, &id.semester_term).await?;
    if reviews.remove(review_id).is_none() {
        return Ok(false);
    }

    let path = reviews_path(&id.course_id, &id.year, &id.semester_term);
    if reviews.is_empty() {
        store.delete(&path).await?;
    } else {
        set_typed(store, &path, &reviews).await?;
    }
    Ok(true)
}

pub async fn get_reviews_recent<S: DocumentStore + ?Sized>(
    store: &S,
    course_id: Option<&str>,
) -> Result<Option<RecentsBuffer>> {
    get_typed(store, &recents_path(course_id)).await
}

pub async fn set_reviews_recent<S: DocumentStore + ?Sized>(
    store: &S,
    course_id: Option<&str>,
    buffer: &RecentsBuffer,
) -> Result<()> {
    set_typed(store, &recents_path(course_id), buffer).await
}

pub async fn get_user<S: DocumentStore + ?Sized>(
    store: &S,
    user_id: &str,
) -> Result<Option<UserRecord>> {
    get_typed(store, &user_path(user_id)).await
}

pub async fn set_user<S: DocumentStore + ?Sized>(store: &S, user: &UserRecord) -> Result<()> {
    set_typed(store, &user_path(&user.user_id), user).await
}
