use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row};
use tracing::info;

use crate::error::Result;
use crate::models::{CourseAggregate, UserRecord};
use crate::store::{self, DocumentStore};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Postgres-backed document store; one JSONB row per document path.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        let row = sqlx::query("SELECT data FROM course_reviews.documents WHERE path = $1")
            .bind(path)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get("data")))
    }

    async fn set(&self, path: &str, data: Value) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO course_reviews.documents (path, data, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (path) DO UPDATE
            SET data = EXCLUDED.data, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(path)
        .bind(data)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        sqlx::query("DELETE FROM course_reviews.documents WHERE path = $1")
            .bind(path)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Registers a few courses and users so reviews have somewhere to land.
pub async fn seed<S: DocumentStore + ?Sized>(store: &S) -> anyhow::Result<()> {
    let courses = ["CS-6200", "CS-6250", "CS-6465", "CS-7641"];
    let users = ["seed-reviewer-1", "seed-reviewer-2"];

    for course_id in courses {
        if store::get_course(store, course_id).await?.is_none() {
            store::update_course(store, course_id, &CourseAggregate::default()).await?;
            info!(course_id, "seeded course");
        }
    }

    for user_id in users {
        if store::get_user(store, user_id).await?.is_none() {
            store::set_user(store, &UserRecord::new(user_id)).await?;
            info!(user_id, "seeded user");
        }
    }

    Ok(())
}
