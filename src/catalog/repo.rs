use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Assessment {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

/// Read-only access to courses and assessments.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_courses(&self) -> anyhow::Result<Vec<Course>>;
    async fn list_assessments(&self) -> anyhow::Result<Vec<Assessment>>;
}

#[derive(Clone)]
pub struct PgCatalogStore {
    db: PgPool,
}

impl PgCatalogStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn list_courses(&self) -> anyhow::Result<Vec<Course>> {
        let rows = sqlx::query_as::<_, Course>(
            r#"
            SELECT id, name, description, difficulty
            FROM courses
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn list_assessments(&self) -> anyhow::Result<Vec<Assessment>> {
        let rows = sqlx::query_as::<_, Assessment>(
            r#"
            SELECT id, title, description, date
            FROM assessments
            ORDER BY date
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
