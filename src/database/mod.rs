use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{GenerationRecord, NewGenerationRecord};

pub mod queries;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Pool that defers connecting until first use.
    pub fn connect_lazy(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| anyhow::anyhow!("migration failed: {}", e))?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Persistence seam for generation records. The production implementation
/// is Postgres; the orchestrator's tests run against an in-memory one.
#[async_trait]
pub trait GenerationStore: Send + Sync {
    async fn count_for_user_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64>;

    async fn insert_record(&self, record: NewGenerationRecord) -> Result<GenerationRecord>;

    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GenerationRecord>>;
}

#[async_trait]
impl GenerationStore for Database {
    async fn count_for_user_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64> {
        queries::GenerationQueries::count_for_user_between(&self.pool, user_id, start, end).await
    }

    async fn insert_record(&self, record: NewGenerationRecord) -> Result<GenerationRecord> {
        queries::GenerationQueries::insert(&self.pool, &record).await
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GenerationRecord>> {
        queries::GenerationQueries::list_for_user(&self.pool, user_id, limit, offset).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// In-memory `GenerationStore` backing the quota and orchestrator tests.
    #[derive(Default)]
    pub struct InMemoryStore {
        records: Mutex<Vec<GenerationRecord>>,
        pub unavailable: bool,
    }

    impl InMemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn unavailable() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
                unavailable: true,
            }
        }

        /// Seeds a record with an explicit timestamp, bypassing the insert
        /// path, so tests can place records on either side of a day boundary.
        pub fn seed_record_at(&self, user_id: Uuid, created_at: DateTime<Utc>) {
            self.records.lock().unwrap().push(GenerationRecord {
                id: Uuid::new_v4(),
                user_id,
                prompt: "seeded".to_string(),
                style: "realism".to_string(),
                image_urls: vec!["https://img.example/seed.png".to_string()],
                created_at,
            });
        }

        pub fn record_count(&self) -> usize {
            self.records.lock().unwrap().len()
        }

        fn check_available(&self) -> Result<()> {
            if self.unavailable {
                return Err(crate::errors::AppError::Database(sqlx::Error::PoolTimedOut));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl GenerationStore for InMemoryStore {
        async fn count_for_user_between(
            &self,
            user_id: Uuid,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<i64> {
            self.check_available()?;
            let count = self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.user_id == user_id && r.created_at >= start && r.created_at < end)
                .count();
            Ok(count as i64)
        }

        async fn insert_record(&self, record: NewGenerationRecord) -> Result<GenerationRecord> {
            self.check_available()?;
            let stored = GenerationRecord {
                id: Uuid::new_v4(),
                user_id: record.user_id,
                prompt: record.prompt,
                style: record.style.as_str().to_string(),
                image_urls: record.image_urls,
                created_at: Utc::now(),
            };
            self.records.lock().unwrap().push(stored.clone());
            Ok(stored)
        }

        async fn list_for_user(
            &self,
            user_id: Uuid,
            limit: i64,
            offset: i64,
        ) -> Result<Vec<GenerationRecord>> {
            self.check_available()?;
            let mut records: Vec<GenerationRecord> = self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect();
            records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(records
                .into_iter()
                .skip(offset.max(0) as usize)
                .take(limit.max(0) as usize)
                .collect())
        }
    }
}
