use chrono::Local;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::database::GenerationStore;
use crate::errors::{AppError, Result};
use crate::models::{GenerationRecord, GenerationStyle, NewGenerationRecord};
use crate::services::provider::ImageProvider;
use crate::services::quota::{QuotaChecker, QuotaCheck};

/// Orchestrates one generation call: validate, check the daily quota, call
/// the provider, persist the record. Exactly one record is written per
/// successful call and none on any failure path.
pub struct GenerationService {
    store: Arc<dyn GenerationStore>,
    provider: Arc<dyn ImageProvider>,
    quota: QuotaChecker,
}

impl GenerationService {
    pub fn new(
        store: Arc<dyn GenerationStore>,
        provider: Arc<dyn ImageProvider>,
        quota: QuotaChecker,
    ) -> Self {
        Self {
            store,
            provider,
            quota,
        }
    }

    pub async fn generate(
        &self,
        user_id: Uuid,
        prompt: &str,
        style: GenerationStyle,
    ) -> Result<Vec<String>> {
        let now = Local::now();
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(AppError::Validation("Prompt is required".to_string()));
        }

        // Admission control. Check-then-act: two concurrent requests near
        // the boundary can both pass and overshoot by a small margin.
        let check = self.quota.check(self.store.as_ref(), user_id, now).await?;
        if !check.allowed {
            return Err(AppError::QuotaExceeded {
                count: check.count,
                limit: self.quota.limit(),
            });
        }

        let image_urls = self.provider.generate(prompt, style).await?;

        let record = self
            .store
            .insert_record(NewGenerationRecord {
                user_id,
                prompt: prompt.to_string(),
                style,
                image_urls,
            })
            .await?;

        info!(
            %user_id,
            style = %style,
            images = record.image_urls.len(),
            "generation recorded"
        );

        Ok(record.image_urls)
    }

    /// The current day's count for the listing endpoint's quota probe.
    pub async fn usage_today(&self, user_id: Uuid) -> Result<QuotaCheck> {
        self.quota
            .check(self.store.as_ref(), user_id, Local::now())
            .await
    }

    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GenerationRecord>> {
        self.store.list_for_user(user_id, limit, offset).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::testing::InMemoryStore;
    use crate::services::provider::mock::MockProvider;
    use chrono::{Duration, Utc};

    const LIMIT: i64 = 30;

    fn service(
        store: Arc<InMemoryStore>,
        provider: Arc<MockProvider>,
    ) -> GenerationService {
        GenerationService::new(store, provider, QuotaChecker::new(LIMIT))
    }

    fn seed_today(store: &InMemoryStore, user_id: Uuid, count: i64) {
        let now = Utc::now();
        for _ in 0..count {
            store.seed_record_at(user_id, now);
        }
    }

    #[tokio::test]
    async fn success_writes_exactly_one_record() {
        let store = Arc::new(InMemoryStore::new());
        let provider = Arc::new(MockProvider::returning(vec![
            "https://img.example/1.png",
            "https://img.example/2.png",
        ]));
        let service = service(store.clone(), provider.clone());
        let user_id = Uuid::new_v4();

        let urls = service
            .generate(user_id, "a cat", GenerationStyle::Realism)
            .await
            .unwrap();

        assert_eq!(urls.len(), 2);
        assert_eq!(provider.calls(), 1);
        assert_eq!(store.record_count(), 1);
    }

    #[tokio::test]
    async fn provider_failure_writes_nothing() {
        let store = Arc::new(InMemoryStore::new());
        let provider = Arc::new(MockProvider::failing());
        let service = service(store.clone(), provider.clone());
        let user_id = Uuid::new_v4();

        let err = service
            .generate(user_id, "a cat", GenerationStyle::Realism)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Provider(_)));
        assert_eq!(store.record_count(), 0);

        // Retrying the failed call still leaves no orphaned records.
        let _ = service.generate(user_id, "a cat", GenerationStyle::Realism).await;
        assert_eq!(store.record_count(), 0);
    }

    #[tokio::test]
    async fn exhausted_quota_denies_without_calling_provider() {
        let store = Arc::new(InMemoryStore::new());
        let provider = Arc::new(MockProvider::returning(vec!["https://img.example/1.png"]));
        let service = service(store.clone(), provider.clone());
        let user_id = Uuid::new_v4();

        seed_today(&store, user_id, LIMIT);

        let err = service
            .generate(user_id, "a cat", GenerationStyle::Realism)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::QuotaExceeded { count: 30, limit: 30 }));
        assert_eq!(provider.calls(), 0);
        assert_eq!(store.record_count() as i64, LIMIT);
    }

    #[tokio::test]
    async fn twenty_ninth_record_still_admits_the_thirtieth() {
        let store = Arc::new(InMemoryStore::new());
        let provider = Arc::new(MockProvider::returning(vec![
            "https://img.example/1.png",
            "https://img.example/2.png",
        ]));
        let service = service(store.clone(), provider.clone());
        let user_id = Uuid::new_v4();

        seed_today(&store, user_id, LIMIT - 1);

        let urls = service
            .generate(user_id, "a cat", GenerationStyle::Realism)
            .await
            .unwrap();

        assert_eq!(
            urls,
            vec![
                "https://img.example/1.png".to_string(),
                "https://img.example/2.png".to_string()
            ]
        );
        assert_eq!(store.record_count() as i64, LIMIT);

        // The next call is the thirty-first and must be denied.
        let err = service
            .generate(user_id, "a dog", GenerationStyle::Realism)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::QuotaExceeded { .. }));
    }

    #[tokio::test]
    async fn empty_prompt_fails_before_quota_and_provider() {
        let store = Arc::new(InMemoryStore::unavailable());
        let provider = Arc::new(MockProvider::returning(vec!["https://img.example/1.png"]));
        let service = service(store.clone(), provider.clone());

        // The store would error if touched; validation must come first.
        let err = service
            .generate(Uuid::new_v4(), "   ", GenerationStyle::Realism)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn store_failure_fails_closed() {
        let store = Arc::new(InMemoryStore::unavailable());
        let provider = Arc::new(MockProvider::returning(vec!["https://img.example/1.png"]));
        let service = service(store.clone(), provider.clone());

        let err = service
            .generate(Uuid::new_v4(), "a cat", GenerationStyle::Realism)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn yesterdays_records_free_up_todays_quota() {
        let store = Arc::new(InMemoryStore::new());
        let provider = Arc::new(MockProvider::returning(vec!["https://img.example/1.png"]));
        let service = service(store.clone(), provider.clone());
        let user_id = Uuid::new_v4();

        // Fill yesterday to the limit, up to its final second.
        let now = Local::now();
        let (today_start, _) = crate::services::quota::day_bounds(now);
        for i in 0..LIMIT {
            store.seed_record_at(user_id, today_start - Duration::seconds(1 + i));
        }

        let urls = service
            .generate(user_id, "a cat", GenerationStyle::Realism)
            .await
            .unwrap();

        assert_eq!(urls.len(), 1);
        assert_eq!(store.record_count() as i64, LIMIT + 1);
    }
}
