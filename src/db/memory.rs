use std::collections::BTreeMap;

use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{Recommendation, RecommendationFilter},
};

use super::RecommendationRepository;

/// Process-local repository used when no database is configured
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    inner: RwLock<InMemoryInner>,
}

#[derive(Debug, Default)]
struct InMemoryInner {
    last_id: i64,
    records: BTreeMap<i64, Recommendation>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RecommendationRepository for InMemoryRepository {
    async fn create(&self, record: &Recommendation) -> AppResult<i64> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let id = inner.last_id;

        let mut stored = record.clone();
        stored.id = Some(id);
        inner.records.insert(id, stored);

        tracing::debug!(id, "Stored recommendation in memory");
        Ok(id)
    }

    async fn find(&self, id: i64) -> AppResult<Option<Recommendation>> {
        let inner = self.inner.read().await;
        Ok(inner.records.get(&id).cloned())
    }

    async fn update(&self, record: &Recommendation) -> AppResult<()> {
        let id = record
            .id
            .ok_or_else(|| AppError::Internal("cannot update a record without an id".to_string()))?;

        let mut inner = self.inner.write().await;
        match inner.records.get_mut(&id) {
            Some(stored) => {
                *stored = record.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!(
                "Recommendation with id '{}' was not found.",
                id
            ))),
        }
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.records.remove(&id);
        Ok(())
    }

    async fn all(&self) -> AppResult<Vec<Recommendation>> {
        self.filter_by(RecommendationFilter::All).await
    }

    async fn filter_by(&self, filter: RecommendationFilter) -> AppResult<Vec<Recommendation>> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }
}
