use crate::{
    error::AppResult,
    models::{Recommendation, RecommendationFilter},
};

/// Storage seam for recommendation records
///
/// Implementations own id assignment. Each call is atomic on its own; no
/// multi-call transactions are offered.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationRepository: Send + Sync {
    /// Persists a new record and returns the id it was assigned.
    ///
    /// Any id already on `record` is ignored.
    async fn create(&self, record: &Recommendation) -> AppResult<i64>;

    /// Looks a record up by id
    async fn find(&self, id: i64) -> AppResult<Option<Recommendation>>;

    /// Overwrites the stored record with the same id
    async fn update(&self, record: &Recommendation) -> AppResult<()>;

    /// Removes a record; deleting a missing id is not an error
    async fn delete(&self, id: i64) -> AppResult<()>;

    /// Every record, ordered by id
    async fn all(&self) -> AppResult<Vec<Recommendation>>;

    /// Records selected by `filter`, ordered by id
    async fn filter_by(&self, filter: RecommendationFilter) -> AppResult<Vec<Recommendation>>;
}
