use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde_json::Value;

use crate::{
    db::RecommendationRepository,
    error::{AppError, AppResult},
    models::{Recommendation, RecommendationFilter, MAX_RATING, MIN_RATING},
    services::{
        popularity::{self, RankedProduct},
        validation::{self, check_rating, ValidationError},
    },
};

/// Lifecycle rules for recommendation records
///
/// Stamps dates, applies rating defaults and bounds, and keeps `create_date`
/// fixed across updates. Storage is delegated to the injected repository.
#[derive(Clone)]
pub struct RecommendationService {
    repository: Arc<dyn RecommendationRepository>,
    popular_max_count: i64,
}

/// Calendar date used for `create_date` / `update_date`
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Recommendation with id '{}' was not found.", id))
}

fn rating_rejected(action: &str, rating: i32) -> AppError {
    AppError::BadRequest(format!(
        "Cannot {} recommendation with rating {}: rating must be between {} and {} (inclusive).",
        action, rating, MIN_RATING, MAX_RATING
    ))
}

impl RecommendationService {
    pub fn new(repository: Arc<dyn RecommendationRepository>, popular_max_count: i64) -> Self {
        Self {
            repository,
            popular_max_count,
        }
    }

    /// Validates `body` and stores it as a new record
    pub async fn create(&self, body: &Value) -> AppResult<Recommendation> {
        let draft = validation::validate(body)?;
        if let Some(rating) = draft.rating {
            check_rating(rating).map_err(|e| rating_rejected("create", e.0))?;
        }

        let mut record = Recommendation::from_new(draft, today());
        let id = self.repository.create(&record).await?;
        record.id = Some(id);

        tracing::info!(
            id,
            user_id = record.user_id,
            product_id = record.product_id,
            "Recommendation created"
        );
        Ok(record)
    }

    /// Fetches one record or fails with `NotFound`
    pub async fn get(&self, id: i64) -> AppResult<Recommendation> {
        self.repository.find(id).await?.ok_or_else(|| not_found(id))
    }

    pub async fn list(&self, filter: RecommendationFilter) -> AppResult<Vec<Recommendation>> {
        tracing::debug!(?filter, "Listing recommendations");
        self.repository.filter_by(filter).await
    }

    /// Applies `body` on top of the stored record.
    ///
    /// Fields missing from `body` keep their stored values, a rating in the
    /// payload must be in range, `create_date` never changes and
    /// `update_date` moves to today.
    pub async fn update(&self, id: i64, body: &Value) -> AppResult<Recommendation> {
        let mut record = self.get(id).await?;
        let changes = body.as_object().ok_or(ValidationError::MalformedBody)?;

        let mut merged = match serde_json::to_value(&record) {
            Ok(Value::Object(map)) => map,
            _ => {
                return Err(AppError::Internal(format!(
                    "recommendation {} did not serialize to an object",
                    id
                )))
            }
        };
        for (key, value) in changes {
            merged.insert(key.clone(), value.clone());
        }

        let draft = validation::validate(&Value::Object(merged))?;
        if let Some(rating) = draft.rating {
            check_rating(rating).map_err(|e| rating_rejected("update", e.0))?;
        }

        record.apply_update(draft, today());
        self.repository.update(&record).await?;

        tracing::info!(id, rating = record.rating, "Recommendation updated");
        Ok(record)
    }

    /// Replaces only the rating of a stored record
    pub async fn update_rating(&self, id: i64, body: &Value) -> AppResult<Recommendation> {
        let mut record = self.get(id).await?;

        let rating = body
            .get("rating")
            .and_then(Value::as_i64)
            .and_then(|r| i32::try_from(r).ok())
            .and_then(|r| check_rating(r).ok())
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Rating must be an integer between {} and {} (inclusive).",
                    MIN_RATING, MAX_RATING
                ))
            })?;

        record.rating = rating;
        record.update_date = today();
        self.repository.update(&record).await?;

        tracing::info!(id, rating, "Recommendation rating updated");
        Ok(record)
    }

    /// Deletes a record; unknown ids succeed silently
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository.delete(id).await?;
        tracing::info!(id, "Recommendation delete complete");
        Ok(())
    }

    /// Top products by number of records, bounded by the configured maximum
    pub async fn popular(&self, count: Option<&str>) -> AppResult<Vec<RankedProduct>> {
        let n = popularity::parse_count(count, self.popular_max_count)?;
        let records = self.repository.all().await?;
        let ranked = popularity::top_products(n, records);

        tracing::debug!(requested = n, returned = ranked.len(), "Popular products ranked");
        Ok(ranked)
    }
}
