use chrono::NaiveDate;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    error::{AppError, AppResult},
    models::{Recommendation, RecommendationFilter},
};

use super::RecommendationRepository;

const SELECT_COLUMNS: &str = "SELECT id, user_id, product_id, recommendation_type, \
     bought_in_last_30_days, rating, create_date, update_date FROM recommendations";

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the bundled schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

#[derive(Debug, sqlx::FromRow)]
struct RecommendationRow {
    id: i64,
    user_id: i64,
    product_id: i64,
    recommendation_type: String,
    bought_in_last_30_days: bool,
    rating: i32,
    create_date: NaiveDate,
    update_date: NaiveDate,
}

impl TryFrom<RecommendationRow> for Recommendation {
    type Error = AppError;

    fn try_from(row: RecommendationRow) -> Result<Self, Self::Error> {
        let recommendation_type = row
            .recommendation_type
            .parse()
            .map_err(|e| AppError::Internal(format!("row {}: {}", row.id, e)))?;

        Ok(Recommendation {
            id: Some(row.id),
            user_id: row.user_id,
            product_id: row.product_id,
            recommendation_type,
            create_date: row.create_date,
            update_date: row.update_date,
            bought_in_last_30_days: row.bought_in_last_30_days,
            rating: row.rating,
        })
    }
}

fn into_records(rows: Vec<RecommendationRow>) -> AppResult<Vec<Recommendation>> {
    rows.into_iter().map(Recommendation::try_from).collect()
}

/// Repository backed by the `recommendations` table
#[derive(Debug, Clone)]
pub struct PgRecommendationRepository {
    pool: PgPool,
}

impl PgRecommendationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RecommendationRepository for PgRecommendationRepository {
    async fn create(&self, record: &Recommendation) -> AppResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO recommendations \
             (user_id, product_id, recommendation_type, bought_in_last_30_days, rating, create_date, update_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(record.user_id)
        .bind(record.product_id)
        .bind(record.recommendation_type.as_str())
        .bind(record.bought_in_last_30_days)
        .bind(record.rating)
        .bind(record.create_date)
        .bind(record.update_date)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id, "Inserted recommendation");
        Ok(id)
    }

    async fn find(&self, id: i64) -> AppResult<Option<Recommendation>> {
        let row = sqlx::query_as::<_, RecommendationRow>(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Recommendation::try_from).transpose()
    }

    async fn update(&self, record: &Recommendation) -> AppResult<()> {
        let id = record
            .id
            .ok_or_else(|| AppError::Internal("cannot update a record without an id".to_string()))?;

        // create_date is never written after insert
        let result = sqlx::query(
            "UPDATE recommendations SET user_id = $2, product_id = $3, recommendation_type = $4, \
             bought_in_last_30_days = $5, rating = $6, update_date = $7 WHERE id = $1",
        )
        .bind(id)
        .bind(record.user_id)
        .bind(record.product_id)
        .bind(record.recommendation_type.as_str())
        .bind(record.bought_in_last_30_days)
        .bind(record.rating)
        .bind(record.update_date)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Recommendation with id '{}' was not found.",
                id
            )));
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM recommendations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::debug!(id, deleted = result.rows_affected(), "Delete executed");
        Ok(())
    }

    async fn all(&self) -> AppResult<Vec<Recommendation>> {
        self.filter_by(RecommendationFilter::All).await
    }

    async fn filter_by(&self, filter: RecommendationFilter) -> AppResult<Vec<Recommendation>> {
        let rows = match filter {
            RecommendationFilter::All => {
                sqlx::query_as::<_, RecommendationRow>(&format!("{} ORDER BY id", SELECT_COLUMNS))
                    .fetch_all(&self.pool)
                    .await?
            }
            RecommendationFilter::ProductId(product_id) => {
                sqlx::query_as::<_, RecommendationRow>(&format!(
                    "{} WHERE product_id = $1 ORDER BY id",
                    SELECT_COLUMNS
                ))
                .bind(product_id)
                .fetch_all(&self.pool)
                .await?
            }
            RecommendationFilter::UserId(user_id) => {
                sqlx::query_as::<_, RecommendationRow>(&format!(
                    "{} WHERE user_id = $1 ORDER BY id",
                    SELECT_COLUMNS
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            RecommendationFilter::BoughtInLast30Days(bought) => {
                sqlx::query_as::<_, RecommendationRow>(&format!(
                    "{} WHERE bought_in_last_30_days = $1 ORDER BY id",
                    SELECT_COLUMNS
                ))
                .bind(bought)
                .fetch_all(&self.pool)
                .await?
            }
            RecommendationFilter::RecommendationType(kind) => {
                sqlx::query_as::<_, RecommendationRow>(&format!(
                    "{} WHERE recommendation_type = $1 ORDER BY id",
                    SELECT_COLUMNS
                ))
                .bind(kind.as_str())
                .fetch_all(&self.pool)
                .await?
            }
        };

        into_records(rows)
    }
}
