use std::sync::Arc;

use crate::{
    config::Config,
    db::{self, InMemoryRepository, PgRecommendationRepository, RecommendationRepository},
    services::recommendations::RecommendationService,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub recommendations: RecommendationService,
}

impl AppState {
    /// Wires the service around an already-built repository
    pub fn new(repository: Arc<dyn RecommendationRepository>, config: &Config) -> Self {
        Self {
            recommendations: RecommendationService::new(repository, config.popular_max_count),
        }
    }

    /// State backed by the in-memory repository
    pub fn in_memory(config: &Config) -> Self {
        Self::new(Arc::new(InMemoryRepository::new()), config)
    }

    /// Picks Postgres when a database URL is configured, memory otherwise
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        match config.database_url.as_deref() {
            Some(url) => {
                let pool = db::create_pool(url, config.db_max_connections).await?;
                db::run_migrations(&pool).await?;
                tracing::info!("Using PostgreSQL recommendation repository");
                Ok(Self::new(
                    Arc::new(PgRecommendationRepository::new(pool)),
                    config,
                ))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, records are kept in memory only");
                Ok(Self::in_memory(config))
            }
        }
    }
}
