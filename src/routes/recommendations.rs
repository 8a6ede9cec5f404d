use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::{record_recommendation_id, RequestId},
    models::{Recommendation, RecommendationFilter},
    routes::{extract::JsonBody, AppState},
};

/// Query parameters accepted by the list endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub product_id: Option<String>,
    pub user_id: Option<String>,
    #[serde(alias = "bought_in_last_30_days")]
    pub bought_in_last_30d: Option<String>,
    pub recommendation_type: Option<String>,
}

impl TryFrom<ListQuery> for RecommendationFilter {
    type Error = AppError;

    /// The first parameter present wins, in declaration order.
    fn try_from(query: ListQuery) -> Result<Self, Self::Error> {
        if let Some(raw) = query.product_id {
            return parse_int("product_id", &raw).map(RecommendationFilter::ProductId);
        }
        if let Some(raw) = query.user_id {
            return parse_int("user_id", &raw).map(RecommendationFilter::UserId);
        }
        if let Some(raw) = query.bought_in_last_30d {
            return parse_bool("bought_in_last_30d", &raw)
                .map(RecommendationFilter::BoughtInLast30Days);
        }
        if let Some(raw) = query.recommendation_type {
            return raw
                .parse()
                .map(RecommendationFilter::RecommendationType)
                .map_err(|e| AppError::BadRequest(format!("Invalid recommendation_type: {}", e)));
        }
        Ok(RecommendationFilter::All)
    }
}

fn parse_int(name: &str, raw: &str) -> AppResult<i64> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("{} must be an integer, got '{}'", name, raw)))
}

fn parse_bool(name: &str, raw: &str) -> AppResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(AppError::BadRequest(format!(
            "{} must be true or false, got '{}'",
            name, raw
        ))),
    }
}

// Non-numeric ids can never name a record.
fn parse_id(raw: &str) -> AppResult<i64> {
    raw.parse().map_err(|_| {
        AppError::NotFound(format!("Recommendation with id '{}' was not found.", raw))
    })
}

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub count: Option<String>,
}

/// GET /recommendations
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let filter = RecommendationFilter::try_from(query)?;
    let records = state.recommendations.list(filter).await?;

    tracing::info!(?filter, returned = records.len(), "Returning recommendations");
    Ok(Json(records))
}

/// GET /recommendations/popular?count=N
pub async fn popular(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PopularQuery>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let ranked = state
        .recommendations
        .popular(query.count.as_deref())
        .await?;

    Ok(Json(
        ranked
            .into_iter()
            .map(|entry| entry.representative)
            .collect(),
    ))
}

/// GET /recommendations/{id}
pub async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Recommendation>> {
    let id = parse_id(&id)?;
    record_recommendation_id(id);
    tracing::info!(id, "Request for recommendation");

    let record = state.recommendations.get(id).await?;
    Ok(Json(record))
}

/// POST /recommendations
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    JsonBody(body): JsonBody,
) -> AppResult<impl IntoResponse> {
    tracing::info!(request_id = %request_id, "Request to create a recommendation");

    let record = state.recommendations.create(&body).await?;
    if let Some(id) = record.id {
        record_recommendation_id(id);
    }
    let location = format!("/recommendations/{}", record.id.unwrap_or_default());

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(record),
    ))
}

/// PUT /recommendations/{id}
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> AppResult<Json<Recommendation>> {
    let id = parse_id(&id)?;
    record_recommendation_id(id);
    tracing::info!(id, "Request to update recommendation");

    let record = state.recommendations.update(id, &body).await?;
    Ok(Json(record))
}

/// PUT /recommendations/{id}/rating
pub async fn update_rating(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> AppResult<Json<Recommendation>> {
    let id = parse_id(&id)?;
    record_recommendation_id(id);
    tracing::info!(id, "Request to update recommendation rating");

    let record = state.recommendations.update_rating(id, &body).await?;
    Ok(Json(record))
}

/// DELETE /recommendations/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id)?;
    record_recommendation_id(id);
    tracing::info!(id, "Request to delete recommendation");

    state.recommendations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecommendationType;

    #[test]
    fn test_no_parameters_lists_everything() {
        let filter = RecommendationFilter::try_from(ListQuery::default()).unwrap();
        assert_eq!(filter, RecommendationFilter::All);
    }

    #[test]
    fn test_first_parameter_wins() {
        let query = ListQuery {
            product_id: Some("7".into()),
            user_id: Some("3".into()),
            ..Default::default()
        };
        assert_eq!(
            RecommendationFilter::try_from(query).unwrap(),
            RecommendationFilter::ProductId(7)
        );

        let query = ListQuery {
            bought_in_last_30d: Some("False".into()),
            recommendation_type: Some("UPSELL".into()),
            ..Default::default()
        };
        assert_eq!(
            RecommendationFilter::try_from(query).unwrap(),
            RecommendationFilter::BoughtInLast30Days(false)
        );
    }

    #[test]
    fn test_type_filter() {
        let query = ListQuery {
            recommendation_type: Some("CROSS_SELL".into()),
            ..Default::default()
        };
        assert_eq!(
            RecommendationFilter::try_from(query).unwrap(),
            RecommendationFilter::RecommendationType(RecommendationType::CrossSell)
        );
    }

    #[test]
    fn test_malformed_filter_values() {
        let query = ListQuery {
            user_id: Some("abc".into()),
            ..Default::default()
        };
        assert!(matches!(
            RecommendationFilter::try_from(query),
            Err(AppError::BadRequest(_))
        ));

        let query = ListQuery {
            recommendation_type: Some("SOMETIMES".into()),
            ..Default::default()
        };
        assert!(RecommendationFilter::try_from(query).is_err());
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("12").unwrap(), 12);
        assert!(matches!(parse_id("abc"), Err(AppError::NotFound(_))));
    }
}
