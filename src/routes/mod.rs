use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::{
    error::AppError,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
};

pub mod extract;
pub mod recommendations;
pub mod state;

pub use state::AppState;

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route(
            "/recommendations",
            get(recommendations::list).post(recommendations::create),
        )
        .route("/recommendations/popular", get(recommendations::popular))
        .route(
            "/recommendations/:id",
            get(recommendations::get_one)
                .put(recommendations::update)
                .delete(recommendations::delete),
        )
        .route(
            "/recommendations/:id/rating",
            put(recommendations::update_rating),
        )
        .fallback(not_found)
        .layer(middleware::from_fn(method_not_allowed_as_json))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Service descriptor
async fn index() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "name": "Recommendation REST API Service",
            "version": env!("CARGO_PKG_VERSION"),
            "paths": {
                "recommendations": "/recommendations",
                "popular": "/recommendations/popular?count=N",
                "health": "/health",
            },
        })),
    )
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "OK" })))
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("{} was not found on this server.", uri.path()))
}

/// Replaces the router's empty 405 body with the JSON error shape
async fn method_not_allowed_as_json(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();
    let mut replaced = AppError::MethodNotAllowed.into_response();
    if let Some(allow) = allow {
        replaced.headers_mut().insert(header::ALLOW, allow);
    }
    replaced
}
