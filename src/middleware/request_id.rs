//! Per-request correlation for the recommendations API.
//!
//! Each request carries a [`RequestId`] (client-supplied UUID or a fresh
//! one) and runs inside a `recommendation_request` span. Handlers that
//! resolve a record id attach it to that span with
//! [`record_recommendation_id`], so every log line of the request names the
//! record it touched.

use axum::{
    body::Body,
    extract::{MatchedPath, Request},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::field::Empty;
use uuid::Uuid;

/// Header used to accept and echo the correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reads a client-supplied id; anything that is not a UUID is ignored
    pub fn from_header(value: Option<&HeaderValue>) -> Option<Self> {
        value
            .and_then(|h| h.to_str().ok())
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(RequestId)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stores the [`RequestId`] in the request extensions and echoes it on the
/// response, including error responses.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::from_header(request.headers().get(REQUEST_ID_HEADER))
        .unwrap_or_else(RequestId::generate);
    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Route template such as `/recommendations/:id`, or `unmatched`
fn route_label(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string())
}

/// Span for `TraceLayer`.
///
/// `recommendation_id` starts empty and is filled by the handler once the
/// path id has been parsed.
pub fn make_span_with_request_id(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(ToString::to_string)
        .unwrap_or_else(|| "unknown".to_string());

    tracing::info_span!(
        "recommendation_request",
        method = %request.method(),
        route = %route_label(request),
        request_id = %request_id,
        recommendation_id = Empty,
    )
}

/// Tags the current request span with the record being read or written
pub fn record_recommendation_id(id: i64) {
    tracing::Span::current().record("recommendation_id", id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_uuid_is_kept() {
        let id = Uuid::new_v4();
        let header = HeaderValue::from_str(&id.to_string()).unwrap();
        assert_eq!(RequestId::from_header(Some(&header)), Some(RequestId(id)));
    }

    #[test]
    fn test_non_uuid_header_is_ignored() {
        let header = HeaderValue::from_static("recommendation-7");
        assert_eq!(RequestId::from_header(Some(&header)), None);
        assert_eq!(RequestId::from_header(None), None);
    }

    #[test]
    fn test_unrouted_request_is_labelled_unmatched() {
        let request = axum::http::Request::builder()
            .uri("/recommendations/5")
            .body(Body::empty())
            .unwrap();
        assert_eq!(route_label(&request), "unmatched");
    }

    #[test]
    fn test_recording_outside_a_span_is_harmless() {
        record_recommendation_id(42);
    }
}
