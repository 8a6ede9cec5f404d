use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, HeaderMap, StatusCode},
};
use serde_json::Value;

use crate::{error::AppError, services::validation::ValidationError};

const JSON_MEDIA_TYPE: &str = "application/json";

/// A request body that must be declared and parse as JSON.
///
/// Rejects with 415 on a missing or foreign `Content-Type`, 413 past the body
/// limit and 400 on an empty or unparseable body. The value is left untyped
/// so the validator can report precisely which field is wrong.
#[derive(Debug)]
pub struct JsonBody(pub Value);

/// Checks the media type, ignoring parameters such as `charset`
pub fn require_json_content_type(headers: &HeaderMap) -> Result<(), AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    let Some(content_type) = content_type else {
        tracing::warn!("No Content-Type specified");
        return Err(AppError::UnsupportedMediaType(format!(
            "Content-Type must be {}",
            JSON_MEDIA_TYPE
        )));
    };

    let essence = content_type.split(';').next().unwrap_or_default().trim();
    if essence.eq_ignore_ascii_case(JSON_MEDIA_TYPE) {
        Ok(())
    } else {
        tracing::warn!(content_type, "Invalid Content-Type");
        Err(AppError::UnsupportedMediaType(format!(
            "Content-Type must be {}",
            JSON_MEDIA_TYPE
        )))
    }
}

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        require_json_content_type(req.headers())?;

        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::PayloadTooLarge(e.body_text())
            } else {
                AppError::BadRequest(e.body_text())
            }
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(ValidationError::MalformedBody.into());
        }

        let value = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::BadRequest(format!("Request body is not valid JSON: {}", e)))?;

        Ok(JsonBody(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(content_type: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = content_type {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn test_accepts_json_with_parameters() {
        assert!(require_json_content_type(&headers(Some("application/json"))).is_ok());
        assert!(
            require_json_content_type(&headers(Some("application/json; charset=utf-8"))).is_ok()
        );
        assert!(require_json_content_type(&headers(Some("Application/JSON"))).is_ok());
    }

    #[test]
    fn test_rejects_missing_or_foreign_media_type() {
        for content_type in [None, Some("text/html"), Some("application/xml")] {
            assert!(matches!(
                require_json_content_type(&headers(content_type)),
                Err(AppError::UnsupportedMediaType(_))
            ));
        }
    }
}
