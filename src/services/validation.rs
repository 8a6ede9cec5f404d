//! Conversion of untrusted JSON into a [`NewRecommendation`].
//!
//! The validator checks presence and types only. Rating bounds are enforced
//! by the write paths through [`check_rating`], because an update must be
//! able to carry the stored rating through unchanged.

use serde_json::{Map, Value};

use crate::models::{NewRecommendation, RecommendationType, MAX_RATING, MIN_RATING};

/// Why a payload could not be turned into a recommendation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid Recommendation: body of request contained bad or no data")]
    MalformedBody,

    #[error("Invalid Recommendation: missing {field}")]
    MissingField { field: &'static str },

    #[error("Invalid Recommendation: {field} must be of type {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Invalid Recommendation: unknown {field} '{value}'")]
    UnknownEnum { field: &'static str, value: String },
}

/// Validates a decoded request body.
///
/// Unknown keys (including `id` and the date fields) are ignored.
pub fn validate(raw: &Value) -> Result<NewRecommendation, ValidationError> {
    let map = raw.as_object().ok_or(ValidationError::MalformedBody)?;

    let user_id = required_int(map, "user_id")?;
    let product_id = required_int(map, "product_id")?;
    let recommendation_type = required_type(map, "recommendation_type")?;
    let bought_in_last_30_days = required_bool(map, "bought_in_last_30_days")?;
    let rating = match map.get("rating") {
        None | Some(Value::Null) => None,
        Some(value) => Some(saturate(as_int(value, "rating")?)),
    };

    Ok(NewRecommendation {
        user_id,
        product_id,
        recommendation_type,
        bought_in_last_30_days,
        rating,
    })
}

/// Checks that a rating lies in the accepted range
pub fn check_rating(rating: i32) -> Result<i32, RatingOutOfRange> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(rating)
    } else {
        Err(RatingOutOfRange(rating))
    }
}

/// A rating outside `MIN_RATING..=MAX_RATING`
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating {0} is outside 0..=5")]
pub struct RatingOutOfRange(pub i32);

fn required<'a>(map: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value, ValidationError> {
    match map.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField { field }),
        Some(value) => Ok(value),
    }
}

fn required_int(map: &Map<String, Value>, field: &'static str) -> Result<i64, ValidationError> {
    as_int(required(map, field)?, field)
}

fn required_bool(map: &Map<String, Value>, field: &'static str) -> Result<bool, ValidationError> {
    required(map, field)?
        .as_bool()
        .ok_or(ValidationError::WrongType {
            field,
            expected: "bool",
        })
}

fn required_type(
    map: &Map<String, Value>,
    field: &'static str,
) -> Result<RecommendationType, ValidationError> {
    let name = required(map, field)?
        .as_str()
        .ok_or(ValidationError::WrongType {
            field,
            expected: "string",
        })?;

    name.parse().map_err(|_| ValidationError::UnknownEnum {
        field,
        value: name.to_string(),
    })
}

// Floats (even integral ones like 1.0) and numeric strings are rejected.
fn as_int(value: &Value, field: &'static str) -> Result<i64, ValidationError> {
    value.as_i64().ok_or(ValidationError::WrongType {
        field,
        expected: "int",
    })
}

// Out-of-range integers still have to fail the bound check later.
fn saturate(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}
