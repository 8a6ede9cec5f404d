use std::collections::HashMap;

use crate::{
    error::{AppError, AppResult},
    models::Recommendation,
};

/// A product and how many recommendation records reference it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedProduct {
    pub product_id: i64,
    pub count: usize,
    /// First stored record seen for the product
    pub representative: Recommendation,
}

/// Parses the `count` query parameter against the configured maximum
pub fn parse_count(raw: Option<&str>, max: i64) -> AppResult<usize> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::MalformedCount("count query parameter is required".to_string()))?;

    let count = parse_saturating(raw)
        .ok_or_else(|| AppError::MalformedCount(format!("count must be an integer, got '{}'", raw)))?;

    if count <= 0 {
        return Err(AppError::CountNonPositive(count));
    }
    if count > max {
        return Err(AppError::CountTooLarge {
            requested: count,
            max,
        });
    }

    usize::try_from(count).map_err(|_| AppError::CountTooLarge {
        requested: count,
        max,
    })
}

// Integers beyond i64 clamp to its bounds so they still hit the range checks.
fn parse_saturating(raw: &str) -> Option<i64> {
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }

    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(if negative { i64::MIN } else { i64::MAX })
}

/// Ranks products by number of records, most referenced first.
///
/// Ties keep the order in which products first appear in `records`.
/// Fewer than `n` entries come back when fewer distinct products exist.
pub fn top_products(n: usize, records: Vec<Recommendation>) -> Vec<RankedProduct> {
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut ranked: Vec<RankedProduct> = Vec::new();

    for record in records {
        match index.get(&record.product_id) {
            Some(&slot) => ranked[slot].count += 1,
            None => {
                index.insert(record.product_id, ranked.len());
                ranked.push(RankedProduct {
                    product_id: record.product_id,
                    count: 1,
                    representative: record,
                });
            }
        }
    }

    // sort_by is stable, so first-seen order breaks ties
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}
