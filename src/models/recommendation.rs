use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Smallest rating a recommendation may carry
pub const MIN_RATING: i32 = 0;
/// Largest rating a recommendation may carry
pub const MAX_RATING: i32 = 5;

/// Classification attached to a recommendation by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationType {
    Upsell,
    CrossSell,
    FreqBoughtTogether,
    RecommendedForYou,
    Trending,
    Unknown,
}

impl RecommendationType {
    pub const ALL: [RecommendationType; 6] = [
        RecommendationType::Upsell,
        RecommendationType::CrossSell,
        RecommendationType::FreqBoughtTogether,
        RecommendationType::RecommendedForYou,
        RecommendationType::Trending,
        RecommendationType::Unknown,
    ];

    /// Wire and storage name of the variant
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationType::Upsell => "UPSELL",
            RecommendationType::CrossSell => "CROSS_SELL",
            RecommendationType::FreqBoughtTogether => "FREQ_BOUGHT_TOGETHER",
            RecommendationType::RecommendedForYou => "RECOMMENDED_FOR_YOU",
            RecommendationType::Trending => "TRENDING",
            RecommendationType::Unknown => "UNKNOWN",
        }
    }
}

impl Display for RecommendationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no recommendation type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown recommendation type '{0}'")]
pub struct UnknownRecommendationType(pub String);

impl FromStr for RecommendationType {
    type Err = UnknownRecommendationType;

    /// Names must match exactly; no case folding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecommendationType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownRecommendationType(s.to_string()))
    }
}

/// A validated recommendation that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecommendation {
    pub user_id: i64,
    pub product_id: i64,
    pub recommendation_type: RecommendationType,
    pub bought_in_last_30_days: bool,
    /// Unset when the payload carried no rating
    pub rating: Option<i32>,
}

/// A recommendation record as stored and served
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Assigned by the repository; `None` until first persisted
    pub id: Option<i64>,
    pub user_id: i64,
    pub product_id: i64,
    pub recommendation_type: RecommendationType,
    pub create_date: NaiveDate,
    pub update_date: NaiveDate,
    pub bought_in_last_30_days: bool,
    pub rating: i32,
}

impl Recommendation {
    /// Builds an unsaved record stamped with `today` for both dates
    pub fn from_new(new: NewRecommendation, today: NaiveDate) -> Self {
        Self {
            id: None,
            user_id: new.user_id,
            product_id: new.product_id,
            recommendation_type: new.recommendation_type,
            create_date: today,
            update_date: today,
            bought_in_last_30_days: new.bought_in_last_30_days,
            rating: new.rating.unwrap_or(MIN_RATING),
        }
    }

    /// Applies an update payload, keeping id and `create_date`.
    ///
    /// A payload without a rating leaves the stored rating untouched.
    pub fn apply_update(&mut self, changes: NewRecommendation, today: NaiveDate) {
        self.user_id = changes.user_id;
        self.product_id = changes.product_id;
        self.recommendation_type = changes.recommendation_type;
        self.bought_in_last_30_days = changes.bought_in_last_30_days;
        if let Some(rating) = changes.rating {
            self.rating = rating;
        }
        self.update_date = today;
    }
}

/// Single-field selection used when listing recommendations.
///
/// Only one filter applies per query; combining filters would mean
/// turning this into a set of predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationFilter {
    All,
    ProductId(i64),
    UserId(i64),
    BoughtInLast30Days(bool),
    RecommendationType(RecommendationType),
}

impl RecommendationFilter {
    /// Whether `record` is selected by this filter
    pub fn matches(&self, record: &Recommendation) -> bool {
        match *self {
            RecommendationFilter::All => true,
            RecommendationFilter::ProductId(id) => record.product_id == id,
            RecommendationFilter::UserId(id) => record.user_id == id,
            RecommendationFilter::BoughtInLast30Days(bought) => {
                record.bought_in_last_30_days == bought
            }
            RecommendationFilter::RecommendationType(kind) => record.recommendation_type == kind,
        }
    }
}
