mod recommendation;

pub use recommendation::{
    NewRecommendation, Recommendation, RecommendationFilter, RecommendationType,
    UnknownRecommendationType, MAX_RATING, MIN_RATING,
};
