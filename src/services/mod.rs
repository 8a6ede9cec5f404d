pub mod popularity;
pub mod recommendations;
pub mod validation;

pub use recommendations::RecommendationService;
