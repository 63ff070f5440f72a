pub mod request;
pub mod response;

pub use request::RecommendationRequest;
pub use response::RecommendationResponse;

use crate::usecases::common::UseCaseMetadata;

pub struct RestockRecommendation;

impl UseCaseMetadata for RestockRecommendation {
    fn usecase_index() -> &'static str {
        "u501"
    }

    fn usecase_name() -> &'static str {
        "restock_recommendation"
    }

    fn display_name() -> &'static str {
        "Restock recommendation"
    }

    fn description() -> &'static str {
        "Generated advice on how much of an item to reorder and when"
    }
}
