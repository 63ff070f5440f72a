pub mod executor;

pub use executor::RecommendationExecutor;
