// Core algorithm exports
pub mod ab_test;
pub mod performance;
pub mod ranker;
pub mod scoring;

pub use ab_test::{analyze, confidence_level};
pub use performance::{MetricEstimator, NoEstimator, PerformanceScorer, PlaceholderEstimator};
pub use ranker::{estimate_price, ContractorRanker};
pub use scoring::MatchScorer;
