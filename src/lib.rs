//! Event Match - contractor matching service for the event marketplace
//!
//! This library provides the scoring core behind the marketplace: ranking
//! contractors against an event's service requirements, summarising
//! contractor performance, and judging A/B test significance.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{ab_test::analyze, ContractorRanker, MatchScorer, PerformanceScorer};
pub use models::{ContractorProfile, EventLocation, MatchResult, MatchWeights, ServiceRequirement, Statistics};
