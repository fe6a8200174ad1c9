// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    ABTest, ABTestSample, ContractorPerformance, ContractorProfile, EventDetails, EventLocation,
    JobRecord, JobStatus, MatchKey, MatchRecord, MatchResult, MatchStatus, MatchWeights,
    PerformanceSample, PriceEstimate, Priority, ServicePriceRange, ServiceRequirement, Statistics,
    Variant, VariantSummary,
};
pub use requests::{FindMatchesRequest, ListMatchesQuery};
pub use responses::{
    ABTestResults, ABTestResultsResponse, ErrorResponse, FindMatchesResponse, HealthResponse,
    StoredMatchesResponse,
};
