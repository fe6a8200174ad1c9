use serde::{Deserialize, Serialize};
use crate::models::domain::{ABTest, MatchRecord, MatchResult, Statistics, VariantSummary};

/// Response for the event matching endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindMatchesResponse {
    pub matches: Vec<MatchResult>,
    pub success: bool,
}

/// Response for the stored matches endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMatchesResponse {
    pub matches: Vec<MatchRecord>,
    pub total_results: usize,
}

/// Body of an A/B test results response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ABTestResults {
    pub test: ABTest,
    pub control_results: VariantSummary,
    pub variant_results: VariantSummary,
    pub statistics: Statistics,
}

/// Response for the A/B test results endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ABTestResultsResponse {
    pub test_results: ABTestResults,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
