use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Priority an event manager assigns to a service requirement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// A service an event needs (catering, photography, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequirement {
    pub id: Uuid,
    pub event_id: Uuid,
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub is_required: bool,
}

/// Where an event takes place
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLocation {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

impl EventLocation {
    pub fn city(city: &str) -> Self {
        Self {
            city: Some(city.to_string()),
            region: None,
        }
    }
}

/// Event record as stored by the hosted backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDetails {
    pub id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location_data: Option<EventLocation>,
}

/// Price range a contractor advertises for one service category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicePriceRange {
    pub category: String,
    #[serde(default)]
    pub price_range_min: Option<f64>,
    #[serde(default)]
    pub price_range_max: Option<f64>,
}

/// Contractor business profile, read-only input to scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractorProfile {
    pub id: Uuid,
    #[serde(default, deserialize_with = "null_as_default")]
    pub business_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub service_categories: Vec<String>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub review_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub service_areas: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub services: Vec<ServicePriceRange>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub avg_response_time_minutes: Option<f64>,
    #[serde(default)]
    pub customer_satisfaction: Option<f64>,
}

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ContractorProfile {
    /// Rating usable for scoring: finite and clamped into [0, 5]
    pub fn rating(&self) -> f64 {
        self.average_rating
            .filter(|r| r.is_finite())
            .map(|r| r.clamp(0.0, 5.0))
            .unwrap_or(0.0)
    }
}

/// Estimated price span for a contractor on an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub min: f64,
    pub max: f64,
}

/// Ranked contractor for an event, recomputed per request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "contractorId")]
    pub contractor_id: Uuid,
    #[serde(rename = "businessName")]
    pub business_name: String,
    #[serde(rename = "serviceCategory")]
    pub service_category: Option<String>,
    #[serde(rename = "serviceRequirementId")]
    pub service_requirement_id: Option<Uuid>,
    #[serde(rename = "matchScore")]
    pub match_score: f64,
    #[serde(rename = "estimatedPrice")]
    pub estimated_price: PriceEstimate,
    pub rating: f64,
    #[serde(rename = "reviewCount")]
    pub review_count: u32,
}

/// Lifecycle of a persisted match row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "match_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Suggested,
    Contacted,
    Declined,
}

/// Unique key of a persisted match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchKey {
    pub event_id: Uuid,
    pub contractor_id: Uuid,
    pub service_requirement_id: Uuid,
}

/// Row of the `event_contractor_matches` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub event_id: Uuid,
    pub contractor_id: Uuid,
    pub service_requirement_id: Uuid,
    pub match_score: f64,
    pub estimated_price_min: f64,
    pub estimated_price_max: f64,
    pub status: MatchStatus,
    pub updated_at: DateTime<Utc>,
}

impl MatchRecord {
    /// Build the row for a ranked result; `None` if no requirement was matched
    pub fn from_result(event_id: Uuid, result: &MatchResult, now: DateTime<Utc>) -> Option<Self> {
        let service_requirement_id = result.service_requirement_id?;
        Some(Self {
            event_id,
            contractor_id: result.contractor_id,
            service_requirement_id,
            match_score: result.match_score,
            estimated_price_min: result.estimated_price.min,
            estimated_price_max: result.estimated_price.max,
            status: MatchStatus::Suggested,
            updated_at: now,
        })
    }

    pub fn key(&self) -> MatchKey {
        MatchKey {
            event_id: self.event_id,
            contractor_id: self.contractor_id,
            service_requirement_id: self.service_requirement_id,
        }
    }
}

/// Status of a booked job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
}

/// A job a contractor was booked for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub contractor_id: Uuid,
    pub status: JobStatus,
    #[serde(default)]
    pub amount: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Aggregated job outcomes for one contractor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSample {
    #[serde(rename = "contractorId")]
    pub contractor_id: Uuid,
    #[serde(rename = "totalJobs")]
    pub total_jobs: u32,
    #[serde(rename = "completedJobs")]
    pub completed_jobs: u32,
    pub revenue: f64,
    #[serde(rename = "responseTimeMinutes")]
    pub response_time_minutes: Option<f64>,
}

/// Performance report returned for a contractor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractorPerformance {
    #[serde(flatten)]
    pub sample: PerformanceSample,
    #[serde(rename = "completionRate")]
    pub completion_rate: f64,
    #[serde(rename = "customerSatisfaction")]
    pub customer_satisfaction: Option<f64>,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "overallScore")]
    pub overall_score: f64,
    /// True when response time or satisfaction came from a placeholder estimate
    pub estimated: bool,
}

/// Arm of an A/B test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Control,
    Variant,
}

/// A/B test definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ABTest {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metric: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One participant's measured outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ABTestSample {
    pub variant: Variant,
    pub metric_value: f64,
}

/// Per-arm aggregate shown next to the statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantSummary {
    pub sample_size: usize,
    pub average: f64,
    pub total: f64,
}

/// Significance statistics for a control/variant comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(rename = "controlAvg")]
    pub control_avg: f64,
    #[serde(rename = "variantAvg")]
    pub variant_avg: f64,
    #[serde(rename = "improvementPct")]
    pub improvement_pct: f64,
    #[serde(rename = "tStatistic")]
    pub t_statistic: f64,
    #[serde(rename = "confidenceLevel")]
    pub confidence_level: u8,
}

/// Weights of the additive match score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchWeights {
    pub base: f64,
    pub category_overlap: f64,
    pub rating: f64,
    pub review_volume: f64,
    pub location: f64,
    /// Review count at which the volume bonus stops growing
    pub review_saturation: u32,
}

pub const BASE_SCORE: f64 = 0.5;
pub const CATEGORY_OVERLAP_WEIGHT: f64 = 0.3;
pub const RATING_WEIGHT: f64 = 0.2;
pub const REVIEW_VOLUME_WEIGHT: f64 = 0.1;
pub const LOCATION_BONUS: f64 = 0.1;
pub const REVIEW_SATURATION: u32 = 50;

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            base: BASE_SCORE,
            category_overlap: CATEGORY_OVERLAP_WEIGHT,
            rating: RATING_WEIGHT,
            review_volume: REVIEW_VOLUME_WEIGHT,
            location: LOCATION_BONUS,
            review_saturation: REVIEW_SATURATION,
        }
    }
}
