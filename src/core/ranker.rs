use std::collections::HashSet;

use chrono::Utc;
use uuid::Uuid;

use crate::core::scoring::MatchScorer;
use crate::models::{
    ContractorProfile, EventLocation, MatchRecord, MatchResult, MatchWeights, PriceEstimate,
    ServicePriceRange, ServiceRequirement,
};
use crate::services::store::MatchStore;

/// Ranks candidate contractors for an event
///
/// # Pipeline Stages
/// 1. Union of the event's requirement categories
/// 2. Match scoring per candidate
/// 3. Price estimation from the candidate's matching services
/// 4. Stable sort by score (descending)
#[derive(Debug, Clone, Default)]
pub struct ContractorRanker {
    scorer: MatchScorer,
}

impl ContractorRanker {
    pub fn new(scorer: MatchScorer) -> Self {
        Self { scorer }
    }

    pub fn with_weights(weights: MatchWeights) -> Self {
        Self::new(MatchScorer::new(weights))
    }

    pub fn scorer(&self) -> &MatchScorer {
        &self.scorer
    }

    /// Score and order candidates for the given requirements
    ///
    /// Candidates with equal scores keep their input order.
    pub fn rank(
        &self,
        requirements: &[ServiceRequirement],
        candidates: Vec<ContractorProfile>,
        event_location: Option<&EventLocation>,
    ) -> Vec<MatchResult> {
        let categories: HashSet<String> = requirements.iter().map(|r| r.category.clone()).collect();

        let mut results: Vec<MatchResult> = candidates
            .into_iter()
            .map(|contractor| {
                let match_score = self.scorer.score(&categories, &contractor, event_location);
                let estimated_price = estimate_price(&contractor.services, &categories);
                let primary = primary_requirement(requirements, &contractor);
                let rating = contractor.rating();

                MatchResult {
                    contractor_id: contractor.id,
                    business_name: contractor.business_name,
                    service_category: primary.map(|r| r.category.clone()),
                    service_requirement_id: primary.map(|r| r.id),
                    match_score,
                    estimated_price,
                    rating,
                    review_count: contractor.review_count,
                }
            })
            .collect();

        // sort_by is stable, which keeps input order for ties
        results.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        results
    }

    /// Rank candidates, then upsert the ranking into `store`
    ///
    /// A failed write is logged and the ranking is still returned.
    pub async fn rank_and_persist(
        &self,
        event_id: Uuid,
        requirements: &[ServiceRequirement],
        candidates: Vec<ContractorProfile>,
        event_location: Option<&EventLocation>,
        store: &dyn MatchStore,
    ) -> Vec<MatchResult> {
        let results = self.rank(requirements, candidates, event_location);

        let now = Utc::now();
        let records: Vec<MatchRecord> = results
            .iter()
            .filter_map(|result| MatchRecord::from_result(event_id, result, now))
            .collect();

        if records.len() < results.len() {
            tracing::debug!(
                "Skipping {} matches without a covered requirement for event {}",
                results.len() - records.len(),
                event_id
            );
        }

        if records.is_empty() {
            return results;
        }

        match store.upsert_matches(&records).await {
            Ok(written) => {
                tracing::debug!(
                    "Stored {} matches for event {} ({})",
                    written,
                    event_id,
                    store.backend_tag()
                );
            }
            Err(e) => {
                tracing::warn!("Failed to store matches for event {}, returning ranking anyway: {}", event_id, e);
            }
        }

        results
    }
}

/// Price span over the contractor's services in the requested categories
///
/// Each bound defaults to 0 when no matching service lists it.
pub fn estimate_price(services: &[ServicePriceRange], categories: &HashSet<String>) -> PriceEstimate {
    let min = matching_services(services, categories)
        .filter_map(|s| s.price_range_min)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))))
        .unwrap_or(0.0);
    let max = matching_services(services, categories)
        .filter_map(|s| s.price_range_max)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
        .unwrap_or(0.0);

    PriceEstimate { min, max }
}

fn matching_services<'a>(
    services: &'a [ServicePriceRange],
    categories: &'a HashSet<String>,
) -> impl Iterator<Item = &'a ServicePriceRange> + 'a {
    services
        .iter()
        .filter(move |s| categories.contains(s.category.as_str()))
}

/// First requirement, in event order, that the contractor offers
fn primary_requirement<'a>(
    requirements: &'a [ServiceRequirement],
    contractor: &ContractorProfile,
) -> Option<&'a ServiceRequirement> {
    requirements
        .iter()
        .find(|r| contractor.service_categories.iter().any(|c| c == &r.category))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    fn requirement(category: &str) -> ServiceRequirement {
        ServiceRequirement {
            id: Uuid::new_v4(),
            event_id: Uuid::nil(),
            category: category.to_string(),
            priority: Priority::High,
            is_required: true,
        }
    }

    fn price(category: &str, min: Option<f64>, max: Option<f64>) -> ServicePriceRange {
        ServicePriceRange {
            category: category.to_string(),
            price_range_min: min,
            price_range_max: max,
        }
    }

    fn candidate(name: &str, categories: &[&str], rating: f64, reviews: u32) -> ContractorProfile {
        ContractorProfile {
            id: Uuid::new_v4(),
            business_name: name.to_string(),
            service_categories: categories.iter().map(|c| c.to_string()).collect(),
            average_rating: Some(rating),
            review_count: reviews,
            service_areas: vec![],
            services: vec![],
            is_verified: true,
            last_sign_in_at: None,
            avg_response_time_minutes: None,
            customer_satisfaction: None,
        }
    }

    #[test]
    fn test_rank_orders_by_score() {
        let ranker = ContractorRanker::default();
        let requirements = vec![requirement("catering")];

        let candidates = vec![
            candidate("low", &["catering"], 2.0, 0),
            candidate("high", &["catering"], 5.0, 50),
            candidate("none", &["music"], 5.0, 50),
        ];

        let results = ranker.rank(&requirements, candidates, None);

        assert_eq!(results[0].business_name, "high");
        assert_eq!(results[0].match_score, 1.0);
        assert_eq!(results[1].business_name, "low");
        assert_eq!(results[1].match_score, 0.88);
        assert_eq!(results[2].business_name, "none");
        assert!(results[2].service_category.is_none());
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ranker = ContractorRanker::default();
        let requirements = vec![requirement("catering")];

        let candidates: Vec<ContractorProfile> = (0..5)
            .map(|i| candidate(&format!("c{}", i), &["catering"], 4.0, 10))
            .collect();

        let results = ranker.rank(&requirements, candidates, None);
        let names: Vec<&str> = results.iter().map(|r| r.business_name.as_str()).collect();

        assert_eq!(names, vec!["c0", "c1", "c2", "c3", "c4"]);
    }

    #[test]
    fn test_primary_requirement_follows_event_order() {
        let ranker = ContractorRanker::default();
        let requirements = vec![requirement("venue"), requirement("catering"), requirement("music")];
        let c = candidate("multi", &["music", "catering"], 4.0, 10);

        let results = ranker.rank(&requirements, vec![c], None);

        assert_eq!(results[0].service_category.as_deref(), Some("catering"));
        assert_eq!(results[0].service_requirement_id, Some(requirements[1].id));
    }

    #[test]
    fn test_estimate_price() {
        let categories: HashSet<String> = ["catering".to_string(), "music".to_string()].into();
        let services = vec![
            price("catering", Some(500.0), Some(2000.0)),
            price("music", Some(300.0), None),
            price("venue", Some(50.0), Some(9000.0)),
        ];

        let estimate = estimate_price(&services, &categories);

        assert_eq!(estimate, PriceEstimate { min: 300.0, max: 2000.0 });
    }

    #[test]
    fn test_estimate_price_defaults_to_zero() {
        let categories: HashSet<String> = ["catering".to_string()].into();
        let services = vec![price("venue", Some(50.0), Some(9000.0))];

        assert_eq!(estimate_price(&services, &categories), PriceEstimate::default());
    }
}
