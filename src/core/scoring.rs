use std::collections::HashSet;

use crate::models::{ContractorProfile, EventLocation, MatchWeights};

/// Highest score a contractor can reach
pub const MAX_SCORE: f64 = 1.0;

/// Highest possible average rating
pub const MAX_RATING: f64 = 5.0;

/// Scores how well a contractor fits an event's service requirements
///
/// Scoring formula (additive, then capped):
/// score = min(
///     0.5 +                                   # base
///     overlap_ratio * 0.3 +                   # shared service categories
///     (rating / 5) * 0.2 +                    # average rating
///     min(reviews / 50, 1) * 0.1 +            # review volume, saturating
///     location_match * 0.1,                   # serves the event's city/region
///     1.0
/// )
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchScorer {
    weights: MatchWeights,
}

impl MatchScorer {
    pub fn new(weights: MatchWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &MatchWeights {
        &self.weights
    }

    /// Calculate the match score (0-1), rounded to two decimals
    pub fn score(
        &self,
        requirement_categories: &HashSet<String>,
        contractor: &ContractorProfile,
        event_location: Option<&EventLocation>,
    ) -> f64 {
        let overlap = category_overlap_ratio(requirement_categories, &contractor.service_categories);
        let rating = contractor.rating() / MAX_RATING;
        let volume = review_volume_ratio(contractor.review_count, self.weights.review_saturation);
        let location = match event_location {
            Some(loc) if serves_location(&contractor.service_areas, loc) => 1.0,
            _ => 0.0,
        };

        let total = self.weights.base
            + overlap * self.weights.category_overlap
            + rating * self.weights.rating
            + volume * self.weights.review_volume
            + location * self.weights.location;

        round_score(total.clamp(0.0, MAX_SCORE))
    }
}

/// Fraction of requirement categories the contractor offers (0-1)
///
/// An empty requirement set has no overlap to reward and yields 0.
#[inline]
pub fn category_overlap_ratio(requirement_categories: &HashSet<String>, offered: &[String]) -> f64 {
    if requirement_categories.is_empty() {
        return 0.0;
    }

    let matching = offered
        .iter()
        .filter(|c| requirement_categories.contains(c.as_str()))
        .collect::<HashSet<_>>()
        .len();

    matching as f64 / requirement_categories.len() as f64
}

/// Review volume confidence (0-1), flat once `saturation` reviews are reached
#[inline]
pub fn review_volume_ratio(review_count: u32, saturation: u32) -> f64 {
    if saturation == 0 {
        return 1.0;
    }
    (review_count as f64 / saturation as f64).min(1.0)
}

/// True if any service area mentions the event's city or region
pub fn serves_location(service_areas: &[String], location: &EventLocation) -> bool {
    let needles: Vec<String> = [location.city.as_deref(), location.region.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect();

    if needles.is_empty() {
        return false;
    }

    service_areas.iter().any(|area| {
        let area = area.to_lowercase();
        needles.iter().any(|needle| area.contains(needle.as_str()))
    })
}

#[inline]
fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn contractor(categories: &[&str], rating: Option<f64>, reviews: u32, areas: &[&str]) -> ContractorProfile {
        ContractorProfile {
            id: Uuid::new_v4(),
            business_name: "Test Co".to_string(),
            service_categories: categories.iter().map(|c| c.to_string()).collect(),
            average_rating: rating,
            review_count: reviews,
            service_areas: areas.iter().map(|a| a.to_string()).collect(),
            services: vec![],
            is_verified: true,
            last_sign_in_at: None,
            avg_response_time_minutes: None,
            customer_satisfaction: None,
        }
    }

    fn categories(items: &[&str]) -> HashSet<String> {
        items.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_score_is_capped() {
        let scorer = MatchScorer::default();
        let c = contractor(&["catering", "photography"], Some(4.5), 60, &["Auckland"]);

        let score = scorer.score(&categories(&["catering"]), &c, Some(&EventLocation::city("Auckland")));

        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_partial_score() {
        let scorer = MatchScorer::default();
        let c = contractor(&["catering"], Some(3.0), 0, &[]);

        // 0.5 + 0.5 * 0.3 + 0.6 * 0.2
        let score = scorer.score(&categories(&["catering", "music"]), &c, None);

        assert_eq!(score, 0.77);
    }

    #[test]
    fn test_empty_requirements() {
        let scorer = MatchScorer::default();
        let c = contractor(&["catering"], Some(5.0), 50, &[]);

        let score = scorer.score(&HashSet::new(), &c, None);

        assert_eq!(score, 0.8);
    }

    #[test]
    fn test_overlap_ratio() {
        let req = categories(&["catering", "music", "venue", "photography"]);
        let offered = vec!["music".to_string(), "venue".to_string(), "music".to_string()];

        assert_eq!(category_overlap_ratio(&req, &offered), 0.5);
        assert_eq!(category_overlap_ratio(&HashSet::new(), &offered), 0.0);
    }

    #[test]
    fn test_review_volume_saturates() {
        assert_eq!(review_volume_ratio(25, 50), 0.5);
        assert_eq!(review_volume_ratio(50, 50), 1.0);
        assert_eq!(review_volume_ratio(500, 50), 1.0);
        assert_eq!(review_volume_ratio(3, 0), 1.0);
    }

    #[test]
    fn test_location_case_insensitive() {
        let areas = vec!["Greater AUCKLAND region".to_string()];
        assert!(serves_location(&areas, &EventLocation::city("auckland")));

        let by_region = EventLocation {
            city: None,
            region: Some("Waikato".to_string()),
        };
        assert!(!serves_location(&areas, &by_region));
    }

    #[test]
    fn test_blank_location_never_matches() {
        let areas = vec!["Wellington".to_string()];
        let blank = EventLocation {
            city: Some("  ".to_string()),
            region: None,
        };

        assert!(!serves_location(&areas, &blank));
        assert!(!serves_location(&areas, &EventLocation::default()));
    }

    #[test]
    fn test_out_of_range_rating_is_clamped() {
        let scorer = MatchScorer::default();
        let negative = contractor(&[], Some(-3.0), 0, &[]);
        let nan = contractor(&[], Some(f64::NAN), 0, &[]);

        assert_eq!(scorer.score(&HashSet::new(), &negative, None), 0.5);
        assert_eq!(scorer.score(&HashSet::new(), &nan, None), 0.5);
    }
}
