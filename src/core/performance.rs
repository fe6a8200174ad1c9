use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::models::{ContractorPerformance, ContractorProfile, JobRecord, JobStatus, PerformanceSample};

/// A contractor who signed in within this window counts as active
pub const ACTIVE_WINDOW_HOURS: i64 = 168;

const COMPLETION_SHARE: f64 = 0.6;
const SATISFACTION_SHARE: f64 = 0.4;
const MAX_SATISFACTION: f64 = 5.0;

/// Supplies response time and satisfaction when a profile has none stored
///
/// There is no historical data source for these metrics yet; the
/// implementations below are the only ones available.
pub trait MetricEstimator: Send + Sync + std::fmt::Debug {
    fn response_time_minutes(&self, profile: &ContractorProfile) -> Option<f64>;
    fn customer_satisfaction(&self, profile: &ContractorProfile) -> Option<f64>;
}

/// Leaves missing metrics unset
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEstimator;

impl MetricEstimator for NoEstimator {
    fn response_time_minutes(&self, _profile: &ContractorProfile) -> Option<f64> {
        None
    }

    fn customer_satisfaction(&self, _profile: &ContractorProfile) -> Option<f64> {
        None
    }
}

/// Bounded random values for demo and staging data only.
///
/// Results produced with it are marked `estimated`. Not for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderEstimator;

impl PlaceholderEstimator {
    pub const RESPONSE_TIME_MINUTES: std::ops::Range<f64> = 15.0..75.0;
    pub const SATISFACTION: std::ops::Range<f64> = 4.0..5.0;
}

impl MetricEstimator for PlaceholderEstimator {
    fn response_time_minutes(&self, _profile: &ContractorProfile) -> Option<f64> {
        Some(rand::thread_rng().gen_range(Self::RESPONSE_TIME_MINUTES))
    }

    fn customer_satisfaction(&self, _profile: &ContractorProfile) -> Option<f64> {
        Some(rand::thread_rng().gen_range(Self::SATISFACTION))
    }
}

/// Aggregates a contractor's job history into a performance report
#[derive(Debug, Clone)]
pub struct PerformanceScorer {
    estimator: Arc<dyn MetricEstimator>,
}

impl PerformanceScorer {
    pub fn new(estimator: Arc<dyn MetricEstimator>) -> Self {
        Self { estimator }
    }

    /// Score a contractor as of `now`
    pub fn score(
        &self,
        profile: &ContractorProfile,
        jobs: &[JobRecord],
        now: DateTime<Utc>,
    ) -> ContractorPerformance {
        let jobs: Vec<&JobRecord> = jobs.iter().filter(|j| j.contractor_id == profile.id).collect();
        let total_jobs = jobs.len() as u32;
        let completed: Vec<&&JobRecord> = jobs.iter().filter(|j| j.status == JobStatus::Completed).collect();
        let completed_jobs = completed.len() as u32;
        let revenue: f64 = completed.iter().filter_map(|j| j.amount).sum();

        let mut estimated = false;

        let response_time_minutes = match profile.avg_response_time_minutes {
            Some(minutes) => Some(minutes),
            None => {
                let guess = self.estimator.response_time_minutes(profile);
                estimated |= guess.is_some();
                guess
            }
        };

        let customer_satisfaction = match profile.customer_satisfaction {
            Some(value) => Some(value),
            None => {
                let guess = self.estimator.customer_satisfaction(profile);
                estimated |= guess.is_some();
                guess
            }
        };

        let completion_rate = completion_rate(completed_jobs, total_jobs);

        ContractorPerformance {
            sample: PerformanceSample {
                contractor_id: profile.id,
                total_jobs,
                completed_jobs,
                revenue,
                response_time_minutes,
            },
            completion_rate,
            customer_satisfaction,
            is_active: is_active(profile.last_sign_in_at, now),
            overall_score: overall_score(completion_rate, customer_satisfaction),
            estimated,
        }
    }
}

impl Default for PerformanceScorer {
    fn default() -> Self {
        Self::new(Arc::new(NoEstimator))
    }
}

/// Completed share of jobs in percent; zero jobs gives 0
#[inline]
pub fn completion_rate(completed_jobs: u32, total_jobs: u32) -> f64 {
    completed_jobs as f64 / total_jobs.max(1) as f64 * 100.0
}

/// True if the last sign-in falls inside the activity window
pub fn is_active(last_sign_in_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_sign_in_at {
        Some(at) => now - at <= Duration::hours(ACTIVE_WINDOW_HOURS),
        None => false,
    }
}

/// Overall score (0-100) from completion rate and, if known, satisfaction
pub fn overall_score(completion_rate: f64, customer_satisfaction: Option<f64>) -> f64 {
    let score = match customer_satisfaction {
        Some(satisfaction) => {
            let satisfaction_pct = (satisfaction / MAX_SATISFACTION).clamp(0.0, 1.0) * 100.0;
            completion_rate * COMPLETION_SHARE + satisfaction_pct * SATISFACTION_SHARE
        }
        None => completion_rate,
    };

    (score.clamp(0.0, 100.0) * 100.0).round() / 100.0
}
