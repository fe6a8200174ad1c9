use crate::models::{MatchKey, MatchRecord};
use crate::services::postgres::PostgresError;
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Errors that can occur when persisting match results
#[derive(Debug, Error)]
pub enum MatchStoreError {
    #[error("Database error: {0}")]
    Database(#[from] PostgresError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Storage for ranked matches
///
/// Writes are upserts keyed by `(event_id, contractor_id, service_requirement_id)`,
/// so submitting the same ranking twice leaves one row per key.
#[async_trait]
pub trait MatchStore: Send + Sync {
    fn backend_tag(&self) -> &'static str {
        "unknown"
    }

    /// Insert or overwrite match rows, returning the number written
    async fn upsert_matches(&self, records: &[MatchRecord]) -> Result<u64, MatchStoreError>;

    /// Stored matches for an event, highest score first
    async fn list_matches(&self, event_id: Uuid, limit: usize) -> Result<Vec<MatchRecord>, MatchStoreError>;
}

/// Process-local match store
#[derive(Debug, Default)]
pub struct InMemoryMatchStore {
    rows: RwLock<HashMap<MatchKey, MatchRecord>>,
}

impl InMemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn get(&self, key: &MatchKey) -> Option<MatchRecord> {
        self.rows.read().await.get(key).cloned()
    }
}

#[async_trait]
impl MatchStore for InMemoryMatchStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn upsert_matches(&self, records: &[MatchRecord]) -> Result<u64, MatchStoreError> {
        let mut rows = self.rows.write().await;
        for record in records {
            rows.entry(record.key())
                .and_modify(|existing| {
                    // status is left as the event manager set it
                    existing.match_score = record.match_score;
                    existing.estimated_price_min = record.estimated_price_min;
                    existing.estimated_price_max = record.estimated_price_max;
                    existing.updated_at = record.updated_at;
                })
                .or_insert_with(|| record.clone());
        }
        Ok(records.len() as u64)
    }

    async fn list_matches(&self, event_id: Uuid, limit: usize) -> Result<Vec<MatchRecord>, MatchStoreError> {
        let rows = self.rows.read().await;
        let mut matches: Vec<MatchRecord> = rows
            .values()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect();

        matches.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.updated_at.cmp(&a.updated_at))
        });
        matches.truncate(limit);

        Ok(matches)
    }
}
