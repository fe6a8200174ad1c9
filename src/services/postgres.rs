use crate::models::{MatchRecord, MatchStatus};
use crate::services::store::{MatchStore, MatchStoreError};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

/// PostgreSQL client for the event/contractor match table
///
/// Ranked matches are cached here so event managers can revisit a
/// suggestion list without re-running the ranking. Rows are derived data;
/// the ranking endpoint rewrites them on every run.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout_secs: u64,
        idle_timeout_secs: u64,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(idle_timeout_secs))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            acquire_timeout_secs.unwrap_or(5),
            idle_timeout_secs.unwrap_or(600),
        )
        .await
    }

    /// Pool that opens connections on first use; migrations are not run
    pub fn connect_lazy(database_url: &str, acquire_timeout_secs: u64) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }

    /// Insert or overwrite a batch of matches in one transaction
    ///
    /// Uses INSERT ... ON CONFLICT on (event_id, contractor_id, service_requirement_id),
    /// so repeated rankings update scores instead of adding rows.
    pub async fn upsert_match_records(&self, records: &[MatchRecord]) -> Result<u64, PostgresError> {
        let query = r#"
            INSERT INTO event_contractor_matches
                (event_id, contractor_id, service_requirement_id, match_score,
                 estimated_price_min, estimated_price_max, status, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (event_id, contractor_id, service_requirement_id)
            DO UPDATE SET
                match_score = EXCLUDED.match_score,
                estimated_price_min = EXCLUDED.estimated_price_min,
                estimated_price_max = EXCLUDED.estimated_price_max,
                updated_at = EXCLUDED.updated_at
        "#;

        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for record in records {
            let result = sqlx::query(query)
                .bind(record.event_id)
                .bind(record.contractor_id)
                .bind(record.service_requirement_id)
                .bind(record.match_score)
                .bind(record.estimated_price_min)
                .bind(record.estimated_price_max)
                .bind(record.status)
                .bind(record.updated_at)
                .execute(&mut *tx)
                .await?;
            written += result.rows_affected();
        }

        tx.commit().await?;

        tracing::debug!("Upserted {} event matches", written);

        Ok(written)
    }

    /// Stored matches for an event, best first
    pub async fn get_event_matches(
        &self,
        event_id: Uuid,
        limit: usize,
    ) -> Result<Vec<MatchRecord>, PostgresError> {
        let query = r#"
            SELECT event_id, contractor_id, service_requirement_id, match_score,
                   estimated_price_min, estimated_price_max, status, updated_at
            FROM event_contractor_matches
            WHERE event_id = $1
            ORDER BY match_score DESC, updated_at DESC
            LIMIT $2
        "#;

        let rows = sqlx::query(query)
            .bind(event_id)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        let matches = rows
            .iter()
            .map(|row| MatchRecord {
                event_id: row.get("event_id"),
                contractor_id: row.get("contractor_id"),
                service_requirement_id: row.get("service_requirement_id"),
                match_score: row.get("match_score"),
                estimated_price_min: row.get("estimated_price_min"),
                estimated_price_max: row.get("estimated_price_max"),
                status: row.get::<MatchStatus, _>("status"),
                updated_at: row.get("updated_at"),
            })
            .collect();

        Ok(matches)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[async_trait]
impl MatchStore for PostgresClient {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    async fn upsert_matches(&self, records: &[MatchRecord]) -> Result<u64, MatchStoreError> {
        Ok(self.upsert_match_records(records).await?)
    }

    async fn list_matches(&self, event_id: Uuid, limit: usize) -> Result<Vec<MatchRecord>, MatchStoreError> {
        Ok(self.get_event_matches(event_id, limit).await?)
    }
}
