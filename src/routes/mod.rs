pub mod matches;
pub mod performance;

use actix_web::{web, HttpResponse};
use std::sync::Arc;

use crate::config::MatchingSettings;
use crate::core::{ContractorRanker, PerformanceScorer};
use crate::models::ErrorResponse;
use crate::services::{PostgresClient, RecordStoreClient, RecordStoreError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub records: Arc<RecordStoreClient>,
    pub postgres: Arc<PostgresClient>,
    pub ranker: ContractorRanker,
    pub performance: PerformanceScorer,
    pub matching: MatchingSettings,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(performance::configure)
            .configure(ab_tests::configure),
    );
}

/// JSON error body with the matching status code
pub(crate) fn error_response(status_code: u16, error: &str, message: String) -> HttpResponse {
    let status = actix_web::http::StatusCode::from_u16(status_code)
        .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);

    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code,
    })
}

/// Map a record store failure: missing records are 404, everything else 500
pub(crate) fn record_store_error(error: &str, err: &RecordStoreError) -> HttpResponse {
    match err {
        RecordStoreError::NotFound(_) => error_response(404, error, err.to_string()),
        _ => error_response(500, error, err.to_string()),
    }
}
