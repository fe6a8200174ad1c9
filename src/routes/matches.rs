use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

use crate::models::{FindMatchesRequest, FindMatchesResponse, HealthResponse, ListMatchesQuery, StoredMatchesResponse};
use crate::routes::{error_response, record_store_error, AppState};
use crate::services::MatchStore;

/// Configure health and event matching routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/events/{event_id}/matches", web::post().to(find_event_matches))
        .route("/events/{event_id}/matches", web::get().to(get_event_matches));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// An empty body means "use the defaults"; anything else must be valid JSON
fn parse_find_request(body: &[u8]) -> Result<FindMatchesRequest, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(FindMatchesRequest::default());
    }
    serde_json::from_slice(body)
}

/// Rank contractors for an event
///
/// POST /api/v1/events/{event_id}/matches
///
/// Optional request body:
/// ```json
/// { "limit": 20 }
/// ```
async fn find_event_matches(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Bytes,
) -> impl Responder {
    let event_id = path.into_inner();
    let req = match parse_find_request(&body) {
        Ok(req) => req,
        Err(e) => {
            tracing::info!("Invalid matching request body for event {}: {}", event_id, e);
            return error_response(400, "Invalid JSON", e.to_string());
        }
    };

    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for event {} matching request: {:?}", event_id, errors);
        return error_response(400, "Validation failed", errors.to_string());
    }

    let limit = req
        .limit
        .unwrap_or(state.matching.default_limit)
        .min(state.matching.max_limit) as usize;

    tracing::info!("Finding contractor matches for event: {}, limit: {}", event_id, limit);

    let event = match state.records.get_event(event_id).await {
        Ok(event) => event,
        Err(e) => {
            tracing::error!("Failed to fetch event {}: {}", event_id, e);
            return record_store_error("Failed to fetch event", &e);
        }
    };

    let requirements = match state.records.get_service_requirements(event_id).await {
        Ok(requirements) => requirements,
        Err(e) => {
            tracing::error!("Failed to fetch service requirements for {}: {}", event_id, e);
            return record_store_error("Failed to fetch service requirements", &e);
        }
    };

    if requirements.is_empty() {
        tracing::info!("Event {} has no service requirements, nothing to match", event_id);
        return HttpResponse::Ok().json(FindMatchesResponse {
            matches: vec![],
            success: true,
        });
    }

    let mut categories: Vec<String> = Vec::with_capacity(requirements.len());
    for requirement in &requirements {
        if !categories.contains(&requirement.category) {
            categories.push(requirement.category.clone());
        }
    }

    let candidates = match state.records.query_contractors(&categories).await {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!("Failed to query contractors for {}: {}", event_id, e);
            return record_store_error("Failed to query contractors", &e);
        }
    };

    tracing::debug!("Found {} candidate contractors for event {}", candidates.len(), event_id);

    let total_candidates = candidates.len();
    let mut matches = state
        .ranker
        .rank_and_persist(
            event_id,
            &requirements,
            candidates,
            event.location_data.as_ref(),
            state.postgres.as_ref(),
        )
        .await;
    matches.truncate(limit);

    tracing::info!(
        "Returning {} matches for event {} (from {} candidates)",
        matches.len(),
        event_id,
        total_candidates
    );

    HttpResponse::Ok().json(FindMatchesResponse {
        matches,
        success: true,
    })
}

/// Previously stored matches for an event
///
/// GET /api/v1/events/{event_id}/matches?limit={limit}
async fn get_event_matches(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<ListMatchesQuery>,
) -> impl Responder {
    let event_id = path.into_inner();

    if let Err(errors) = query.validate() {
        return error_response(400, "Validation failed", errors.to_string());
    }

    match state.postgres.list_matches(event_id, query.limit as usize).await {
        Ok(matches) => {
            let total_results = matches.len();
            HttpResponse::Ok().json(StoredMatchesResponse {
                matches,
                total_results,
            })
        }
        Err(e) => {
            tracing::error!("Failed to fetch stored matches for {}: {}", event_id, e);
            error_response(500, "Failed to fetch stored matches", e.to_string())
        }
    }
}
