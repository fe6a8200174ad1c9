use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;

use crate::routes::{record_store_error, AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/contractors/{contractor_id}/performance",
        web::get().to(get_contractor_performance),
    );
}

/// Performance report for a contractor
///
/// GET /api/v1/contractors/{contractor_id}/performance
async fn get_contractor_performance(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let contractor_id = path.into_inner();

    let profile = match state.records.get_contractor(contractor_id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!("Failed to fetch contractor {}: {}", contractor_id, e);
            return record_store_error("Failed to fetch contractor", &e);
        }
    };

    let jobs = match state.records.get_jobs(contractor_id).await {
        Ok(jobs) => jobs,
        Err(e) => {
            tracing::error!("Failed to fetch jobs for {}: {}", contractor_id, e);
            return record_store_error("Failed to fetch jobs", &e);
        }
    };

    let report = state.performance.score(&profile, &jobs, chrono::Utc::now());

    if report.estimated {
        tracing::warn!(
            "Performance for {} includes placeholder estimates, not real history",
            contractor_id
        );
    }

    tracing::debug!(
        "Contractor {} performance: {} jobs, {:.1}% completed",
        contractor_id,
        report.sample.total_jobs,
        report.completion_rate
    );

    HttpResponse::Ok().json(report)
}
