use actix_web::{web, HttpResponse, Responder};
use crate::core::{MatchError, RankingPipeline};
use crate::models::{ErrorResponse, HealthResponse, MatchRequest, MatchResponse, ServiceInfo};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: RankingPipeline,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/", web::get().to(index))
        .route("/health", web::get().to(health_check))
        .route("/matches", web::post().to(find_matches));
}

/// Service banner
async fn index() -> impl Responder {
    HttpResponse::Ok().json(ServiceInfo {
        message: "MatchOS Matching Engine (AI Enabled)".to_string(),
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = state.pipeline.store().health_check().await;

    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Rank providers for a service request
///
/// POST /matches
///
/// Request body:
/// ```json
/// { "requestId": "string" }
/// ```
///
/// Responds with the request and every provider ordered by score, highest
/// first. Providers the scorer failed on are included with score 0.
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<MatchRequest>,
) -> impl Responder {
    let request_id = &req.request_id;

    tracing::info!("Received matching request for ID: {}", request_id);

    match state.pipeline.run(request_id).await {
        Ok(result) => {
            tracing::info!(
                "Returning {} matches for request {}",
                result.matches.len(),
                request_id
            );
            HttpResponse::Ok().json(MatchResponse {
                request: result.request,
                matches: result.matches,
            })
        }
        Err(MatchError::NotFound(msg)) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Request not found".to_string(),
            message: msg,
            status_code: 404,
        }),
        Err(e @ MatchError::Retrieval(_)) => {
            tracing::error!("Failed to rank providers for {}: {}", request_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Retrieval failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}
