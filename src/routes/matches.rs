use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::{Matcher, RandSource, Ranking, ScoringError};
use crate::models::{
    ErrorResponse, HealthResponse, RankCandidatesRequest, RankCandidatesResponse, ScorePairRequest,
};

/// Application state shared across all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub matcher: Matcher,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/score", web::post().to(score_pair))
        .route("/matches/rank", web::post().to(rank_candidates));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

fn validation_failed(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

fn unscorable(e: ScoringError) -> HttpResponse {
    HttpResponse::UnprocessableEntity().json(ErrorResponse {
        error: "Pair cannot be scored".to_string(),
        message: e.to_string(),
        status_code: 422,
    })
}

/// Score one pair
///
/// POST /api/v1/matches/score
///
/// Request body:
/// ```json
/// {
///   "roleA": { "id": "string", "facts": {}, "inferences": {} },
///   "roleB": { "id": "string", "facts": {}, "inferences": {} },
///   "mode": "baseline_only|baseline_plus_synthetic|cluster_adjusted_plus_synthetic",
///   "alphaA": 0.7,
///   "alphaB": 0.7
/// }
/// ```
async fn score_pair(
    state: web::Data<AppState>,
    req: web::Json<ScorePairRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for score request: {:?}", errors);
        return validation_failed(errors);
    }

    let weights = req.weights(state.matcher.config().mixing.default_weights);

    match state.matcher.score_pair(&req.role_a, &req.role_b, req.mode, weights) {
        Ok(outcome) => {
            tracing::info!(
                "Scored {} / {} ({:?}): p_match={:.4}",
                req.role_a.id,
                req.role_b.id,
                req.mode,
                outcome.p_match()
            );
            HttpResponse::Ok().json(outcome)
        }
        Err(e) => {
            tracing::warn!("Failed to score {} / {}: {}", req.role_a.id, req.role_b.id, e);
            unscorable(e)
        }
    }
}

/// Rank a candidate pool for one subject
///
/// POST /api/v1/matches/rank
///
/// Request body:
/// ```json
/// {
///   "subject": { "id": "string" },
///   "subjectRole": "a",
///   "candidates": [{ "id": "string" }],
///   "mode": "baseline_only",
///   "limit": 20,
///   "seed": 42
/// }
/// ```
async fn rank_candidates(
    state: web::Data<AppState>,
    req: web::Json<RankCandidatesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for rank request: {:?}", errors);
        return validation_failed(errors);
    }

    let req = req.into_inner();
    let matcher = state.matcher.clone();
    let weights = req.weights(matcher.config().mixing.default_weights);
    let subject_id = req.subject.id.clone();
    let mode = req.mode;

    tracing::info!(
        "Ranking {} candidates for {} ({:?})",
        req.candidates.len(),
        subject_id,
        mode
    );

    // Scoring is CPU-bound; keep it off the async workers
    let result = web::block(move || -> Result<Ranking, ScoringError> {
        let limit = req.limit as usize;
        match req.seed {
            Some(seed) => matcher.rank_candidates(
                &req.subject,
                req.subject_role,
                &req.candidates,
                req.mode,
                weights,
                limit,
                &mut RandSource::seeded(seed),
            ),
            None => matcher.rank_candidates(
                &req.subject,
                req.subject_role,
                &req.candidates,
                req.mode,
                weights,
                limit,
                &mut RandSource::from_entropy(),
            ),
        }
    })
    .await;

    match result {
        Ok(Ok(ranking)) => {
            tracing::info!(
                "Returning {} matches for {} (from {} candidates)",
                ranking.matches.len(),
                subject_id,
                ranking.total_candidates
            );
            HttpResponse::Ok().json(RankCandidatesResponse {
                subject_id,
                mode,
                matches: ranking.matches,
                total_candidates: ranking.total_candidates,
                blocked: ranking.blocked,
                skipped: ranking.skipped,
            })
        }
        Ok(Err(e)) => unscorable(e),
        Err(e) => {
            tracing::error!("Ranking task failed for {}: {}", subject_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Ranking failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}
