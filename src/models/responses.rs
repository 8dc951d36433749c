use serde::{Deserialize, Serialize};

use crate::models::scores::{RankedCandidate, ScoringMode};

/// Response for the rank candidates endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankCandidatesResponse {
    pub subject_id: String,
    pub mode: ScoringMode,
    pub matches: Vec<RankedCandidate>,
    pub total_candidates: usize,
    pub blocked: usize,
    pub skipped: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
