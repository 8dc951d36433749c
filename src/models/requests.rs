use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::Profile;
use crate::models::scores::{Role, RolePair, ScoringMode};

/// Request to score one pair
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScorePairRequest {
    #[serde(alias = "role_a", rename = "roleA")]
    pub role_a: Profile,
    #[serde(alias = "role_b", rename = "roleB")]
    pub role_b: Profile,
    #[serde(default)]
    pub mode: ScoringMode,
    /// Role A's trust in the base probability when mixing
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default, alias = "alpha_a", rename = "alphaA")]
    pub alpha_a: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default, alias = "alpha_b", rename = "alphaB")]
    pub alpha_b: Option<f64>,
}

impl ScorePairRequest {
    pub fn weights(&self, defaults: RolePair<f64>) -> RolePair<f64> {
        resolve_weights(self.alpha_a, self.alpha_b, defaults)
    }
}

/// Request to rank a pool of candidates for one subject
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RankCandidatesRequest {
    pub subject: Profile,
    #[serde(default = "default_subject_role", alias = "subject_role", rename = "subjectRole")]
    pub subject_role: Role,
    #[validate(length(min = 1, max = 1000))]
    pub candidates: Vec<Profile>,
    #[serde(default)]
    pub mode: ScoringMode,
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default, alias = "alpha_a", rename = "alphaA")]
    pub alpha_a: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default, alias = "alpha_b", rename = "alphaB")]
    pub alpha_b: Option<f64>,
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_limit")]
    pub limit: u16,
    /// Fixes the ranking noise; omitted means a fresh draw per request
    #[serde(default)]
    pub seed: Option<u64>,
}

impl RankCandidatesRequest {
    pub fn weights(&self, defaults: RolePair<f64>) -> RolePair<f64> {
        resolve_weights(self.alpha_a, self.alpha_b, defaults)
    }
}

fn resolve_weights(a: Option<f64>, b: Option<f64>, defaults: RolePair<f64>) -> RolePair<f64> {
    RolePair::new(a.unwrap_or(defaults.a), b.unwrap_or(defaults.b))
}

fn default_subject_role() -> Role {
    Role::A
}

fn default_limit() -> u16 {
    20
}
