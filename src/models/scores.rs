use serde::{Deserialize, Serialize};
use crate::models::domain::DealbreakerKind;

/// The two asymmetric roles of a scored pair.
///
/// Role A is the side whose satisfaction is more sensitive to hierarchy
/// differences; role B is the damped side. Coefficients differ per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "A", alias = "role_a")]
    A,
    #[serde(alias = "B", alias = "role_b")]
    B,
}

/// One value per role
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RolePair<T> {
    pub a: T,
    pub b: T,
}

impl<T> RolePair<T> {
    pub fn new(a: T, b: T) -> Self {
        Self { a, b }
    }

    pub fn get(&self, role: Role) -> &T {
        match role {
            Role::A => &self.a,
            Role::B => &self.b,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(Role, T) -> U) -> RolePair<U> {
        RolePair {
            a: f(Role::A, self.a),
            b: f(Role::B, self.b),
        }
    }
}

impl RolePair<f64> {
    /// Conjunctive combination: both sides must like each other
    pub fn product(&self) -> f64 {
        self.a * self.b
    }
}

/// Scoring mode, selected once per call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    #[default]
    BaselineOnly,
    #[serde(alias = "baseline_plus_ML", alias = "baseline_plus_ml")]
    BaselinePlusSynthetic,
    #[serde(alias = "cluster_adjusted_plus_ML", alias = "cluster_adjusted_plus_ml")]
    ClusterAdjustedPlusSynthetic,
}

/// Per-axis features extracted from a pair, each in [0,1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub location: f64,
    /// Education/job/income compatibility as seen by each role
    pub education: RolePair<f64>,
    pub humour: f64,
    pub personality: f64,
    pub hobbies: f64,
    pub values_politics: f64,
    pub attachment_relationship: f64,
    pub intent: f64,
    pub lifestyle: f64,
}

/// Every feature group fed into the latent scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureBreakdown {
    /// Role-specific blend of location and education
    pub demographics: RolePair<f64>,
    #[serde(flatten)]
    pub features: FeatureVector,
}

impl FeatureBreakdown {
    /// Group values in the order the latent coefficients expect them
    pub fn inputs_for(&self, role: Role) -> GroupInputs {
        GroupInputs {
            demographics: *self.demographics.get(role),
            humour: self.features.humour,
            personality: self.features.personality,
            hobbies: self.features.hobbies,
            values_politics: self.features.values_politics,
            attachment_relationship: self.features.attachment_relationship,
            intent: self.features.intent,
            lifestyle: self.features.lifestyle,
        }
    }
}

/// The eight group values one role's linear model consumes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupInputs {
    pub demographics: f64,
    pub humour: f64,
    pub personality: f64,
    pub hobbies: f64,
    pub values_politics: f64,
    pub attachment_relationship: f64,
    pub intent: f64,
    pub lifestyle: f64,
}

/// Output of the global aggregation model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub p_match: f64,
    /// Independent like probability of each side
    pub like: RolePair<f64>,
    pub latent: RolePair<f64>,
    pub details: FeatureBreakdown,
}

/// Cluster-specific probability for one role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterScore {
    pub cluster_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
    pub linear_score: f64,
    pub probability: f64,
}

/// Log-odds components of one mixed probability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogitMix {
    pub base_logit: f64,
    pub synthetic_logit: f64,
    pub final_logit: f64,
    pub probability: f64,
}

/// Final pair score for a chosen mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPair {
    pub mode: ScoringMode,
    pub p_match: f64,
    /// Probabilities fed into mixing (global or cluster-adjusted)
    pub base: RolePair<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthetic: Option<RolePair<f64>>,
    #[serde(rename = "final")]
    pub final_like: RolePair<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mixing: Option<RolePair<LogitMix>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clusters: Option<RolePair<ClusterScore>>,
    pub baseline: MatchResult,
}

/// One entry of a ranked candidate pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub candidate_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub p_match: f64,
    pub rank_score: f64,
}

/// Why the filter gate rejected a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum BlockReason {
    Dealbreaker {
        imposed_by: Role,
        requirement: DealbreakerKind,
    },
    SnStrictBlock {
        imposed_by: Role,
    },
}

impl BlockReason {
    pub fn code(&self) -> &'static str {
        match self {
            BlockReason::Dealbreaker { .. } => "dealbreaker",
            BlockReason::SnStrictBlock { .. } => "sn_strict_block",
        }
    }
}

/// Anything carrying a final match probability
pub trait MatchProbability {
    fn match_probability(&self) -> f64;
}

impl MatchProbability for MatchResult {
    fn match_probability(&self) -> f64 {
        self.p_match
    }
}

impl MatchProbability for ScoredPair {
    fn match_probability(&self) -> f64 {
        self.p_match
    }
}

/// Result of running a pair through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome<T> {
    Blocked { reason: BlockReason },
    Scored(T),
}

impl<T> Outcome<T> {
    pub fn block_reason(&self) -> Option<&BlockReason> {
        match self {
            Outcome::Blocked { reason } => Some(reason),
            Outcome::Scored(_) => None,
        }
    }

    pub fn scored(&self) -> Option<&T> {
        match self {
            Outcome::Blocked { .. } => None,
            Outcome::Scored(result) => Some(result),
        }
    }
}

impl<T: MatchProbability> Outcome<T> {
    /// Match probability, exactly 0 for blocked pairs
    pub fn p_match(&self) -> f64 {
        match self {
            Outcome::Blocked { .. } => 0.0,
            Outcome::Scored(result) => result.match_probability(),
        }
    }
}

pub type BaselineOutcome = Outcome<MatchResult>;
pub type ScoreOutcome = Outcome<ScoredPair>;
