// Model exports
pub mod domain;
pub mod requests;
pub mod responses;
pub mod scores;

pub use domain::{
    Attachment, DealbreakerKind, Dealbreakers, Facts, Flag, Habit, Hobby, HumourProfile,
    Inferences, MatchingPrefs, PersonalityAxes, PersonalityAxis, PoliticalLean, Profile,
    RelationshipIntent, RelationshipStyle, Trait,
};
pub use requests::{RankCandidatesRequest, ScorePairRequest};
pub use responses::{ErrorResponse, HealthResponse, RankCandidatesResponse};
pub use scores::{
    BaselineOutcome, BlockReason, ClusterScore, FeatureBreakdown, FeatureVector, GroupInputs,
    LogitMix, MatchProbability, MatchResult, Outcome, RankedCandidate, Role, RolePair,
    ScoreOutcome, ScoredPair, ScoringMode,
};
