use thiserror::Error;

use crate::models::Role;

/// Errors that stop a pair from being scored.
///
/// Hard-filter blocks are not errors; they are reported as
/// [`Outcome::Blocked`](crate::models::Outcome).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScoringError {
    #[error("profile {profile_id} is incomplete: missing {field}")]
    IncompleteProfile { profile_id: String, field: &'static str },

    #[error("mixing weight for role {role:?} must be a finite value in [0, 1], got {weight}")]
    InvalidMixingWeight { role: Role, weight: f64 },
}
