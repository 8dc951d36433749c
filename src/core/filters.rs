use crate::config::HardFilterConfig;
use crate::core::{accessors, error::ScoringError};
use crate::models::{BlockReason, DealbreakerKind, PersonalityAxis, Profile, Role};

/// Verdict of the hard-filter stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Pass,
    Blocked(BlockReason),
}

/// First requirement of `holder` that `other` violates.
///
/// Unrecognized dealbreaker keys are skipped, never blocking.
pub fn violated_dealbreaker(holder: &Profile, other: &Profile) -> Option<DealbreakerKind> {
    let (recognized, unrecognized) = holder.facts.dealbreakers.requirements();

    if !unrecognized.is_empty() {
        tracing::debug!(
            "Ignoring unrecognized dealbreakers of {}: {:?}",
            holder.id,
            unrecognized
        );
    }

    recognized
        .into_iter()
        .find(|kind| kind.is_violated_by(&other.facts))
}

/// Strict SN block as seen by `holder`.
///
/// Only applies when `holder` opted into strict mode; then the pair is
/// blocked when the holder sits at the high end of SN and `other` at the low end.
pub fn sn_strict_blocks(
    holder: &Profile,
    other: &Profile,
    config: &HardFilterConfig,
) -> Result<bool, ScoringError> {
    if !accessors::strict_sn(holder) {
        return Ok(false);
    }

    let sn_self = accessors::axis(holder, PersonalityAxis::SN)?;
    let sn_other = accessors::axis(other, PersonalityAxis::SN)?;

    Ok(sn_self >= config.sn_threshold_high && sn_other <= config.sn_threshold_low)
}

/// Run every hard filter on a pair, in both directions.
///
/// Dealbreakers are checked first and need no inferred traits; the strict SN
/// check reads the SN axis of both profiles only when one side opted in.
pub fn evaluate(
    a: &Profile,
    b: &Profile,
    config: &HardFilterConfig,
) -> Result<FilterDecision, ScoringError> {
    for (role, holder, other) in [(Role::A, a, b), (Role::B, b, a)] {
        if let Some(requirement) = violated_dealbreaker(holder, other) {
            return Ok(FilterDecision::Blocked(BlockReason::Dealbreaker {
                imposed_by: role,
                requirement,
            }));
        }
    }

    for (role, holder, other) in [(Role::A, a, b), (Role::B, b, a)] {
        if sn_strict_blocks(holder, other, config)? {
            return Ok(FilterDecision::Blocked(BlockReason::SnStrictBlock { imposed_by: role }));
        }
    }

    Ok(FilterDecision::Pass)
}
