//! Safe field extraction over profiles.
//!
//! Upstream profiles are enriched incrementally, so almost every field may be
//! missing. Each accessor resolves a missing or non-finite value to a
//! documented neutral default. Personality axes are the exception: they are
//! present by construction upstream and their absence is an error.

use crate::config::BASELINE_CLUSTER;
use crate::core::error::ScoringError;
use crate::models::{
    Habit, HumourProfile, PersonalityAxis, Profile, Trait,
};

/// Default for any missing [0,1] trait
pub const NEUTRAL: f64 = 0.5;

/// Default for a missing ordinal fact (education tier, job difficulty, income band)
pub const DEFAULT_ORDINAL: f64 = 1.0;

/// Read a trait value, falling back to `default` when absent or non-finite
#[inline]
pub fn trait_or(value: Option<&Trait>, default: f64) -> f64 {
    match value {
        Some(t) if t.value.is_finite() => t.value,
        _ => default,
    }
}

/// Read a required personality axis
pub fn axis(profile: &Profile, axis: PersonalityAxis) -> Result<f64, ScoringError> {
    match profile.inferences.personality.get(axis) {
        Some(t) if t.value.is_finite() => Ok(t.value),
        _ => Err(ScoringError::IncompleteProfile {
            profile_id: profile.id.clone(),
            field: axis.field_path(),
        }),
    }
}

/// Whether the profile opted into strict matching on the SN axis
pub fn strict_sn(profile: &Profile) -> bool {
    profile
        .inferences
        .matching_prefs
        .sn_strict_mode
        .map(|flag| flag.value)
        .unwrap_or(false)
}

/// Ordinal hierarchy position of a profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HierarchyLevels {
    pub education: f64,
    pub job: f64,
    pub income: f64,
}

pub fn hierarchy(profile: &Profile) -> HierarchyLevels {
    let ordinal = |v: Option<u8>| v.map(f64::from).unwrap_or(DEFAULT_ORDINAL);
    HierarchyLevels {
        education: ordinal(profile.facts.education_tier),
        job: ordinal(profile.facts.job_difficulty),
        income: ordinal(profile.facts.income_band),
    }
}

/// Current area, ignoring blank strings
pub fn area(profile: &Profile) -> Option<&str> {
    profile
        .facts
        .current_area
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
}

pub fn humour(profile: &Profile) -> Option<&HumourProfile> {
    profile.inferences.humour.as_ref()
}

pub fn value_trait(profile: &Profile, key: &str) -> f64 {
    trait_or(profile.inferences.values.get(key), NEUTRAL)
}

pub fn political_lean(profile: &Profile) -> f64 {
    trait_or(
        profile
            .inferences
            .political_lean
            .as_ref()
            .and_then(|p| p.scalar_0_1.as_ref()),
        NEUTRAL,
    )
}

/// Anxious and avoidant attachment scores
pub fn attachment(profile: &Profile) -> (f64, f64) {
    let att = &profile.inferences.attachment;
    (
        trait_or(att.anxious.as_ref(), NEUTRAL),
        trait_or(att.avoidant.as_ref(), NEUTRAL),
    )
}

/// Communication need, independence need and long-term orientation
pub fn relationship_style(profile: &Profile) -> [f64; 3] {
    let rs = &profile.relationship_style;
    [
        trait_or(rs.communication_need.as_ref(), NEUTRAL),
        trait_or(rs.independence_need.as_ref(), NEUTRAL),
        trait_or(rs.long_term_orientation.as_ref(), NEUTRAL),
    ]
}

/// Declared habit, ignoring blank strings
pub fn habit(profile: &Profile, habit: Habit) -> Option<&str> {
    profile
        .facts
        .habit(habit)
        .map(str::trim)
        .filter(|h| !h.is_empty())
}

/// Hobby involvement, non-finite treated as 0
#[inline]
pub fn involvement(raw: f64) -> f64 {
    if raw.is_finite() { raw } else { 0.0 }
}

pub fn cluster_id(profile: &Profile) -> u32 {
    profile.ml_cluster_id.unwrap_or(BASELINE_CLUSTER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sparse_profile() -> Profile {
        serde_json::from_value(json!({
            "id": "sparse",
            "facts": { "education_tier": 3, "current_area": "  ", "smoking": "" },
            "inferences": {
                "mbti_axes": { "IE": { "value": 0.4 } },
                "values": { "career_focused": { "value": 0.9 } }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_missing_axis_is_typed_error() {
        let profile = sparse_profile();

        assert_eq!(axis(&profile, PersonalityAxis::IE), Ok(0.4));
        assert_eq!(
            axis(&profile, PersonalityAxis::SN),
            Err(ScoringError::IncompleteProfile {
                profile_id: "sparse".to_string(),
                field: "inferences.mbti_axes.SN",
            })
        );
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let profile = sparse_profile();

        let levels = hierarchy(&profile);
        assert_eq!(levels.education, 3.0);
        assert_eq!(levels.job, DEFAULT_ORDINAL);
        assert_eq!(value_trait(&profile, "career_focused"), 0.9);
        assert_eq!(value_trait(&profile, "risk_taking"), NEUTRAL);
        assert_eq!(political_lean(&profile), NEUTRAL);
        assert_eq!(attachment(&profile), (NEUTRAL, NEUTRAL));
        assert_eq!(relationship_style(&profile), [NEUTRAL; 3]);
        assert_eq!(area(&profile), None);
        assert_eq!(habit(&profile, Habit::Smoking), None);
        assert!(!strict_sn(&profile));
        assert_eq!(cluster_id(&profile), BASELINE_CLUSTER);
    }

    #[test]
    fn test_zero_trait_is_not_treated_as_missing() {
        let t = Trait::new(0.0);
        assert_eq!(trait_or(Some(&t), NEUTRAL), 0.0);
        assert_eq!(trait_or(Some(&Trait::new(f64::NAN)), NEUTRAL), NEUTRAL);
    }
}
