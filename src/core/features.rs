//! Pairwise feature functions.
//!
//! Every function compares role A's profile with role B's on one semantic
//! axis and returns a value hard-clipped to [0,1], since the latent scores
//! downstream assume bounded inputs.

use std::collections::BTreeMap;

use crate::config::{
    AttachmentConfig, EducationConfig, HobbyConfig, HumourConfig, LifestyleConfig,
    LocationConfig, PersonalityConfig, ScoringConfig, ValuesConfig,
};
use crate::core::accessors::{self, NEUTRAL};
use crate::core::distance::{distance_decay, same_area, DistanceModel};
use crate::core::error::ScoringError;
use crate::core::math::{clip01, closeness, logistic};
use crate::models::{
    FeatureVector, Habit, Hobby, PersonalityAxis, Profile, RelationshipIntent, RolePair, Trait,
};

/// FT compatibility has no data dependency yet; it contributes a fixed neutral value
pub const FT_PLACEHOLDER: f64 = 0.5;

/// Intent score when either side is open to both
pub const INTENT_OPEN: f64 = 0.9;

/// Intent score for any other mismatch
pub const INTENT_PARTIAL: f64 = 0.7;

/// Run every feature function on a pair
pub fn extract(
    a: &Profile,
    b: &Profile,
    config: &ScoringConfig,
    distance: &dyn DistanceModel,
) -> Result<FeatureVector, ScoringError> {
    Ok(FeatureVector {
        location: location_compatibility(a, b, &config.location, distance),
        education: education_compatibility(a, b, &config.education),
        humour: humour_compatibility(a, b, &config.humour),
        personality: personality_compatibility(a, b, &config.personality)?,
        hobbies: hobby_compatibility(a, b, &config.hobbies),
        values_politics: values_compatibility(a, b, &config.values),
        attachment_relationship: attachment_compatibility(a, b, &config.attachment),
        intent: intent_compatibility(a, b),
        lifestyle: lifestyle_compatibility(a, b, &config.lifestyle),
    })
}

/// Role A's satisfaction with a hierarchy gap `delta = level(B) - level(A)`
#[inline]
pub fn hierarchy_preference_a(delta: f64, sensitivity: f64) -> f64 {
    logistic(sensitivity * delta)
}

/// Role B's satisfaction with a hierarchy gap `delta = level(A) - level(B)`.
///
/// Centered at 0.5; `damping` bounds how far from neutral the result may move.
#[inline]
pub fn hierarchy_preference_b(delta: f64, sensitivity: f64, damping: f64) -> f64 {
    0.5 + damping * (logistic(sensitivity * delta) - 0.5)
}

/// Education, job difficulty and income compatibility as seen by each role
pub fn education_compatibility(a: &Profile, b: &Profile, config: &EducationConfig) -> RolePair<f64> {
    let la = accessors::hierarchy(a);
    let lb = accessors::hierarchy(b);

    let sa = &config.sensitivity_a;
    let role_a = (hierarchy_preference_a(lb.education - la.education, sa.education)
        + hierarchy_preference_a(lb.job - la.job, sa.job)
        + hierarchy_preference_a(lb.income - la.income, sa.income))
        / 3.0;

    let (sb, db) = (&config.sensitivity_b, &config.damping_b);
    let role_b = (hierarchy_preference_b(la.education - lb.education, sb.education, db.education)
        + hierarchy_preference_b(la.job - lb.job, sb.job, db.job)
        + hierarchy_preference_b(la.income - lb.income, sb.income, db.income))
        / 3.0;

    RolePair::new(clip01(role_a), clip01(role_b))
}

/// Distance decay blended with a same-area bonus
pub fn location_compatibility(
    a: &Profile,
    b: &Profile,
    config: &LocationConfig,
    distance: &dyn DistanceModel,
) -> f64 {
    let decay = distance_decay(distance.distance_km(a, b), config.max_distance_km);
    let bonus = if same_area(a, b) { 1.0 } else { 0.0 };

    clip01(config.distance_weight * decay + config.same_area_weight * bonus)
}

/// Humour compatibility. Missing humour data on either side is neutral.
pub fn humour_compatibility(a: &Profile, b: &Profile, config: &HumourConfig) -> f64 {
    let (ha, hb) = match (accessors::humour(a), accessors::humour(b)) {
        (Some(ha), Some(hb)) => (ha, hb),
        _ => return NEUTRAL,
    };

    let shared: Vec<f64> = ha
        .styles
        .iter()
        .filter_map(|(style, ta)| {
            let tb = hb.styles.get(style)?;
            let (va, vb) = (
                accessors::trait_or(Some(ta), NEUTRAL),
                accessors::trait_or(Some(tb), NEUTRAL),
            );
            Some((va - vb).powi(2))
        })
        .collect();
    let styles = if shared.is_empty() {
        NEUTRAL
    } else {
        clip01(1.0 - shared.iter().sum::<f64>() / shared.len() as f64)
    };

    let scalar = |t: Option<&Trait>| accessors::trait_or(t, NEUTRAL);
    let (offence_a, offence_b) = (
        scalar(ha.offence_tolerance.as_ref()),
        scalar(hb.offence_tolerance.as_ref()),
    );
    let cringe = closeness(scalar(ha.cringe_tolerance.as_ref()), scalar(hb.cringe_tolerance.as_ref()));
    let offence = closeness(offence_a, offence_b);
    let perform = closeness(
        scalar(ha.performs_vs_appreciates.as_ref()),
        scalar(hb.performs_vs_appreciates.as_ref()),
    );

    let dark_a = accessors::trait_or(ha.styles.get(&config.dark_style), 0.0);
    let dark_b = accessors::trait_or(hb.styles.get(&config.dark_style), 0.0);
    let dark_penalty = clip01(
        1.0 - config.dark_penalty * (dark_a - offence_b).max(0.0)
            - config.dark_penalty * (dark_b - offence_a).max(0.0),
    );

    let blended = clip01(
        config.styles_weight * styles
            + config.cringe_weight * cringe
            + config.offence_weight * offence
            + config.perform_weight * perform,
    );

    clip01(blended * dark_penalty)
}

/// Whether an IE value sits inside the ambivalent band
#[inline]
pub fn is_ambivalent(ie: f64, config: &PersonalityConfig) -> bool {
    ie >= config.ambivalent_low && ie <= config.ambivalent_high
}

/// IE compatibility with the ambivalent-band special case
pub fn ie_compatibility(ie_a: f64, ie_b: f64, config: &PersonalityConfig) -> f64 {
    let diff = (ie_a - ie_b).abs();
    match (is_ambivalent(ie_a, config), is_ambivalent(ie_b, config)) {
        (true, true) => 1.0,
        (true, false) | (false, true) => clip01(1.0 - 0.5 * diff),
        (false, false) => clip01(1.0 - diff),
    }
}

/// Personality-axis compatibility. SN, IE and JP are required.
pub fn personality_compatibility(
    a: &Profile,
    b: &Profile,
    config: &PersonalityConfig,
) -> Result<f64, ScoringError> {
    let sn = closeness(
        accessors::axis(a, PersonalityAxis::SN)?,
        accessors::axis(b, PersonalityAxis::SN)?,
    );
    let ie = ie_compatibility(
        accessors::axis(a, PersonalityAxis::IE)?,
        accessors::axis(b, PersonalityAxis::IE)?,
        config,
    );
    // Quadratic, so large JP gaps hurt more than proportionally
    let jp_diff = accessors::axis(a, PersonalityAxis::JP)? - accessors::axis(b, PersonalityAxis::JP)?;
    let jp = clip01(1.0 - jp_diff * jp_diff);

    Ok(clip01(
        config.sn_weight * sn
            + config.ie_weight * ie
            + config.jp_weight * jp
            + config.ft_weight * FT_PLACEHOLDER,
    ))
}

fn involvement_map(hobbies: &[Hobby]) -> BTreeMap<&str, f64> {
    hobbies
        .iter()
        .map(|h| (h.name.as_str(), accessors::involvement(h.involvement)))
        .collect()
}

/// Hobby overlap blended with parity in the number of serious hobbies
pub fn hobby_compatibility(a: &Profile, b: &Profile, config: &HobbyConfig) -> f64 {
    let map_a = involvement_map(&a.inferences.hobbies);
    let map_b = involvement_map(&b.inferences.hobbies);

    let mut union: Vec<&str> = map_a.keys().chain(map_b.keys()).copied().collect();
    union.sort_unstable();
    union.dedup();

    let sum_sq: f64 = union
        .iter()
        .map(|name| {
            let va = map_a.get(name).copied().unwrap_or(0.0);
            let vb = map_b.get(name).copied().unwrap_or(0.0);
            (va - vb).powi(2)
        })
        .sum();
    let overlap = clip01(1.0 - sum_sq / union.len().max(1) as f64);

    let serious = |m: &BTreeMap<&str, f64>| {
        m.values().filter(|v| **v >= config.serious_involvement).count()
    };
    let (na, nb) = (serious(&map_a), serious(&map_b));
    let n_max = na.max(nb).max(1) as f64;
    let count = clip01(1.0 - na.abs_diff(nb) as f64 / n_max);

    clip01(config.overlap_weight * overlap + config.count_weight * count)
}

/// Value-trait similarity blended with political closeness
pub fn values_compatibility(a: &Profile, b: &Profile, config: &ValuesConfig) -> f64 {
    let values = if config.keys.is_empty() {
        NEUTRAL
    } else {
        let mean_sq = config
            .keys
            .iter()
            .map(|k| (accessors::value_trait(a, k) - accessors::value_trait(b, k)).powi(2))
            .sum::<f64>()
            / config.keys.len() as f64;
        clip01(1.0 - mean_sq)
    };
    let politics = closeness(accessors::political_lean(a), accessors::political_lean(b));

    clip01(config.values_weight * values + config.politics_weight * politics)
}

/// Shared attachment insecurity blended with relationship-style closeness
pub fn attachment_compatibility(a: &Profile, b: &Profile, config: &AttachmentConfig) -> f64 {
    let (anx_a, avo_a) = accessors::attachment(a);
    let (anx_b, avo_b) = accessors::attachment(b);
    let insecurity = (anx_a + avo_a + anx_b + avo_b) / 4.0;
    let attachment = clip01(1.0 - config.insecurity_damping * insecurity);

    let (rs_a, rs_b) = (accessors::relationship_style(a), accessors::relationship_style(b));
    let style = clip01(
        rs_a.iter()
            .zip(rs_b.iter())
            .map(|(x, y)| closeness(*x, *y))
            .sum::<f64>()
            / 3.0,
    );

    clip01(config.attachment_weight * attachment + config.relationship_weight * style)
}

/// Discrete intent lookup.
///
/// An undeclared intent on either side never counts as an exact match.
pub fn intent_compatibility(a: &Profile, b: &Profile) -> f64 {
    let (ia, ib) = (a.facts.relationship_intent, b.facts.relationship_intent);
    match (ia, ib) {
        (Some(x), Some(y)) if x == y => 1.0,
        _ if ia == Some(RelationshipIntent::OpenToBoth)
            || ib == Some(RelationshipIntent::OpenToBoth) =>
        {
            INTENT_OPEN
        }
        _ => INTENT_PARTIAL,
    }
}

/// Average agreement over habits declared by both sides.
///
/// With nothing to compare the feature is 1, so missing data is never penalized.
pub fn lifestyle_compatibility(a: &Profile, b: &Profile, config: &LifestyleConfig) -> f64 {
    let scores: Vec<f64> = Habit::ALL
        .iter()
        .filter_map(|habit| {
            let (ha, hb) = (accessors::habit(a, *habit)?, accessors::habit(b, *habit)?);
            Some(if ha.eq_ignore_ascii_case(hb) {
                1.0
            } else {
                1.0 - config.mismatch_penalty
            })
        })
        .collect();

    if scores.is_empty() {
        return 1.0;
    }
    clip01(scores.iter().sum::<f64>() / scores.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::distance::AreaDistance;
    use serde_json::{json, Value};

    fn create_test_profile(id: &str, overrides: Value) -> Profile {
        let mut base = json!({
            "id": id,
            "facts": {},
            "inferences": {
                "mbti_axes": { "IE": { "value": 0.5 }, "SN": { "value": 0.5 }, "FT": { "value": 0.5 }, "JP": { "value": 0.5 } }
            }
        });
        merge(&mut base, overrides);
        serde_json::from_value(base).unwrap()
    }

    fn merge(base: &mut Value, patch: Value) {
        match (base, patch) {
            (Value::Object(b), Value::Object(p)) => {
                for (k, v) in p {
                    merge(b.entry(k).or_insert(Value::Null), v);
                }
            }
            (slot, v) => *slot = v,
        }
    }

    #[test]
    fn test_education_asymmetry() {
        let config = EducationConfig::default();
        let a = create_test_profile("a", json!({ "facts": { "education_tier": 1, "job_difficulty": 1, "income_band": 1 } }));
        let b = create_test_profile("b", json!({ "facts": { "education_tier": 3, "job_difficulty": 3, "income_band": 3 } }));

        let edu = education_compatibility(&a, &b, &config);

        // A is pleased by B's higher position, B is mildly put off
        assert!(edu.a > 0.9);
        assert!(edu.b < 0.5 && edu.b > 0.4);
        assert!((edu.b - 0.5).abs() < (edu.a - 0.5).abs());
    }

    #[test]
    fn test_education_equal_levels_is_neutral() {
        let config = EducationConfig::default();
        let a = create_test_profile("a", json!({}));
        let b = create_test_profile("b", json!({}));

        assert_eq!(education_compatibility(&a, &b, &config), RolePair::new(0.5, 0.5));
    }

    #[test]
    fn test_location_same_area() {
        let config = LocationConfig::default();
        let model = AreaDistance::from_config(&config);
        let a = create_test_profile("a", json!({ "facts": { "current_area": "Jayanagar" } }));
        let b = create_test_profile("b", json!({ "facts": { "current_area": "Jayanagar" } }));
        let c = create_test_profile("c", json!({ "facts": { "current_area": "Whitefield" } }));

        assert!((location_compatibility(&a, &b, &config, &model) - 1.0).abs() < 1e-12);
        // 15km of 20km leaves a quarter of the decay term and no bonus
        assert!((location_compatibility(&a, &c, &config, &model) - 0.7 * 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_humour_missing_is_neutral() {
        let config = HumourConfig::default();
        let a = create_test_profile("a", json!({ "inferences": { "humour_profile": { "styles": {} } } }));
        let b = create_test_profile("b", json!({}));

        assert_eq!(humour_compatibility(&a, &b, &config), NEUTRAL);
    }

    #[test]
    fn test_humour_dark_penalty() {
        let config = HumourConfig::default();
        let humour = |dark: f64, offence: f64| {
            json!({ "inferences": { "humour_profile": {
                "styles": { "dark_morbid": { "value": dark }, "sarcasm": { "value": 0.5 } },
                "cringe_tolerance": { "value": 0.5 },
                "offence_tolerance": { "value": offence },
                "performs_vs_appreciates": { "value": 0.5 }
            } } })
        };

        let twin_a = create_test_profile("a", humour(0.2, 0.8));
        let twin_b = create_test_profile("b", humour(0.2, 0.8));
        assert!((humour_compatibility(&twin_a, &twin_b, &config) - 1.0).abs() < 1e-12);

        let dark = create_test_profile("c", humour(0.9, 0.9));
        let sensitive = create_test_profile("d", humour(0.0, 0.1));
        let score = humour_compatibility(&dark, &sensitive, &config);
        assert!(score < 0.6, "dark humour against low tolerance should be penalized, got {}", score);
    }

    #[test]
    fn test_humour_styles_only_compare_shared_keys() {
        let config = HumourConfig::default();
        let a = create_test_profile("a", json!({ "inferences": { "humour_profile": {
            "styles": { "wordplay_puns": { "value": 0.8 }, "sarcasm": { "value": 0.9 } }
        } } }));
        let b = create_test_profile("b", json!({ "inferences": { "humour_profile": {
            "styles": { "wordplay_puns": { "value": 0.8 }, "meta_internet_memes": { "value": 0.1 } }
        } } }));

        // Only wordplay is shared and it matches, scalars default to equal values
        assert!((humour_compatibility(&a, &b, &config) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ambivalent_ie() {
        let config = PersonalityConfig::default();

        assert_eq!(ie_compatibility(0.36, 0.64, &config), 1.0);
        assert!((ie_compatibility(0.5, 0.9, &config) - 0.8).abs() < 1e-12);
        assert!((ie_compatibility(0.1, 0.9, &config) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_personality_identical_axes() {
        let config = PersonalityConfig::default();
        let a = create_test_profile("a", json!({}));
        let b = create_test_profile("b", json!({}));

        // Everything perfect except the neutral FT placeholder
        let expected = 0.5 + 0.3 + 0.15 + 0.05 * FT_PLACEHOLDER;
        let score = personality_compatibility(&a, &b, &config).unwrap();
        assert!((score - expected).abs() < 1e-12);
    }

    #[test]
    fn test_personality_requires_axes() {
        let config = PersonalityConfig::default();
        let a = create_test_profile("a", json!({}));
        let mut b = create_test_profile("b", json!({}));
        b.inferences.personality.jp = None;

        assert!(matches!(
            personality_compatibility(&a, &b, &config),
            Err(ScoringError::IncompleteProfile { field: "inferences.mbti_axes.JP", .. })
        ));
    }

    #[test]
    fn test_identical_hobbies_score_one() {
        let config = HobbyConfig::default();
        let hobbies = json!({ "inferences": { "hobbies": [
            { "name": "badminton", "involvement": 0.8 },
            { "name": "investing", "involvement": 0.3 }
        ] } });
        let a = create_test_profile("a", hobbies.clone());
        let b = create_test_profile("b", hobbies);

        assert_eq!(hobby_compatibility(&a, &b, &config), 1.0);
    }

    #[test]
    fn test_disjoint_hobbies() {
        let config = HobbyConfig::default();
        let a = create_test_profile("a", json!({ "inferences": { "hobbies": [{ "name": "art", "involvement": 1.0 }] } }));
        let b = create_test_profile("b", json!({ "inferences": { "hobbies": [{ "name": "gaming", "involvement": 1.0 }] } }));

        // Overlap 0, both have one serious hobby
        assert!((hobby_compatibility(&a, &b, &config) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_values_missing_defaults_to_neutral() {
        let config = ValuesConfig::default();
        let a = create_test_profile("a", json!({}));
        let b = create_test_profile("b", json!({}));

        assert!((values_compatibility(&a, &b, &config) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_attachment_insecurity_is_symmetric() {
        let config = AttachmentConfig::default();
        let secure = create_test_profile("a", json!({ "inferences": { "attachment": {
            "anxious": { "value": 0.0 }, "avoidant": { "value": 0.0 }
        } } }));
        let anxious = create_test_profile("b", json!({ "inferences": { "attachment": {
            "anxious": { "value": 1.0 }, "avoidant": { "value": 0.6 }
        } } }));

        let forward = attachment_compatibility(&secure, &anxious, &config);
        let backward = attachment_compatibility(&anxious, &secure, &config);
        assert_eq!(forward, backward);
        assert!(forward < attachment_compatibility(&secure, &secure, &config));
    }

    #[test]
    fn test_intent_lookup() {
        let serious = create_test_profile("a", json!({ "facts": { "relationship_intent": "serious" } }));
        let casual = create_test_profile("b", json!({ "facts": { "relationship_intent": "casual" } }));
        let open = create_test_profile("c", json!({ "facts": { "relationship_intent": "open_to_both" } }));
        let unknown = create_test_profile("d", json!({}));

        assert_eq!(intent_compatibility(&serious, &serious), 1.0);
        assert_eq!(intent_compatibility(&serious, &open), INTENT_OPEN);
        assert_eq!(intent_compatibility(&serious, &casual), INTENT_PARTIAL);
        assert_eq!(intent_compatibility(&unknown, &unknown), INTENT_PARTIAL);
    }

    #[test]
    fn test_lifestyle() {
        let config = LifestyleConfig::default();
        let a = create_test_profile("a", json!({ "facts": { "smoking": "no", "drinking": "yes" } }));
        let b = create_test_profile("b", json!({ "facts": { "smoking": "No", "drinking": "no", "nightlife": "yes" } }));
        let blank = create_test_profile("c", json!({}));

        assert!((lifestyle_compatibility(&a, &b, &config) - (1.0 + 0.85) / 2.0).abs() < 1e-12);
        assert_eq!(lifestyle_compatibility(&a, &blank, &config), 1.0);
    }
}
