use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A scalar attribute with optional certainty.
///
/// Only `value` is read by the scoring pipeline; `confidence` is carried
/// through so callers can round-trip enriched profiles untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trait {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Trait {
    pub fn new(value: f64) -> Self {
        Self { value, confidence: None }
    }
}

impl From<f64> for Trait {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

/// Boolean opt-in preference, e.g. strict matching on the SN axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: bool,
}

/// Profile compared by the scoring pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(alias = "user_id", alias = "userId")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub facts: Facts,
    #[serde(default, deserialize_with = "null_as_default")]
    pub inferences: Inferences,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relationship_style: RelationshipStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ml_cluster_id: Option<u32>,
}

/// Objective, user-supplied attributes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Facts {
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub gender: Option<String>,
    /// Ordinal 1..3
    #[serde(default)]
    pub education_tier: Option<u8>,
    /// Ordinal 1..3
    #[serde(default)]
    pub job_difficulty: Option<u8>,
    /// Ordinal 1..3
    #[serde(default)]
    pub income_band: Option<u8>,
    #[serde(default, alias = "current_area_in_bangalore")]
    pub current_area: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dealbreakers: Dealbreakers,
    #[serde(default)]
    pub relationship_intent: Option<RelationshipIntent>,
    #[serde(default)]
    pub smoking: Option<String>,
    #[serde(default)]
    pub drinking: Option<String>,
    #[serde(default)]
    pub nightlife: Option<String>,
    #[serde(default)]
    pub diet: Option<String>,
}

impl Facts {
    pub fn habit(&self, habit: Habit) -> Option<&str> {
        match habit {
            Habit::Smoking => self.smoking.as_deref(),
            Habit::Drinking => self.drinking.as_deref(),
            Habit::Nightlife => self.nightlife.as_deref(),
        }
    }
}

/// Lifestyle habits compared by the soft-lifestyle feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Habit {
    Smoking,
    Drinking,
    Nightlife,
}

impl Habit {
    pub const ALL: [Habit; 3] = [Habit::Smoking, Habit::Drinking, Habit::Nightlife];
}

/// Stated relationship intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipIntent {
    #[serde(alias = "Serious")]
    Serious,
    #[serde(alias = "Casual")]
    Casual,
    #[serde(alias = "Open_to_both", alias = "open-to-both")]
    OpenToBoth,
}

/// Hard requirements a profile imposes on candidate partners.
///
/// Current profiles key requirements by attribute (`{"diet": "must_be_veg"}`);
/// older profiles store free-text strings, which are kept for display but
/// never block a pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dealbreakers {
    Keyed(BTreeMap<String, Value>),
    Freeform(Vec<String>),
}

impl Default for Dealbreakers {
    fn default() -> Self {
        Dealbreakers::Keyed(BTreeMap::new())
    }
}

impl Dealbreakers {
    /// Split declared requirements into recognized kinds and unrecognized keys
    pub fn requirements(&self) -> (Vec<DealbreakerKind>, Vec<String>) {
        let mut recognized = Vec::new();
        let mut unrecognized = Vec::new();

        match self {
            Dealbreakers::Keyed(map) => {
                for (key, value) in map {
                    match value.as_str().and_then(|v| DealbreakerKind::parse(key, v)) {
                        Some(kind) => recognized.push(kind),
                        None => unrecognized.push(key.clone()),
                    }
                }
            }
            Dealbreakers::Freeform(items) => unrecognized.extend(items.iter().cloned()),
        }

        (recognized, unrecognized)
    }
}

/// Dealbreaker kinds the filter gate knows how to check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealbreakerKind {
    MustBeVegetarian,
    MustNotSmoke,
}

impl DealbreakerKind {
    pub fn parse(key: &str, requirement: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        if key != "diet" && key != "smoking" {
            return None;
        }
        match requirement.trim().to_ascii_lowercase().as_str() {
            "must_be_veg" | "must_be_vegetarian" => Some(DealbreakerKind::MustBeVegetarian),
            "must_not_smoke" | "no_smoking" => Some(DealbreakerKind::MustNotSmoke),
            _ => None,
        }
    }

    /// Whether `other` fails this requirement
    pub fn is_violated_by(&self, other: &Facts) -> bool {
        match self {
            DealbreakerKind::MustBeVegetarian => {
                let diet = other.diet.as_deref().unwrap_or("").trim().to_ascii_lowercase();
                !matches!(diet.as_str(), "veg" | "vegetarian" | "vegan")
            }
            DealbreakerKind::MustNotSmoke => other
                .smoking
                .as_deref()
                .map(|s| s.trim().eq_ignore_ascii_case("yes"))
                .unwrap_or(false),
        }
    }
}

/// Derived traits
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inferences {
    #[serde(default, rename = "mbti_axes", deserialize_with = "null_as_default")]
    pub personality: PersonalityAxes,
    #[serde(default, rename = "mbti_matching_prefs", deserialize_with = "null_as_default")]
    pub matching_prefs: MatchingPrefs,
    #[serde(default, rename = "humour_profile")]
    pub humour: Option<HumourProfile>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hobbies: Vec<Hobby>,
    #[serde(default, deserialize_with = "sparse_traits")]
    pub values: BTreeMap<String, Trait>,
    #[serde(default)]
    pub political_lean: Option<PoliticalLean>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attachment: Attachment,
}

/// The four personality axes, each in [0,1]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalityAxes {
    #[serde(default, rename = "IE")]
    pub ie: Option<Trait>,
    #[serde(default, rename = "SN")]
    pub sn: Option<Trait>,
    #[serde(default, rename = "FT")]
    pub ft: Option<Trait>,
    #[serde(default, rename = "JP")]
    pub jp: Option<Trait>,
}

impl PersonalityAxes {
    pub fn get(&self, axis: PersonalityAxis) -> Option<&Trait> {
        match axis {
            PersonalityAxis::IE => self.ie.as_ref(),
            PersonalityAxis::SN => self.sn.as_ref(),
            PersonalityAxis::FT => self.ft.as_ref(),
            PersonalityAxis::JP => self.jp.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonalityAxis {
    IE,
    SN,
    FT,
    JP,
}

impl PersonalityAxis {
    /// Path of the axis inside a serialized profile
    pub fn field_path(&self) -> &'static str {
        match self {
            PersonalityAxis::IE => "inferences.mbti_axes.IE",
            PersonalityAxis::SN => "inferences.mbti_axes.SN",
            PersonalityAxis::FT => "inferences.mbti_axes.FT",
            PersonalityAxis::JP => "inferences.mbti_axes.JP",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingPrefs {
    #[serde(default)]
    pub sn_strict_mode: Option<Flag>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HumourProfile {
    #[serde(default, deserialize_with = "sparse_traits")]
    pub styles: BTreeMap<String, Trait>,
    #[serde(default)]
    pub cringe_tolerance: Option<Trait>,
    #[serde(default)]
    pub offence_tolerance: Option<Trait>,
    #[serde(default)]
    pub performs_vs_appreciates: Option<Trait>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hobby {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub involvement: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoliticalLean {
    #[serde(default)]
    pub scalar_0_1: Option<Trait>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub anxious: Option<Trait>,
    #[serde(default)]
    pub avoidant: Option<Trait>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipStyle {
    #[serde(default)]
    pub communication_need: Option<Trait>,
    #[serde(default)]
    pub independence_need: Option<Trait>,
    #[serde(default)]
    pub long_term_orientation: Option<Trait>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict_style: Option<String>,
}

/// Upstream enrichment writes `null` for sub-structures it has not filled
/// yet; read those like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Trait map where both the map and individual entries may be `null`
fn sparse_traits<'de, D>(deserializer: D) -> Result<BTreeMap<String, Trait>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Option<BTreeMap<String, Option<Trait>>> = Option::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| value.map(|t| (key, t)))
        .collect())
}
