use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::models::RolePair;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingSettings {
    /// Multi-line human-readable output; anything else logs compact lines
    pub fn is_pretty(&self) -> bool {
        self.format.trim().eq_ignore_ascii_case("pretty")
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with WAVELENGTH__)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., WAVELENGTH__SCORING__RANKING__TAU -> scoring.ranking.tau
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("WAVELENGTH")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Errors raised when a tuning table cannot drive the pipeline
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be finite")]
    NotFinite { field: &'static str },

    #[error("{low_field} ({low}) must not exceed {high_field} ({high})")]
    InvertedRange {
        low_field: &'static str,
        low: f64,
        high_field: &'static str,
        high: f64,
    },

    #[error("{field} must lie in [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f64 },

    #[error("values.keys must name at least one value trait")]
    NoValueKeys,

    #[error("cluster table for role {role} has no baseline cluster {}", BASELINE_CLUSTER)]
    MissingBaselineCluster { role: &'static str },

    #[error("cluster table for role {role} lists cluster {id} more than once")]
    DuplicateCluster { role: &'static str, id: u32 },
}

/// Immutable tuning table for the whole scoring pipeline.
///
/// `Default` reproduces the production tuning. A loaded table is frozen in an
/// `Arc` by the matcher and shared read-only across concurrent evaluations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub hard_filters: HardFilterConfig,
    pub education: EducationConfig,
    pub location: LocationConfig,
    pub humour: HumourConfig,
    pub personality: PersonalityConfig,
    pub hobbies: HobbyConfig,
    pub values: ValuesConfig,
    pub attachment: AttachmentConfig,
    pub lifestyle: LifestyleConfig,
    pub aggregation: AggregationConfig,
    pub latent: LatentConfig,
    pub logistic: LogisticConfig,
    pub clusters: ClusterTables,
    pub synthetic: SyntheticConfig,
    pub mixing: MixingConfig,
    pub ranking: RankingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardFilterConfig {
    pub sn_threshold_high: f64,
    pub sn_threshold_low: f64,
}

impl Default for HardFilterConfig {
    fn default() -> Self {
        Self {
            sn_threshold_high: 0.7,
            sn_threshold_low: 0.3,
        }
    }
}

/// One coefficient per hierarchy sub-dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HierarchyCoefficients {
    pub education: f64,
    pub job: f64,
    pub income: f64,
}

impl HierarchyCoefficients {
    pub const fn uniform(value: f64) -> Self {
        Self {
            education: value,
            job: value,
            income: value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationConfig {
    /// Logistic slope per sub-dimension for role A
    pub sensitivity_a: HierarchyCoefficients,
    /// Logistic slope per sub-dimension for role B
    pub sensitivity_b: HierarchyCoefficients,
    /// How far role B's result may move away from neutral
    pub damping_b: HierarchyCoefficients,
}

impl Default for EducationConfig {
    fn default() -> Self {
        Self {
            sensitivity_a: HierarchyCoefficients {
                education: 2.0,
                job: 1.5,
                income: 1.5,
            },
            sensitivity_b: HierarchyCoefficients::uniform(1.0),
            damping_b: HierarchyCoefficients::uniform(0.2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub max_distance_km: f64,
    pub distance_weight: f64,
    pub same_area_weight: f64,
    /// Distance assumed between two different areas
    pub cross_area_distance_km: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            max_distance_km: 20.0,
            distance_weight: 0.7,
            same_area_weight: 0.3,
            cross_area_distance_km: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HumourConfig {
    pub styles_weight: f64,
    pub cringe_weight: f64,
    pub offence_weight: f64,
    pub perform_weight: f64,
    /// Strength of the dark-humour vs offence-tolerance penalty
    pub dark_penalty: f64,
    pub dark_style: String,
}

impl Default for HumourConfig {
    fn default() -> Self {
        Self {
            styles_weight: 0.4,
            cringe_weight: 0.2,
            offence_weight: 0.2,
            perform_weight: 0.2,
            dark_penalty: 0.7,
            dark_style: "dark_morbid".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalityConfig {
    pub ambivalent_low: f64,
    pub ambivalent_high: f64,
    pub sn_weight: f64,
    pub ie_weight: f64,
    pub jp_weight: f64,
    pub ft_weight: f64,
}

impl Default for PersonalityConfig {
    fn default() -> Self {
        Self {
            ambivalent_low: 0.35,
            ambivalent_high: 0.65,
            sn_weight: 0.5,
            ie_weight: 0.3,
            jp_weight: 0.15,
            ft_weight: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HobbyConfig {
    pub overlap_weight: f64,
    pub count_weight: f64,
    /// Involvement at which a hobby counts as seriously pursued
    pub serious_involvement: f64,
}

impl Default for HobbyConfig {
    fn default() -> Self {
        Self {
            overlap_weight: 0.6,
            count_weight: 0.4,
            serious_involvement: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuesConfig {
    pub values_weight: f64,
    pub politics_weight: f64,
    pub keys: Vec<String>,
}

impl Default for ValuesConfig {
    fn default() -> Self {
        Self {
            values_weight: 0.8,
            politics_weight: 0.2,
            keys: ["family_oriented", "career_focused", "risk_taking", "traditional_modern_score"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentConfig {
    /// Damping applied to the shared insecurity index
    pub insecurity_damping: f64,
    pub attachment_weight: f64,
    pub relationship_weight: f64,
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self {
            insecurity_damping: 0.3,
            attachment_weight: 0.4,
            relationship_weight: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifestyleConfig {
    pub mismatch_penalty: f64,
}

impl Default for LifestyleConfig {
    fn default() -> Self {
        Self { mismatch_penalty: 0.15 }
    }
}

/// Weights blending location and the two education numbers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupWeights {
    pub location: f64,
    pub education_a: f64,
    pub education_b: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    pub a: GroupWeights,
    pub b: GroupWeights,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            a: GroupWeights {
                location: 0.4,
                education_a: 0.5,
                education_b: 0.1,
            },
            b: GroupWeights {
                location: 0.6,
                education_a: 0.1,
                education_b: 0.3,
            },
        }
    }
}

/// Intercept plus one weight per feature group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatentCoefficients {
    #[serde(default)]
    pub intercept: f64,
    pub demographics: f64,
    pub humour: f64,
    pub personality: f64,
    pub hobbies: f64,
    pub values_politics: f64,
    pub attachment_relationship: f64,
    pub intent: f64,
    pub lifestyle: f64,
}

impl LatentCoefficients {
    pub const ZERO: LatentCoefficients = LatentCoefficients {
        intercept: 0.0,
        demographics: 0.0,
        humour: 0.0,
        personality: 0.0,
        hobbies: 0.0,
        values_politics: 0.0,
        attachment_relationship: 0.0,
        intent: 0.0,
        lifestyle: 0.0,
    };

    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        intercept: f64,
        demographics: f64,
        humour: f64,
        personality: f64,
        hobbies: f64,
        values_politics: f64,
        attachment_relationship: f64,
        intent: f64,
        lifestyle: f64,
    ) -> Self {
        Self {
            intercept,
            demographics,
            humour,
            personality,
            hobbies,
            values_politics,
            attachment_relationship,
            intent,
            lifestyle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatentConfig {
    pub a: LatentCoefficients,
    pub b: LatentCoefficients,
}

impl Default for LatentConfig {
    fn default() -> Self {
        Self {
            a: LatentCoefficients::new(0.0, 2.0, 2.5, 1.0, 0.8, 0.5, 0.5, 0.5, 0.3),
            b: LatentCoefficients::new(0.0, 1.5, 1.5, 0.8, 0.8, 0.4, 0.4, 0.3, 0.3),
        }
    }
}

impl LatentConfig {
    pub fn pair(&self) -> RolePair<LatentCoefficients> {
        RolePair::new(self.a, self.b)
    }
}

/// Logistic curve `1 / (1 + e^(-slope * (x - midpoint)))`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    pub slope: f64,
    pub midpoint: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticConfig {
    pub a: LogisticParams,
    pub b: LogisticParams,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            a: LogisticParams { slope: 1.0, midpoint: 3.0 },
            b: LogisticParams { slope: 0.8, midpoint: 2.0 },
        }
    }
}

/// Cluster every profile without an explicit id belongs to
pub const BASELINE_CLUSTER: u32 = 0;

/// Fitted coefficient row for one population segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRow {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
    pub coefficients: LatentCoefficients,
}

impl ClusterRow {
    fn named(id: u32, name: &str, coefficients: LatentCoefficients) -> Self {
        Self {
            id,
            name: Some(name.to_string()),
            coefficients,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterTables {
    pub a: Vec<ClusterRow>,
    pub b: Vec<ClusterRow>,
}

impl Default for ClusterTables {
    fn default() -> Self {
        Self {
            a: vec![
                ClusterRow::named(0, "Koramangala Startup Extroverts",
                    LatentCoefficients::new(0.0, 0.6, 0.8, 0.2, 0.4, 0.3, 0.4, 0.3, 0.2)),
                ClusterRow::named(1, "South BLR Calm Traditional",
                    LatentCoefficients::new(0.0, 0.9, 0.4, 0.3, 0.2, 0.4, 0.5, 0.5, 0.2)),
                ClusterRow::named(2, "Indiranagar Creative Intuitives",
                    LatentCoefficients::new(0.0, 0.5, 0.7, 0.4, 0.6, 0.3, 0.3, 0.2, 0.4)),
                ClusterRow::named(3, "North BLR Corporate Analysts",
                    LatentCoefficients::new(0.0, 0.7, 0.5, 0.5, 0.3, 0.4, 0.6, 0.4, 0.3)),
            ],
            b: vec![
                ClusterRow::named(0, "Driven Builder Types",
                    LatentCoefficients::new(0.0, 0.5, 0.6, 0.3, 0.4, 0.2, 0.3, 0.2, 0.5)),
                ClusterRow::named(1, "Chill Explorer Types",
                    LatentCoefficients::new(0.0, 0.3, 0.7, 0.2, 0.5, 0.1, 0.2, 0.1, 0.6)),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Largest absolute perturbation applied to a base probability
    pub amplitude: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self { amplitude: 0.15 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixingConfig {
    /// Distance kept from 0 and 1 before taking log-odds
    pub clamp_epsilon: f64,
    /// Weights used when a caller does not supply its own
    pub default_weights: RolePair<f64>,
}

impl Default for MixingConfig {
    fn default() -> Self {
        Self {
            clamp_epsilon: 1e-6,
            default_weights: RolePair::new(0.7, 0.7),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub epsilon: f64,
    /// Gumbel temperature; 0 is greedy
    pub tau: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-6,
            tau: 0.2,
        }
    }
}

impl ScoringConfig {
    /// Reject tables that would make a pipeline stage ill-defined
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        positive("location.max_distance_km", self.location.max_distance_km)?;
        non_negative("location.cross_area_distance_km", self.location.cross_area_distance_km)?;
        ordered(
            ("personality.ambivalent_low", self.personality.ambivalent_low),
            ("personality.ambivalent_high", self.personality.ambivalent_high),
        )?;
        ordered(
            ("hard_filters.sn_threshold_low", self.hard_filters.sn_threshold_low),
            ("hard_filters.sn_threshold_high", self.hard_filters.sn_threshold_high),
        )?;
        unit("lifestyle.mismatch_penalty", self.lifestyle.mismatch_penalty)?;
        non_negative("humour.dark_penalty", self.humour.dark_penalty)?;
        positive("ranking.epsilon", self.ranking.epsilon)?;
        non_negative("ranking.tau", self.ranking.tau)?;
        non_negative("synthetic.amplitude", self.synthetic.amplitude)?;
        positive("mixing.clamp_epsilon", self.mixing.clamp_epsilon)?;
        if self.mixing.clamp_epsilon >= 0.5 {
            return Err(ConfigValidationError::OutOfUnitRange {
                field: "mixing.clamp_epsilon",
                value: self.mixing.clamp_epsilon,
            });
        }
        unit("mixing.default_weights.a", self.mixing.default_weights.a)?;
        unit("mixing.default_weights.b", self.mixing.default_weights.b)?;

        if self.values.keys.is_empty() {
            return Err(ConfigValidationError::NoValueKeys);
        }

        for (role, rows) in [("a", &self.clusters.a), ("b", &self.clusters.b)] {
            if !rows.iter().any(|row| row.id == BASELINE_CLUSTER) {
                return Err(ConfigValidationError::MissingBaselineCluster { role });
            }
            let mut seen = std::collections::BTreeSet::new();
            for row in rows {
                if !seen.insert(row.id) {
                    return Err(ConfigValidationError::DuplicateCluster { role, id: row.id });
                }
            }
        }

        Ok(())
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigValidationError::NotFinite { field })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigValidationError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigValidationError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigValidationError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigValidationError::Negative { field, value })
    }
}

fn unit(field: &'static str, value: f64) -> Result<(), ConfigValidationError> {
    finite(field, value)?;
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigValidationError::OutOfUnitRange { field, value })
    }
}

fn ordered(
    (low_field, low): (&'static str, f64),
    (high_field, high): (&'static str, f64),
) -> Result<(), ConfigValidationError> {
    finite(low_field, low)?;
    finite(high_field, high)?;
    if low <= high {
        Ok(())
    } else {
        Err(ConfigValidationError::InvertedRange {
            low_field,
            low,
            high_field,
            high,
        })
    }
}
