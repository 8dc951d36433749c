//! Secondary predictor and log-odds mixing.
//!
//! The secondary predictor stands in for a learned model. It is a trait so a
//! real model can replace the hash-seeded default without touching the mixer.

use std::fmt::Debug;

use xxhash_rust::xxh3::xxh3_64;

use crate::config::{MixingConfig, SyntheticConfig};
use crate::core::math::{clamp_probability, clip01, logistic, logit};
use crate::models::{LogitMix, Profile, RolePair};

/// Separates the two ids so ("ab", "c") and ("a", "bc") hash differently
const PAIR_SEPARATOR: u8 = 0xFF;

/// A second opinion on each role's like probability
pub trait SecondaryPredictor: Debug + Send + Sync {
    /// Predict per-role probabilities in [0, 1] given the base probabilities
    fn predict(&self, a: &Profile, b: &Profile, base: RolePair<f64>) -> RolePair<f64>;
}

/// Deterministic unit-interval value for an ordered pair of ids.
///
/// Pure function of `(id_a, id_b)`: no process state, no seed, stable across
/// runs and platforms.
pub fn pair_seed(id_a: &str, id_b: &str) -> f64 {
    let mut bytes = Vec::with_capacity(id_a.len() + id_b.len() + 1);
    bytes.extend_from_slice(id_a.as_bytes());
    bytes.push(PAIR_SEPARATOR);
    bytes.extend_from_slice(id_b.as_bytes());

    // Top 53 bits map exactly onto the f64 mantissa
    (xxh3_64(&bytes) >> 11) as f64 / (1u64 << 53) as f64
}

/// Hash-seeded perturbation of the base probabilities.
///
/// Role A moves by `delta`, role B by `-delta`, modelling a second model that
/// disagrees with the baseline in opposite directions for the two sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticPredictor {
    pub amplitude: f64,
}

impl SyntheticPredictor {
    pub fn new(amplitude: f64) -> Self {
        Self { amplitude }
    }

    pub fn from_config(config: &SyntheticConfig) -> Self {
        Self::new(config.amplitude)
    }

    /// Perturbation for role A, in `[-amplitude, amplitude)`
    pub fn delta(&self, id_a: &str, id_b: &str) -> f64 {
        (pair_seed(id_a, id_b) - 0.5) * 2.0 * self.amplitude
    }
}

impl Default for SyntheticPredictor {
    fn default() -> Self {
        Self::from_config(&SyntheticConfig::default())
    }
}

impl SecondaryPredictor for SyntheticPredictor {
    fn predict(&self, a: &Profile, b: &Profile, base: RolePair<f64>) -> RolePair<f64> {
        let delta = self.delta(&a.id, &b.id);
        RolePair::new(clip01(base.a + delta), clip01(base.b - delta))
    }
}

/// Smallest clamp the mixer applies, whatever it was configured with
pub const MIN_CLAMP_EPSILON: f64 = f64::EPSILON;

/// Linear blend of two probabilities in log-odds space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogitMixer {
    pub clamp_epsilon: f64,
}

impl LogitMixer {
    pub fn new(clamp_epsilon: f64) -> Self {
        Self { clamp_epsilon }
    }

    pub fn from_config(config: &MixingConfig) -> Self {
        Self::new(config.clamp_epsilon)
    }

    /// `weight` 1.0 trusts `base` fully, 0.0 trusts `synthetic` fully
    pub fn mix(&self, base: f64, synthetic: f64, weight: f64) -> LogitMix {
        // A zero or NaN epsilon would let log-odds reach infinity
        let epsilon = self.clamp_epsilon.max(MIN_CLAMP_EPSILON);
        let base_logit = logit(clamp_probability(base, epsilon));
        let synthetic_logit = logit(clamp_probability(synthetic, epsilon));
        let final_logit = weight * base_logit + (1.0 - weight) * synthetic_logit;

        LogitMix {
            base_logit,
            synthetic_logit,
            final_logit,
            probability: logistic(final_logit),
        }
    }

    /// Mix each role independently
    pub fn mix_pair(&self, base: RolePair<f64>, synthetic: RolePair<f64>, weights: RolePair<f64>) -> RolePair<LogitMix> {
        RolePair::new(
            self.mix(base.a, synthetic.a, weights.a),
            self.mix(base.b, synthetic.b, weights.b),
        )
    }
}

impl Default for LogitMixer {
    fn default() -> Self {
        Self::from_config(&MixingConfig::default())
    }
}
