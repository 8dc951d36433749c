//! Wavelength Algo - compatibility scoring engine for Wavelength matchmaking
//!
//! This library turns two structured profiles into a bidirectional match
//! probability. The pipeline runs hard filters, pairwise feature extraction,
//! an asymmetric logistic aggregation, optional per-cluster re-scoring,
//! log-odds mixing with a secondary predictor and Gumbel-max ranking.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;

// Re-export commonly used types
pub use crate::config::ScoringConfig;
pub use crate::core::{Matcher, Ranking, ScoringError};
pub use crate::models::{Profile, Role, RolePair, ScoreOutcome, ScoringMode};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let matcher = Matcher::with_default_config();
        assert_eq!(matcher.config(), &ScoringConfig::default());
    }
}
