use crate::config::{AggregationConfig, GroupWeights, LatentCoefficients, LogisticParams, ScoringConfig};
use crate::core::math::{clip01, logistic};
use crate::models::{FeatureBreakdown, FeatureVector, GroupInputs, MatchResult, Role, RolePair};

impl GroupWeights {
    /// Blend location with both roles' education numbers
    #[inline]
    pub fn blend(&self, location: f64, education: RolePair<f64>) -> f64 {
        clip01(self.location * location + self.education_a * education.a + self.education_b * education.b)
    }
}

impl LatentCoefficients {
    /// Intercept plus the weighted sum of every group input
    pub fn linear_score(&self, inputs: &GroupInputs) -> f64 {
        self.intercept
            + self.demographics * inputs.demographics
            + self.humour * inputs.humour
            + self.personality * inputs.personality
            + self.hobbies * inputs.hobbies
            + self.values_politics * inputs.values_politics
            + self.attachment_relationship * inputs.attachment_relationship
            + self.intent * inputs.intent
            + self.lifestyle * inputs.lifestyle
    }
}

impl LogisticParams {
    /// Like probability for a latent score
    #[inline]
    pub fn like_probability(&self, latent: f64) -> f64 {
        logistic(self.slope * (latent - self.midpoint))
    }
}

/// Role-specific demographic aggregates
pub fn demographic_groups(features: &FeatureVector, config: &AggregationConfig) -> RolePair<f64> {
    RolePair::new(
        config.a.blend(features.location, features.education),
        config.b.blend(features.location, features.education),
    )
}

/// Global aggregation model.
///
/// Each role gets its own latent score and logistic curve; the match
/// probability is the product of both like probabilities, so a pair only
/// scores highly when both sides independently like each other.
pub fn aggregate(features: FeatureVector, config: &ScoringConfig) -> MatchResult {
    let details = FeatureBreakdown {
        demographics: demographic_groups(&features, &config.aggregation),
        features,
    };

    let coefficients = config.latent.pair();
    let latent = coefficients.map(|role, c| latent_score(&details, role, &c));

    let like = RolePair::new(
        config.logistic.a.like_probability(latent.a),
        config.logistic.b.like_probability(latent.b),
    );

    MatchResult {
        p_match: like.product(),
        like,
        latent,
        details,
    }
}

/// Latent score of one role under arbitrary coefficients
pub fn latent_score(details: &FeatureBreakdown, role: Role, coefficients: &LatentCoefficients) -> f64 {
    coefficients.linear_score(&details.inputs_for(role))
}
