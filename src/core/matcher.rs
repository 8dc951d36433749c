use std::cmp::Ordering;
use std::sync::Arc;

use rayon::prelude::*;

use crate::config::{ConfigValidationError, ScoringConfig};
use crate::core::{
    cluster::ClusterAdjuster,
    distance::{AreaDistance, DistanceModel},
    error::ScoringError,
    features,
    filters::{self, FilterDecision},
    ranking::{RankingSampler, UniformSource},
    scoring::aggregate,
    synthetic::{LogitMixer, SecondaryPredictor, SyntheticPredictor},
};
use crate::models::{
    BaselineOutcome, ClusterScore, MatchResult, Outcome, Profile, RankedCandidate, Role, RolePair,
    ScoreOutcome, ScoredPair, ScoringMode,
};

/// Result of ranking a candidate pool
#[derive(Debug, Clone)]
pub struct Ranking {
    pub matches: Vec<RankedCandidate>,
    pub total_candidates: usize,
    /// Candidates rejected by a hard filter
    pub blocked: usize,
    /// Candidates that could not be scored (incomplete profile or self)
    pub skipped: usize,
}

/// Main matching orchestrator - runs the scoring pipeline
///
/// # Pipeline Stages
/// 1. Hard filters (dealbreakers, strict SN)
/// 2. Feature extraction
/// 3. Global aggregation
/// 4. Optional cluster adjustment
/// 5. Secondary prediction and log-odds mixing
/// 6. Gumbel-max ranking
///
/// The configuration is frozen behind an `Arc`; a `Matcher` is cheap to clone
/// and safe to share across threads.
#[derive(Debug, Clone)]
pub struct Matcher {
    config: Arc<ScoringConfig>,
    distance: Arc<dyn DistanceModel>,
    predictor: Arc<dyn SecondaryPredictor>,
}

impl Matcher {
    /// Freeze a tuning table, rejecting one that would leave a stage ill-defined
    pub fn new(config: ScoringConfig) -> Result<Self, ConfigValidationError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    pub fn with_default_config() -> Self {
        Self::from_validated(ScoringConfig::default())
    }

    fn from_validated(config: ScoringConfig) -> Self {
        let distance = AreaDistance::from_config(&config.location);
        let predictor = SyntheticPredictor::from_config(&config.synthetic);
        Self {
            config: Arc::new(config),
            distance: Arc::new(distance),
            predictor: Arc::new(predictor),
        }
    }

    /// Replace the area-based distance model
    pub fn with_distance_model(mut self, distance: Arc<dyn DistanceModel>) -> Self {
        self.distance = distance;
        self
    }

    /// Replace the synthetic secondary predictor, e.g. with a learned model
    pub fn with_predictor(mut self, predictor: Arc<dyn SecondaryPredictor>) -> Self {
        self.predictor = predictor;
        self
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn sampler(&self) -> RankingSampler {
        RankingSampler::from_config(&self.config.ranking)
    }

    /// Filter, extract and aggregate one pair with the global model
    pub fn baseline(&self, a: &Profile, b: &Profile) -> Result<BaselineOutcome, ScoringError> {
        if let FilterDecision::Blocked(reason) = filters::evaluate(a, b, &self.config.hard_filters)? {
            tracing::debug!(
                "Pair {} / {} blocked: {}",
                a.id,
                b.id,
                reason.code()
            );
            return Ok(Outcome::Blocked { reason });
        }

        let features = features::extract(a, b, &self.config, self.distance.as_ref())?;
        Ok(Outcome::Scored(aggregate(features, &self.config)))
    }

    /// Score one pair under `mode`.
    ///
    /// `weights` holds each role's trust in the base probability for mixing
    /// (1.0 ignores the secondary predictor). Blocked pairs are returned as
    /// [`Outcome::Blocked`] with a match probability of exactly 0.
    pub fn score_pair(
        &self,
        a: &Profile,
        b: &Profile,
        mode: ScoringMode,
        weights: RolePair<f64>,
    ) -> Result<ScoreOutcome, ScoringError> {
        validate_weights(weights)?;

        let baseline = match self.baseline(a, b)? {
            Outcome::Blocked { reason } => return Ok(Outcome::Blocked { reason }),
            Outcome::Scored(result) => result,
        };

        let scored = match mode {
            ScoringMode::BaselineOnly => ScoredPair {
                mode,
                p_match: baseline.p_match,
                base: baseline.like,
                synthetic: None,
                final_like: baseline.like,
                mixing: None,
                clusters: None,
                baseline,
            },
            ScoringMode::BaselinePlusSynthetic => {
                let base = baseline.like;
                self.mixed(a, b, mode, base, weights, None, baseline)
            }
            ScoringMode::ClusterAdjustedPlusSynthetic => {
                let adjuster = ClusterAdjuster::new(&self.config.clusters);
                let clusters = RolePair::new(
                    adjuster.adjust(Role::A, a, &baseline.details),
                    adjuster.adjust(Role::B, b, &baseline.details),
                );
                let base = RolePair::new(clusters.a.probability, clusters.b.probability);
                self.mixed(a, b, mode, base, weights, Some(clusters), baseline)
            }
        };

        tracing::debug!(
            "Scored pair {} / {} ({:?}): p_match={:.4}",
            a.id,
            b.id,
            mode,
            scored.p_match
        );

        Ok(Outcome::Scored(scored))
    }

    #[allow(clippy::too_many_arguments)]
    fn mixed(
        &self,
        a: &Profile,
        b: &Profile,
        mode: ScoringMode,
        base: RolePair<f64>,
        weights: RolePair<f64>,
        clusters: Option<RolePair<ClusterScore>>,
        baseline: MatchResult,
    ) -> ScoredPair {
        let synthetic = self.predictor.predict(a, b, base);
        let mixing = LogitMixer::from_config(&self.config.mixing).mix_pair(base, synthetic, weights);
        let final_like = RolePair::new(mixing.a.probability, mixing.b.probability);

        ScoredPair {
            mode,
            p_match: final_like.product(),
            base,
            synthetic: Some(synthetic),
            final_like,
            mixing: Some(mixing),
            clusters,
            baseline,
        }
    }

    /// Rank a candidate pool for `subject`, who plays `subject_role`.
    ///
    /// Pairs are scored in parallel. Blocked and unscorable candidates are
    /// dropped and counted. One uniform draw is taken from `source` per
    /// surviving candidate, in input order, so a seeded source reproduces
    /// the same ranking.
    #[allow(clippy::too_many_arguments)]
    pub fn rank_candidates<S: UniformSource + ?Sized>(
        &self,
        subject: &Profile,
        subject_role: Role,
        candidates: &[Profile],
        mode: ScoringMode,
        weights: RolePair<f64>,
        limit: usize,
        source: &mut S,
    ) -> Result<Ranking, ScoringError> {
        validate_weights(weights)?;

        let total_candidates = candidates.len();

        let outcomes: Vec<Option<Result<ScoreOutcome, ScoringError>>> = candidates
            .par_iter()
            .map(|candidate| {
                // Exclude self
                if candidate.id == subject.id {
                    return None;
                }
                let (a, b) = match subject_role {
                    Role::A => (subject, candidate),
                    Role::B => (candidate, subject),
                };
                Some(self.score_pair(a, b, mode, weights))
            })
            .collect();

        let sampler = self.sampler();
        let mut blocked = 0;
        let mut skipped = 0;
        let mut matches = Vec::with_capacity(total_candidates);

        for (candidate, outcome) in candidates.iter().zip(outcomes) {
            match outcome {
                Some(Ok(Outcome::Scored(scored))) => matches.push(RankedCandidate {
                    candidate_id: candidate.id.clone(),
                    name: candidate.name.clone(),
                    p_match: scored.p_match,
                    rank_score: sampler.rank_score(scored.p_match, source),
                }),
                Some(Ok(Outcome::Blocked { .. })) => blocked += 1,
                Some(Err(e)) => {
                    tracing::warn!("Skipping candidate {} for {}: {}", candidate.id, subject.id, e);
                    skipped += 1;
                }
                None => skipped += 1,
            }
        }

        // Sort by rank score (descending), ties by id for a stable order
        matches.sort_by(|x, y| {
            y.rank_score
                .partial_cmp(&x.rank_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| x.candidate_id.cmp(&y.candidate_id))
        });
        matches.truncate(limit);

        tracing::debug!(
            "Ranked {} of {} candidates for {} ({} blocked, {} skipped)",
            matches.len(),
            total_candidates,
            subject.id,
            blocked,
            skipped
        );

        Ok(Ranking {
            matches,
            total_candidates,
            blocked,
            skipped,
        })
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_config()
    }
}

/// Mixing weights must be finite and inside [0, 1]
pub fn validate_weights(weights: RolePair<f64>) -> Result<(), ScoringError> {
    for (role, weight) in [(Role::A, weights.a), (Role::B, weights.b)] {
        if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
            return Err(ScoringError::InvalidMixingWeight { role, weight });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ranking::FixedSource;
    use crate::models::BlockReason;
    use serde_json::{json, Value};

    fn create_candidate(id: &str, ie: f64, sn: f64, facts: Value) -> Profile {
        serde_json::from_value(json!({
            "id": id,
            "facts": facts,
            "inferences": {
                "mbti_axes": { "IE": { "value": ie }, "SN": { "value": sn }, "JP": { "value": 0.5 } },
                "hobbies": [ { "name": "climbing", "involvement": 0.8 } ],
                "humour_profile": { "styles": { "witty": { "value": 0.7 } } }
            }
        }))
        .unwrap()
    }

    fn subject() -> Profile {
        create_candidate("subject", 0.5, 0.6, json!({ "current_area": "Koramangala" }))
    }

    const EVEN: RolePair<f64> = RolePair { a: 0.7, b: 0.7 };

    #[test]
    fn test_baseline_only_has_no_synthetic_stage() {
        let matcher = Matcher::with_default_config();
        let other = create_candidate("other", 0.5, 0.6, json!({ "current_area": "Koramangala" }));

        let outcome = matcher
            .score_pair(&subject(), &other, ScoringMode::BaselineOnly, EVEN)
            .unwrap();
        let scored = outcome.scored().unwrap();

        assert!(scored.synthetic.is_none());
        assert_eq!(scored.final_like, scored.baseline.like);
        assert_eq!(scored.p_match, scored.baseline.p_match);
    }

    #[test]
    fn test_full_trust_in_base_reproduces_baseline() {
        let matcher = Matcher::with_default_config();
        let other = create_candidate("other", 0.3, 0.6, json!({}));

        let outcome = matcher
            .score_pair(&subject(), &other, ScoringMode::BaselinePlusSynthetic, RolePair::new(1.0, 1.0))
            .unwrap();
        let scored = outcome.scored().unwrap();

        assert!((scored.p_match - scored.baseline.p_match).abs() < 1e-9);
        assert!(scored.synthetic.is_some());
    }

    #[test]
    fn test_cluster_mode_reports_clusters() {
        let matcher = Matcher::with_default_config();
        let other = create_candidate("other", 0.3, 0.6, json!({}));

        let outcome = matcher
            .score_pair(&subject(), &other, ScoringMode::ClusterAdjustedPlusSynthetic, EVEN)
            .unwrap();
        let scored = outcome.scored().unwrap();
        let clusters = scored.clusters.as_ref().unwrap();

        assert_eq!(scored.base.a, clusters.a.probability);
        assert_eq!(scored.base.b, clusters.b.probability);
    }

    #[test]
    fn test_invalid_weight_rejected() {
        let matcher = Matcher::with_default_config();
        let other = create_candidate("other", 0.3, 0.6, json!({}));

        let err = matcher
            .score_pair(&subject(), &other, ScoringMode::BaselinePlusSynthetic, RolePair::new(0.5, 1.5))
            .unwrap_err();
        assert_eq!(err, ScoringError::InvalidMixingWeight { role: Role::B, weight: 1.5 });

        assert!(validate_weights(RolePair::new(f64::NAN, 0.5)).is_err());
    }

    #[test]
    fn test_blocked_pair() {
        let matcher = Matcher::with_default_config();
        let picky = create_candidate("picky", 0.5, 0.5, json!({ "dealbreakers": { "smoking": "must_not_smoke" } }));
        let smoker = create_candidate("smoker", 0.5, 0.5, json!({ "smoking": "yes" }));

        let outcome = matcher
            .score_pair(&picky, &smoker, ScoringMode::ClusterAdjustedPlusSynthetic, EVEN)
            .unwrap();

        assert_eq!(outcome.p_match(), 0.0);
        assert!(matches!(
            outcome.block_reason(),
            Some(BlockReason::Dealbreaker { imposed_by: Role::A, .. })
        ));
    }

    #[test]
    fn test_rank_candidates_drops_blocked_and_incomplete() {
        let matcher = Matcher::with_default_config();
        let mut incomplete = create_candidate("incomplete", 0.5, 0.5, json!({}));
        incomplete.inferences.personality.jp = None;

        let candidates = vec![
            create_candidate("near", 0.5, 0.6, json!({ "current_area": "Koramangala" })),
            create_candidate("smoker", 0.5, 0.6, json!({ "smoking": "yes" })),
            incomplete,
            create_candidate("far", 0.9, 0.1, json!({ "current_area": "Whitefield" })),
            subject(),
        ];
        let mut picky = subject();
        picky.facts.dealbreakers = serde_json::from_value(json!({ "smoking": "must_not_smoke" })).unwrap();

        let mut source = FixedSource::constant(0.5);
        let ranking = matcher
            .rank_candidates(&picky, Role::A, &candidates, ScoringMode::BaselineOnly, EVEN, 10, &mut source)
            .unwrap();

        assert_eq!(ranking.total_candidates, 5);
        assert_eq!(ranking.blocked, 1);
        assert_eq!(ranking.skipped, 2);
        assert_eq!(ranking.matches.len(), 2);
        // With identical noise the order follows p_match
        assert_eq!(ranking.matches[0].candidate_id, "near");
        assert!(ranking.matches[0].p_match > ranking.matches[1].p_match);
    }

    #[test]
    fn test_rank_candidates_respects_limit() {
        let matcher = Matcher::with_default_config();
        let candidates: Vec<Profile> = (0..20)
            .map(|i| create_candidate(&format!("c{}", i), (i as f64) / 20.0, 0.5, json!({})))
            .collect();

        let mut source = FixedSource::new(vec![0.2, 0.8, 0.5]);
        let ranking = matcher
            .rank_candidates(&subject(), Role::B, &candidates, ScoringMode::BaselinePlusSynthetic, EVEN, 5, &mut source)
            .unwrap();

        assert_eq!(ranking.matches.len(), 5);
        assert!(ranking
            .matches
            .windows(2)
            .all(|w| w[0].rank_score >= w[1].rank_score));
    }

    #[test]
    fn test_new_rejects_invalid_table() {
        let mut config = ScoringConfig::default();
        config.mixing.clamp_epsilon = 0.0;

        assert_eq!(
            Matcher::new(config).unwrap_err(),
            ConfigValidationError::NotPositive { field: "mixing.clamp_epsilon", value: 0.0 }
        );
        assert!(Matcher::new(ScoringConfig::default()).is_ok());
    }
}
