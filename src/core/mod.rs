// Core algorithm exports
pub mod accessors;
pub mod cluster;
pub mod distance;
pub mod error;
pub mod features;
pub mod filters;
pub mod math;
pub mod matcher;
pub mod ranking;
pub mod scoring;
pub mod synthetic;

pub use cluster::ClusterAdjuster;
pub use distance::{AreaDistance, DistanceModel};
pub use error::ScoringError;
pub use filters::FilterDecision;
pub use matcher::{Matcher, Ranking};
pub use ranking::{FixedSource, RandSource, RankingSampler, UniformSource};
pub use scoring::aggregate;
pub use synthetic::{pair_seed, LogitMixer, SecondaryPredictor, SyntheticPredictor};
