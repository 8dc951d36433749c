use std::fmt::Debug;

use crate::config::LocationConfig;
use crate::core::{accessors, math::clip01};
use crate::models::Profile;

/// Source of the physical distance between two profiles.
///
/// Implementations must be pure: the same pair always yields the same
/// distance, so scores stay reproducible.
pub trait DistanceModel: Debug + Send + Sync {
    /// Distance in kilometers
    fn distance_km(&self, a: &Profile, b: &Profile) -> f64;
}

/// Area-level distance: 0 inside one area, a fixed estimate across areas.
///
/// Profiles only carry a named area, so this is the finest resolution
/// available without coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaDistance {
    pub cross_area_km: f64,
}

impl AreaDistance {
    pub fn from_config(config: &LocationConfig) -> Self {
        Self {
            cross_area_km: config.cross_area_distance_km,
        }
    }
}

impl DistanceModel for AreaDistance {
    fn distance_km(&self, a: &Profile, b: &Profile) -> f64 {
        if same_area(a, b) {
            0.0
        } else {
            self.cross_area_km
        }
    }
}

/// Both profiles declare the same area (case-insensitive).
/// A missing area never matches.
#[inline]
pub fn same_area(a: &Profile, b: &Profile) -> bool {
    match (accessors::area(a), accessors::area(b)) {
        (Some(x), Some(y)) => x.eq_ignore_ascii_case(y),
        _ => false,
    }
}

/// Linear decay from 1 at distance 0 to 0 at `max_distance_km`
#[inline]
pub fn distance_decay(distance_km: f64, max_distance_km: f64) -> f64 {
    if max_distance_km.is_nan() || max_distance_km <= 0.0 {
        return 0.0;
    }
    clip01(1.0 - distance_km / max_distance_km)
}
