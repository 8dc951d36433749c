use crate::config::{ClusterRow, ClusterTables, LatentCoefficients, BASELINE_CLUSTER};
use crate::core::{accessors, math::logistic, scoring::latent_score};
use crate::models::{ClusterScore, FeatureBreakdown, Profile, Role};

/// Per-segment re-scoring of a pair.
///
/// Each role is scored with the coefficient row of its own cluster, read from
/// the profile playing that role. The cluster model uses the plain logistic
/// (no slope or midpoint) so its output is independent of the global curves.
#[derive(Debug, Clone, Copy)]
pub struct ClusterAdjuster<'a> {
    tables: &'a ClusterTables,
}

impl<'a> ClusterAdjuster<'a> {
    pub fn new(tables: &'a ClusterTables) -> Self {
        Self { tables }
    }

    /// Coefficient row for a cluster of one role.
    ///
    /// Unknown ids fall back to the baseline cluster; if even that is absent
    /// the zero row is used, which yields a neutral 0.5.
    pub fn resolve(&self, role: Role, cluster_id: u32) -> (u32, Option<&'a str>, LatentCoefficients) {
        let rows = self.rows(role);

        if let Some(row) = find(rows, cluster_id) {
            return (row.id, row.name.as_deref(), row.coefficients);
        }

        tracing::warn!(
            "Unknown cluster {} for role {:?}, falling back to cluster {}",
            cluster_id,
            role,
            BASELINE_CLUSTER
        );

        match find(rows, BASELINE_CLUSTER) {
            Some(row) => (row.id, row.name.as_deref(), row.coefficients),
            None => (BASELINE_CLUSTER, None, LatentCoefficients::ZERO),
        }
    }

    /// Cluster-specific like probability for `role`, played by `profile`
    pub fn adjust(&self, role: Role, profile: &Profile, details: &FeatureBreakdown) -> ClusterScore {
        let (cluster_id, name, coefficients) = self.resolve(role, accessors::cluster_id(profile));
        let linear_score = latent_score(details, role, &coefficients);

        ClusterScore {
            cluster_id,
            cluster_name: name.map(str::to_string),
            linear_score,
            probability: logistic(linear_score),
        }
    }

    fn rows(&self, role: Role) -> &'a [ClusterRow] {
        match role {
            Role::A => &self.tables.a,
            Role::B => &self.tables.b,
        }
    }
}

fn find(rows: &[ClusterRow], id: u32) -> Option<&ClusterRow> {
    rows.iter().find(|row| row.id == id)
}
