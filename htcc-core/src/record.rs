//! Cluster output records.
#![allow(clippy::cast_possible_truncation)]

use crate::clustering::Cluster;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Frozen summary of an accepted cluster, as written to the output store.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusterRecord {
    /// Number of hits.
    pub n_hits: u16,
    /// Number of distinct theta bins.
    pub n_theta: u8,
    /// Number of distinct phi bins.
    pub n_phi: u8,
    /// Smallest theta index.
    pub theta_min: u8,
    /// Largest theta index.
    pub theta_max: u8,
    /// Smallest phi index.
    pub phi_min: u8,
    /// Largest phi index.
    pub phi_max: u8,
    /// Total photoelectrons.
    pub nphe: u64,
    /// Weighted mean time.
    pub time: f64,
    /// Weighted mean polar angle (rad).
    pub theta: f64,
    /// Weighted circular mean azimuth (rad).
    pub phi: f64,
    /// Aggregate theta uncertainty.
    pub dtheta: f64,
    /// Aggregate phi uncertainty.
    pub dphi: f64,
}

impl ClusterRecord {
    /// Creates a record from a cluster's current aggregates.
    ///
    /// Bin counts and indices are bounded by the detector segmentation and
    /// always fit their fields; the hit count saturates.
    #[must_use]
    pub fn from_cluster(cluster: &Cluster) -> Self {
        Self {
            n_hits: u16::try_from(cluster.len()).unwrap_or(u16::MAX),
            n_theta: cluster.n_theta() as u8,
            n_phi: cluster.n_phi() as u8,
            theta_min: cluster.theta_index_min() as u8,
            theta_max: cluster.theta_index_max() as u8,
            phi_min: cluster.phi_index_min() as u8,
            phi_max: cluster.phi_index_max() as u8,
            nphe: cluster.nphe_total(),
            time: cluster.time(),
            theta: cluster.theta(),
            phi: cluster.phi(),
            dtheta: cluster.dtheta(),
            dphi: cluster.dphi(),
        }
    }
}

impl From<&Cluster> for ClusterRecord {
    fn from(cluster: &Cluster) -> Self {
        Self::from_cluster(cluster)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_record_from_cluster() {
        let mut cluster = Cluster::new();
        cluster.add_hit(1, 11, 3, 4.0, 0.28, 6.0, 0.02, 0.04).unwrap();
        cluster.add_hit(1, 0, 1, 8.0, 0.28, 0.26, 0.02, 0.04).unwrap();

        let record = ClusterRecord::from(&cluster);
        assert_eq!(record.n_hits, 2);
        assert_eq!(record.n_theta, 1);
        assert_eq!(record.n_phi, 2);
        assert_eq!((record.phi_min, record.phi_max), (0, 11));
        assert_eq!((record.theta_min, record.theta_max), (1, 1));
        assert_eq!(record.nphe, 4);
        assert_eq!(record.time, 5.0);
        assert_eq!(record, cluster.record());
    }
}
