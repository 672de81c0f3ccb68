//! Cluster accumulation and clustering statistics.
#![allow(clippy::cast_precision_loss)]

use crate::error::{Error, Result};
use crate::hit::{N_PHI, N_THETA};
use crate::record::ClusterRecord;

/// A hit owned by a cluster.
///
/// Created only through [`Cluster::add_hit`], which validates the indices
/// and forces both alignment uncertainties positive.
#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub struct ClusterHit {
    /// Theta index in `[0, 4)`.
    pub theta_index: usize,
    /// Phi index in `[0, 12)`.
    pub phi_index: usize,
    /// Photoelectron count.
    pub nphe: u32,
    /// Hit time with the ring offset removed.
    pub time: f64,
    /// Nominal polar angle of the hit's bin.
    pub theta: f64,
    /// Nominal azimuth of the hit's bin.
    pub phi: f64,
    /// Theta alignment uncertainty (non-negative).
    pub dtheta: f64,
    /// Phi alignment uncertainty (non-negative).
    pub dphi: f64,
}

/// Cluster of hits with aggregates recomputed on every insertion.
///
/// The hit order is significant: the outward-sign reference means depend on
/// the full sequence, and the clustering engine walks hits by position while
/// growing a cluster.
#[derive(Debug, Clone, Default)]
pub struct Cluster {
    hits: Vec<ClusterHit>,
    nphe_total: u64,
    n_theta: usize,
    n_phi: usize,
    theta_index_min: usize,
    theta_index_max: usize,
    phi_index_min: usize,
    phi_index_max: usize,
    time: f64,
    theta: f64,
    phi: f64,
    dtheta: f64,
    dphi: f64,
}

impl Cluster {
    /// Creates an empty cluster with every aggregate zeroed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a hit and recomputes every aggregate.
    ///
    /// # Errors
    /// Returns an error without modifying the cluster if `theta_index` is
    /// outside `[0, 4)`, `phi_index` is outside `[0, 12)`, or `nphe` is
    /// negative.
    #[allow(clippy::too_many_arguments)]
    pub fn add_hit(
        &mut self,
        theta_index: i32,
        phi_index: i32,
        nphe: i32,
        time: f64,
        theta: f64,
        phi: f64,
        dtheta: f64,
        dphi: f64,
    ) -> Result<()> {
        let theta_slot = usize::try_from(theta_index)
            .ok()
            .filter(|&i| i < N_THETA)
            .ok_or(Error::InvalidThetaIndex(theta_index))?;
        let phi_slot = usize::try_from(phi_index)
            .ok()
            .filter(|&i| i < N_PHI)
            .ok_or(Error::InvalidPhiIndex(phi_index))?;
        let nphe = u32::try_from(nphe).map_err(|_| Error::NegativePhotoelectrons(nphe))?;

        self.hits.push(ClusterHit {
            theta_index: theta_slot,
            phi_index: phi_slot,
            nphe,
            time,
            theta,
            phi,
            dtheta: dtheta.abs(),
            dphi: dphi.abs(),
        });
        self.recompute();
        Ok(())
    }

    /// Recomputes every aggregate from the stored hits.
    ///
    /// Each hit's alignment uncertainty pushes its angle away from the
    /// unweighted mean of the cluster, so the result depends on the whole
    /// sequence and cannot be updated incrementally.
    fn recompute(&mut self) {
        let n = self.hits.len();
        if n == 0 {
            *self = Self::default();
            return;
        }

        let mean_theta_raw = self.hits.iter().map(|h| h.theta).sum::<f64>() / n as f64;
        let mean_phi_raw = self.hits.iter().map(|h| h.phi).sum::<f64>() / n as f64;

        let mut nphe_total = 0u64;
        let mut time = 0.0;
        let mut theta = 0.0;
        let mut cos_phi = 0.0;
        let mut sin_phi = 0.0;
        let mut theta_mask = 0u16;
        let mut phi_mask = 0u16;

        let first = self.hits[0];
        let (mut theta_min, mut theta_max) = (first.theta_index, first.theta_index);
        let (mut phi_min, mut phi_max) = (first.phi_index, first.phi_index);

        for hit in &self.hits {
            let weight = f64::from(hit.nphe);
            nphe_total += u64::from(hit.nphe);
            time += hit.time * weight;
            theta += (hit.theta + hit.dtheta * sign(hit.theta - mean_theta_raw)) * weight;

            let phi_shifted = hit.phi + hit.dphi * sign(hit.phi - mean_phi_raw);
            cos_phi += phi_shifted.cos() * weight;
            sin_phi += phi_shifted.sin() * weight;

            theta_min = theta_min.min(hit.theta_index);
            theta_max = theta_max.max(hit.theta_index);
            phi_min = phi_min.min(hit.phi_index);
            phi_max = phi_max.max(hit.phi_index);
            theta_mask |= 1 << hit.theta_index;
            phi_mask |= 1 << hit.phi_index;
        }

        let total = nphe_total as f64;
        self.nphe_total = nphe_total;
        self.time = time / total;
        self.theta = theta / total;
        self.phi = (sin_phi / total).atan2(cos_phi / total);

        // Uncertainty accumulators are never filled, so this is pow(0, -0.5).
        let dtheta_sum = 0.0_f64;
        let dphi_sum = 0.0_f64;
        self.dtheta = dtheta_sum.powf(-0.5);
        self.dphi = dphi_sum.powf(-0.5);

        self.theta_index_min = theta_min;
        self.theta_index_max = theta_max;
        self.phi_index_min = phi_min;
        self.phi_index_max = phi_max;
        self.n_theta = theta_mask.count_ones() as usize;
        self.n_phi = phi_mask.count_ones() as usize;
    }

    /// Returns the number of hits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Returns true if the cluster holds no hits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Returns the hits in insertion order.
    #[must_use]
    pub fn hits(&self) -> &[ClusterHit] {
        &self.hits
    }

    /// Theta index of the hit at `position`.
    #[must_use]
    pub fn hit_theta_index(&self, position: usize) -> Option<usize> {
        self.hits.get(position).map(|h| h.theta_index)
    }

    /// Phi index of the hit at `position`.
    #[must_use]
    pub fn hit_phi_index(&self, position: usize) -> Option<usize> {
        self.hits.get(position).map(|h| h.phi_index)
    }

    /// Total photoelectron count.
    #[must_use]
    pub fn nphe_total(&self) -> u64 {
        self.nphe_total
    }

    /// Number of distinct theta bins.
    #[must_use]
    pub fn n_theta(&self) -> usize {
        self.n_theta
    }

    /// Number of distinct phi bins.
    #[must_use]
    pub fn n_phi(&self) -> usize {
        self.n_phi
    }

    /// Smallest theta index.
    #[must_use]
    pub fn theta_index_min(&self) -> usize {
        self.theta_index_min
    }

    /// Largest theta index.
    #[must_use]
    pub fn theta_index_max(&self) -> usize {
        self.theta_index_max
    }

    /// Smallest phi index.
    #[must_use]
    pub fn phi_index_min(&self) -> usize {
        self.phi_index_min
    }

    /// Largest phi index.
    #[must_use]
    pub fn phi_index_max(&self) -> usize {
        self.phi_index_max
    }

    /// Photoelectron-weighted mean time.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Photoelectron-weighted mean polar angle.
    #[must_use]
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Photoelectron-weighted circular mean azimuth, in `(-pi, pi]`.
    #[must_use]
    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// Aggregate theta uncertainty.
    #[must_use]
    pub fn dtheta(&self) -> f64 {
        self.dtheta
    }

    /// Aggregate phi uncertainty.
    #[must_use]
    pub fn dphi(&self) -> f64 {
        self.dphi
    }

    /// Snapshot of the aggregates as an output record.
    #[must_use]
    pub fn record(&self) -> ClusterRecord {
        ClusterRecord::from_cluster(self)
    }
}

/// Sign with `sign(0) == 0`; NaN passes through.
#[inline]
fn sign(x: f64) -> f64 {
    if x == 0.0 || x.is_nan() {
        x
    } else {
        x.signum()
    }
}

/// Counters accumulated by a clustering run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusteringStatistics {
    /// Hits seen, before thresholding.
    pub hits_processed: usize,
    /// Hits above the photoelectron threshold.
    pub hits_above_threshold: usize,
    /// Clusters accepted.
    pub clusters_found: usize,
    /// Clusters grown but rejected by the acceptance cuts.
    pub clusters_rejected: usize,
    /// Hits left over when no further seed qualified.
    pub hits_unclustered: usize,
}

impl ClusteringStatistics {
    /// Adds another run's counters to this one.
    pub fn merge(&mut self, other: &Self) {
        self.hits_processed += other.hits_processed;
        self.hits_above_threshold += other.hits_above_threshold;
        self.clusters_found += other.clusters_found;
        self.clusters_rejected += other.clusters_rejected;
        self.hits_unclustered += other.hits_unclustered;
    }
}
