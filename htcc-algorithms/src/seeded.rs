//! Seeded clustering for the HTCC.
//!
//! Key characteristics:
//! - Seeds are the highest-photoelectron hits still unclustered
//! - Growth follows adjacent bins (one step in theta or phi, diagonals
//!   allowed) whose time agrees with the cluster's running mean time
//! - Hits consumed by a rejected cluster are not offered to later seeds
#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]

use std::collections::VecDeque;

use htcc_core::clustering::{Cluster, ClusteringStatistics};
use htcc_core::error::Result;
use htcc_core::geometry::ReconstructionParameters;
use htcc_core::hit::{phi_distance, HitTable};
use log::{debug, trace};

/// Hits still available for clustering, in hit-table order.
///
/// Removal only clears a flag, so slot numbers stay valid while the
/// engine scans and the relative order of the survivors never changes.
#[derive(Debug, Default)]
struct RemainingPool {
    hit_indices: Vec<usize>,
    active: Vec<bool>,
    live: usize,
}

impl RemainingPool {
    fn fill(&mut self, hits: &HitTable, nphe_min_hit: i32) {
        self.hit_indices.clear();
        self.active.clear();
        self.hit_indices
            .extend((0..hits.len()).filter(|&i| hits.nphe[i] > nphe_min_hit));
        self.active.resize(self.hit_indices.len(), true);
        self.live = self.hit_indices.len();
    }

    fn clear(&mut self) {
        self.hit_indices.clear();
        self.active.clear();
        self.live = 0;
    }

    fn len(&self) -> usize {
        self.live
    }

    fn slots(&self) -> usize {
        self.hit_indices.len()
    }

    /// Hit index in `slot`, if it has not been taken.
    fn get(&self, slot: usize) -> Option<usize> {
        self.active[slot].then(|| self.hit_indices[slot])
    }

    fn take(&mut self, slot: usize) -> usize {
        debug_assert!(self.active[slot], "slot {slot} taken twice");
        self.active[slot] = false;
        self.live -= 1;
        self.hit_indices[slot]
    }

    /// Active `(slot, hit_index)` pairs in order.
    fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.slots()).filter_map(|slot| self.get(slot).map(|hit| (slot, hit)))
    }
}

/// Seeded clustering state.
///
/// Reused across events; statistics accumulate until [`SeededState::reset`].
#[derive(Debug, Default)]
pub struct SeededState {
    pool: RemainingPool,
    statistics: ClusteringStatistics,
}

impl SeededState {
    /// Clears the working pool and the accumulated statistics.
    pub fn reset(&mut self) {
        self.pool.clear();
        self.statistics = ClusteringStatistics::default();
    }
}

/// Seeded clustering algorithm.
#[derive(Debug, Clone, Default)]
pub struct SeededClustering {
    params: ReconstructionParameters,
}

impl SeededClustering {
    /// Create with the given reconstruction parameters.
    #[must_use]
    pub fn new(params: ReconstructionParameters) -> Self {
        Self { params }
    }

    /// Algorithm name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        "Seeded"
    }

    /// Parameters in use.
    #[must_use]
    pub fn params(&self) -> &ReconstructionParameters {
        &self.params
    }

    /// Fresh state for this algorithm.
    #[must_use]
    pub fn create_state(&self) -> SeededState {
        SeededState::default()
    }

    /// Statistics accumulated in `state`.
    #[must_use]
    pub fn statistics(&self, state: &SeededState) -> ClusteringStatistics {
        state.statistics.clone()
    }

    /// Clusters one event's hits.
    ///
    /// Returns the accepted clusters in the order they were seeded. An event
    /// with no hits, or no hit above the seed threshold, yields no clusters.
    ///
    /// # Errors
    /// Returns an error if a hit that reaches a cluster, or that is tested
    /// against one, carries a theta or phi index outside the detector
    /// segmentation. The event is abandoned.
    pub fn cluster(&self, hits: &HitTable, state: &mut SeededState) -> Result<Vec<Cluster>> {
        state.pool.fill(hits, self.params.nphe_min_hit);
        state.statistics.hits_processed += hits.len();
        state.statistics.hits_above_threshold += state.pool.len();

        let mut clusters = Vec::new();
        while let Some(slot) = self.find_seed(hits, &state.pool) {
            let seed = state.pool.take(slot);
            trace!(
                "seed hit {seed}: theta {} phi {} nphe {}",
                hits.theta_index[seed],
                hits.phi_index[seed],
                hits.nphe[seed]
            );

            let mut cluster = Cluster::new();
            self.add_table_hit(&mut cluster, hits, seed)?;
            self.grow(&mut cluster, hits, &mut state.pool)?;

            if self.accepts(&cluster) {
                debug!(
                    "accepted cluster: {} hits, {} nphe, theta {:.4} phi {:.4} time {:.3}",
                    cluster.len(),
                    cluster.nphe_total(),
                    cluster.theta(),
                    cluster.phi(),
                    cluster.time()
                );
                state.statistics.clusters_found += 1;
                clusters.push(cluster);
            } else {
                debug!(
                    "rejected cluster: {} hits, {} nphe, {} theta bins, {} phi bins",
                    cluster.len(),
                    cluster.nphe_total(),
                    cluster.n_theta(),
                    cluster.n_phi()
                );
                state.statistics.clusters_rejected += 1;
            }
        }

        state.statistics.hits_unclustered += state.pool.len();
        Ok(clusters)
    }

    /// Slot of the remaining hit with the most photoelectrons at or above
    /// the seed threshold. Ties go to the earliest slot.
    fn find_seed(&self, hits: &HitTable, pool: &RemainingPool) -> Option<usize> {
        let mut best: Option<(usize, i32)> = None;
        for (slot, hit) in pool.iter() {
            let nphe = hits.nphe[hit];
            if nphe >= self.params.nphe_min_seed && best.map_or(true, |(_, max)| nphe > max) {
                best = Some((slot, nphe));
            }
        }
        best.map(|(slot, _)| slot)
    }

    /// Merges adjacent, time-coincident hits until none qualify.
    ///
    /// Every cluster hit, including those merged during this pass, is
    /// queued once and compared against the whole remaining pool. The
    /// cluster's mean time moves with each merge, so later comparisons in
    /// the same scan see the updated value.
    fn grow(&self, cluster: &mut Cluster, hits: &HitTable, pool: &mut RemainingPool) -> Result<()> {
        let mut pending: VecDeque<(i32, i32)> = cluster
            .hits()
            .iter()
            .map(|h| (h.theta_index as i32, h.phi_index as i32))
            .collect();

        while let Some((theta_index, phi_index)) = pending.pop_front() {
            for slot in 0..pool.slots() {
                let Some(candidate) = pool.get(slot) else {
                    continue;
                };
                let candidate_theta = hits.theta_index[candidate];
                let candidate_phi = hits.phi_index[candidate];

                let theta_diff = (i64::from(candidate_theta) - i64::from(theta_index)).abs();
                let phi_diff = i64::from(phi_distance(candidate_phi, phi_index));
                let time = self
                    .params
                    .corrected_time(candidate_theta, hits.time[candidate])?;
                let time_diff = (time - cluster.time()).abs();

                if (theta_diff == 1 || phi_diff == 1)
                    && theta_diff + phi_diff <= 2
                    && time_diff <= self.params.max_time_diff
                {
                    pool.take(slot);
                    self.add_table_hit(cluster, hits, candidate)?;
                    pending.push_back((candidate_theta, candidate_phi));
                    trace!(
                        "merged hit {candidate}: theta {candidate_theta} phi {candidate_phi}, dt {time_diff:.3}"
                    );
                }
            }
        }
        Ok(())
    }

    /// Adds table hit `index` with its nominal geometry and corrected time.
    fn add_table_hit(&self, cluster: &mut Cluster, hits: &HitTable, index: usize) -> Result<()> {
        let theta_index = hits.theta_index[index];
        let phi_index = hits.phi_index[index];
        let params = &self.params;

        cluster.add_hit(
            theta_index,
            phi_index,
            hits.nphe[index],
            params.corrected_time(theta_index, hits.time[index])?,
            params.nominal_theta(theta_index)?,
            params.nominal_phi(phi_index)?,
            params.theta_uncertainty(),
            params.phi_uncertainty(theta_index)?,
        )
    }

    fn accepts(&self, cluster: &Cluster) -> bool {
        let params = &self.params;
        u64::try_from(params.nphe_min_cluster).map_or(true, |min| cluster.nphe_total() >= min)
            && cluster.n_theta() <= params.max_theta_bins
            && cluster.n_phi() <= params.max_phi_bins
            && cluster.len() <= params.max_hits
    }
}
