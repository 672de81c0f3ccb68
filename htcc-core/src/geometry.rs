//! Geometry and threshold parameters for HTCC reconstruction.
#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]

use crate::error::{Error, Result};
use crate::hit::{N_PHI, N_THETA};

/// Reconstruction parameters.
///
/// Angles are stored in radians. Thresholds carry their reconstruction table
/// names in their docs so parameter files stay recognizable.
#[derive(Clone, Debug, PartialEq)]
pub struct ReconstructionParameters {
    /// Nominal polar angle per theta index.
    pub theta0: [f64; N_THETA],
    /// Half-width of each theta bin (carried, not used by clustering).
    pub dtheta0: [f64; N_THETA],
    /// Phi alignment uncertainty per theta index.
    pub phi_range: [f64; N_THETA],
    /// Theta alignment uncertainty.
    pub theta_range: f64,
    /// Azimuth of the first phi bin.
    pub phi0: f64,
    /// Half-width of a phi bin.
    pub dphi0: f64,
    /// Time offset per theta index, subtracted from the raw hit time.
    pub t0: [f64; N_THETA],
    /// `npheminhit`: hits need strictly more photoelectrons to be considered.
    pub nphe_min_hit: i32,
    /// `npheminmax`: minimum photoelectrons for a seed (inclusive).
    pub nphe_min_seed: i32,
    /// `npeminclst`: minimum total cluster photoelectrons (inclusive).
    pub nphe_min_cluster: i32,
    /// `nhitmaxclst`: maximum hits per cluster.
    pub max_hits: usize,
    /// `nthetamaxclst`: maximum distinct theta bins per cluster.
    pub max_theta_bins: usize,
    /// `nphimaxclst`: maximum distinct phi bins per cluster.
    pub max_phi_bins: usize,
    /// `maxtimediff`: maximum time difference for merging (inclusive).
    pub max_time_diff: f64,
}

impl Default for ReconstructionParameters {
    fn default() -> Self {
        Self::clas12_defaults()
    }
}

impl ReconstructionParameters {
    /// Create the CLAS12 default parameters.
    ///
    /// Angles are given in degrees here and converted once.
    #[must_use]
    pub fn clas12_defaults() -> Self {
        Self {
            theta0: [8.75, 16.25, 23.75, 31.25].map(f64::to_radians),
            dtheta0: [3.75; N_THETA].map(f64::to_radians),
            phi_range: [4.0, 2.4, 1.6, 1.2].map(f64::to_radians),
            theta_range: 1.2_f64.to_radians(),
            phi0: 15.0_f64.to_radians(),
            dphi0: 15.0_f64.to_radians(),
            t0: [11.553, 11.943, 12.339, 12.75],
            nphe_min_hit: 1,
            nphe_min_seed: 1,
            nphe_min_cluster: 1,
            max_hits: 4,
            max_theta_bins: 2,
            max_phi_bins: 2,
            max_time_diff: 2.0,
        }
    }

    /// Set the hit photoelectron threshold.
    #[must_use]
    pub fn with_nphe_min_hit(mut self, nphe: i32) -> Self {
        self.nphe_min_hit = nphe;
        self
    }

    /// Set the seed photoelectron threshold.
    #[must_use]
    pub fn with_nphe_min_seed(mut self, nphe: i32) -> Self {
        self.nphe_min_seed = nphe;
        self
    }

    /// Set the cluster photoelectron threshold.
    #[must_use]
    pub fn with_nphe_min_cluster(mut self, nphe: i32) -> Self {
        self.nphe_min_cluster = nphe;
        self
    }

    /// Set the maximum number of hits per cluster.
    #[must_use]
    pub fn with_max_hits(mut self, hits: usize) -> Self {
        self.max_hits = hits;
        self
    }

    /// Set the maximum number of distinct theta bins per cluster.
    #[must_use]
    pub fn with_max_theta_bins(mut self, bins: usize) -> Self {
        self.max_theta_bins = bins;
        self
    }

    /// Set the maximum number of distinct phi bins per cluster.
    #[must_use]
    pub fn with_max_phi_bins(mut self, bins: usize) -> Self {
        self.max_phi_bins = bins;
        self
    }

    /// Set the merge time window.
    #[must_use]
    pub fn with_max_time_diff(mut self, window: f64) -> Self {
        self.max_time_diff = window;
        self
    }

    /// Check that every angle and offset is finite and the time window is
    /// a non-negative number.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let arrays = [
            ("theta0", &self.theta0),
            ("dtheta0", &self.dtheta0),
            ("phi_range", &self.phi_range),
            ("t0", &self.t0),
        ];
        for (name, values) in arrays {
            if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
                return Err(Error::ConfigError(format!("{name} contains {bad}")));
            }
        }
        let scalars = [
            ("theta_range", self.theta_range),
            ("phi0", self.phi0),
            ("dphi0", self.dphi0),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(Error::ConfigError(format!("{name} is {value}")));
            }
        }
        if self.max_time_diff.is_nan() || self.max_time_diff < 0.0 {
            return Err(Error::ConfigError(format!(
                "max_time_diff must be non-negative, got {}",
                self.max_time_diff
            )));
        }
        Ok(())
    }

    /// Nominal polar angle of a theta bin.
    ///
    /// # Errors
    /// Returns [`Error::InvalidThetaIndex`] for an index outside `[0, 4)`.
    pub fn nominal_theta(&self, theta_index: i32) -> Result<f64> {
        Ok(self.theta0[ring_slot(theta_index)?])
    }

    /// Nominal azimuth of a phi bin.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPhiIndex`] for an index outside `[0, 12)`.
    pub fn nominal_phi(&self, phi_index: i32) -> Result<f64> {
        if !(0..N_PHI as i32).contains(&phi_index) {
            return Err(Error::InvalidPhiIndex(phi_index));
        }
        Ok(self.phi0 + 2.0 * self.dphi0 * f64::from(phi_index))
    }

    /// Hit time with the ring offset removed.
    ///
    /// # Errors
    /// Returns [`Error::InvalidThetaIndex`] for an index outside `[0, 4)`.
    pub fn corrected_time(&self, theta_index: i32, raw_time: f64) -> Result<f64> {
        Ok(raw_time - self.t0[ring_slot(theta_index)?])
    }

    /// Theta alignment uncertainty, shared by every ring.
    #[must_use]
    pub fn theta_uncertainty(&self) -> f64 {
        self.theta_range
    }

    /// Phi alignment uncertainty of a ring.
    ///
    /// # Errors
    /// Returns [`Error::InvalidThetaIndex`] for an index outside `[0, 4)`.
    pub fn phi_uncertainty(&self, theta_index: i32) -> Result<f64> {
        Ok(self.phi_range[ring_slot(theta_index)?])
    }
}

fn ring_slot(theta_index: i32) -> Result<usize> {
    usize::try_from(theta_index)
        .ok()
        .filter(|&slot| slot < N_THETA)
        .ok_or(Error::InvalidThetaIndex(theta_index))
}
