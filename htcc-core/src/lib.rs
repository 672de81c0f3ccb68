//! htcc-core: Core types for HTCC hit clustering.
//!
//! This crate provides the hit table, the reconstruction parameters, and the
//! cluster accumulator that the clustering engine grows one hit at a time.
//!

pub mod clustering;
pub mod error;
pub mod geometry;
pub mod hit;
pub mod record;

pub use clustering::{Cluster, ClusterHit, ClusteringStatistics};
pub use error::{Error, Result};
pub use geometry::ReconstructionParameters;
pub use hit::{phi_distance, phi_index, theta_index, Hit, HitTable, RawHit, N_PHI, N_THETA};
pub use record::ClusterRecord;
