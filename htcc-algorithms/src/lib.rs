//! htcc-algorithms: Hit clustering for the High Threshold Cherenkov Counter.
//!
//! The engine picks the strongest unclustered hit as a seed, grows a cluster
//! through neighbouring bins that agree in time, and keeps the cluster if it
//! passes the size and photoelectron cuts.
//!
#![warn(missing_docs)]

mod processing;
mod seeded;

pub use processing::{reconstruct_event, reconstruct_stream, EventReconstructor, ReconstructStream};
pub use seeded::{SeededClustering, SeededState};

// Re-export core clustering types
pub use htcc_core::clustering::{Cluster, ClusteringStatistics};
pub use htcc_core::geometry::ReconstructionParameters;
