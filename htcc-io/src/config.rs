//! Parameter files.
//!
//! Parameters are stored as flat JSON with angles in degrees, using the
//! reconstruction table names (`theta0`, `npheminhit`, `maxtimediff`, ...).
//! Every field is optional; missing fields keep the CLAS12 defaults.

use crate::Result;
use htcc_core::geometry::ReconstructionParameters;
use htcc_core::hit::N_THETA;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// Intermediate struct for the degree-based JSON layout
#[derive(Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct JsonParameters {
    theta0: [f64; N_THETA],
    dtheta0: [f64; N_THETA],
    #[serde(rename = "phiRange")]
    phi_range: [f64; N_THETA],
    #[serde(rename = "thetaRange")]
    theta_range: f64,
    phi0: f64,
    dphi0: f64,
    t0: [f64; N_THETA],
    #[serde(rename = "npheminhit")]
    nphe_min_hit: i32,
    #[serde(rename = "npheminmax")]
    nphe_min_seed: i32,
    #[serde(rename = "npeminclst")]
    nphe_min_cluster: i32,
    #[serde(rename = "nhitmaxclst")]
    max_hits: usize,
    #[serde(rename = "nthetamaxclst")]
    max_theta_bins: usize,
    #[serde(rename = "nphimaxclst")]
    max_phi_bins: usize,
    #[serde(rename = "maxtimediff")]
    max_time_diff: f64,
}

impl Default for JsonParameters {
    fn default() -> Self {
        Self::from(&ReconstructionParameters::default())
    }
}

impl From<&ReconstructionParameters> for JsonParameters {
    fn from(p: &ReconstructionParameters) -> Self {
        Self {
            theta0: p.theta0.map(f64::to_degrees),
            dtheta0: p.dtheta0.map(f64::to_degrees),
            phi_range: p.phi_range.map(f64::to_degrees),
            theta_range: p.theta_range.to_degrees(),
            phi0: p.phi0.to_degrees(),
            dphi0: p.dphi0.to_degrees(),
            t0: p.t0,
            nphe_min_hit: p.nphe_min_hit,
            nphe_min_seed: p.nphe_min_seed,
            nphe_min_cluster: p.nphe_min_cluster,
            max_hits: p.max_hits,
            max_theta_bins: p.max_theta_bins,
            max_phi_bins: p.max_phi_bins,
            max_time_diff: p.max_time_diff,
        }
    }
}

impl From<JsonParameters> for ReconstructionParameters {
    fn from(j: JsonParameters) -> Self {
        Self {
            theta0: j.theta0.map(f64::to_radians),
            dtheta0: j.dtheta0.map(f64::to_radians),
            phi_range: j.phi_range.map(f64::to_radians),
            theta_range: j.theta_range.to_radians(),
            phi0: j.phi0.to_radians(),
            dphi0: j.dphi0.to_radians(),
            t0: j.t0,
            nphe_min_hit: j.nphe_min_hit,
            nphe_min_seed: j.nphe_min_seed,
            nphe_min_cluster: j.nphe_min_cluster,
            max_hits: j.max_hits,
            max_theta_bins: j.max_theta_bins,
            max_phi_bins: j.max_phi_bins,
            max_time_diff: j.max_time_diff,
        }
    }
}

/// Load parameters from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read, is not valid parameter JSON,
/// or the resulting parameters fail validation.
pub fn load_parameters<P: AsRef<Path>>(path: P) -> Result<ReconstructionParameters> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let json: JsonParameters = serde_json::from_reader(reader)?;
    finish(json)
}

/// Parse parameters from a JSON string.
///
/// # Errors
/// Returns an error if the string is not valid parameter JSON or the
/// resulting parameters fail validation.
pub fn parameters_from_json(json: &str) -> Result<ReconstructionParameters> {
    let json: JsonParameters = serde_json::from_str(json)?;
    finish(json)
}

/// Render parameters as pretty-printed JSON in the file layout.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn parameters_to_json(params: &ReconstructionParameters) -> Result<String> {
    Ok(serde_json::to_string_pretty(&JsonParameters::from(params))?)
}

fn finish(json: JsonParameters) -> Result<ReconstructionParameters> {
    let params = ReconstructionParameters::from(json);
    params.validate()?;
    Ok(params)
}
