//! Calibration curves and the cross-section digitizer.
//!
//! Calibration maps a particle's scattering cross-section onto a bin index
//! by comparing it against the cross-sections computed at the instrument's
//! bin boundaries. Mie resonances make the raw boundary curve locally
//! non-monotonic, so each method post-processes it before it is used as a
//! digitizer:
//!
//! - [`CalibrationMethod::Spline`] keeps the computed values but averages
//!   out local dips ([`squash_dips`])
//! - [`CalibrationMethod::Linear`] replaces the curve with a single fitted
//!   power law
//! - [`CalibrationMethod::Piecewise`] replaces it with a two-segment power
//!   law joined at a fitted breakpoint

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How the raw boundary cross-sections are turned into a monotone
/// calibration curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationMethod {
    /// Keep the computed boundary values, smoothing local dips.
    #[serde(alias = "smooth")]
    Spline,
    /// Single power law `C = a * Dp^b` fitted to the boundary values.
    Linear,
    /// Two power-law segments with a fitted breakpoint.
    Piecewise,
}

/// Replace local dips in a sampled curve with the average of their
/// neighbors.
///
/// A dip is any point whose successor, in the original samples, is smaller
/// than it. Replacements are applied left to right against the working
/// copy, so a repaired point feeds into the repair of the next one. One
/// pass removes isolated Mie-resonance dips; a genuinely decreasing run
/// is flattened rather than eliminated, which is all the digitizer needs.
pub fn squash_dips(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();

    let dips: Vec<usize> = values
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[1] < w[0])
        .map(|(i, _)| i)
        .collect();

    for i in dips {
        // A dip at the first sample has no left neighbor to average with.
        if i == 0 || i + 1 >= out.len() {
            continue;
        }
        out[i] = 0.5 * (out[i - 1] + out[i + 1]);
    }

    out
}

/// A fitted calibration curve: the per-boundary cross-section thresholds
/// and the optical configuration they were computed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationCurve {
    /// Cross-section thresholds at the n+1 bin boundaries, in cm².
    pub boundaries: Vec<f64>,
    /// Complex refractive index of the calibration material.
    pub refr: Complex64,
    pub method: CalibrationMethod,
}

impl CalibrationCurve {
    /// Map a cross-section onto a bin index.
    ///
    /// Thresholds are half-open on the left: a value equal to boundary `k`
    /// lands in bin `k`. Values below the first threshold or at/above the
    /// last fall outside the instrument's range and return `None`.
    pub fn digitize(&self, value: f64) -> Option<usize> {
        let k = self.boundaries.partition_point(|&b| b <= value);
        if k == 0 || k == self.boundaries.len() {
            debug!(value, "cross-section outside calibrated range");
            return None;
        }
        Some(k - 1)
    }

    /// Number of bins this curve resolves.
    pub fn n_bins(&self) -> usize {
        self.boundaries.len().saturating_sub(1)
    }
}
