//! Hygroscopic growth and volume-weighted mixing rules.
//!
//! Implements single-parameter κ-Köhler theory (Petters & Kreidenweis, 2007)
//! for the wet diameter of a particle at a given relative humidity, plus the
//! volume-weighted mixing rules used to derive effective refractive indices,
//! densities, and κ values for internally mixed particles.

use num_complex::Complex64;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GrowthError {
    #[error("Relative humidity {0} % is outside the supported range [0, 100)")]
    SaturatedHumidity(f64),

    #[error("Mixing rule received {species} species but {weights} weights")]
    WeightMismatch { species: usize, weights: usize },
}

/// Calculate the wet diameter of a particle per κ-Köhler theory:
///
/// ```text
/// D_wet = D_dry · (1 + κ·a_w/(1 - a_w))^(1/3),   a_w = rh/100
/// ```
///
/// `rh` is the relative humidity in percent. At `rh = 100` the water
/// activity term diverges, so humidities outside `[0, 100)` are rejected
/// rather than propagated as infinities.
pub fn wet_diameter(diam_dry: f64, kappa: f64, rh: f64) -> Result<f64, GrowthError> {
    if !(0.0..100.0).contains(&rh) {
        return Err(GrowthError::SaturatedHumidity(rh));
    }

    let aw = rh / 100.0;
    Ok(diam_dry * (1.0 + kappa * aw / (1.0 - aw)).powf(1.0 / 3.0))
}

/// Volume fractions corresponding to a set of species diameters (d³/Σd³).
pub fn volume_weights(diams: &[f64]) -> Vec<f64> {
    let total: f64 = diams.iter().map(|d| d.powi(3)).sum();
    diams.iter().map(|d| d.powi(3) / total).collect()
}

/// Effective refractive index of an internal mixture: the real and
/// imaginary parts are volume-weighted independently.
pub fn effective_refractive_index(
    species: &[Complex64],
    weights: &[f64],
) -> Result<Complex64, GrowthError> {
    check_weights(species.len(), weights.len())?;

    let re = species.iter().zip(weights).map(|(s, w)| s.re * w).sum();
    let im = species.iter().zip(weights).map(|(s, w)| s.im * w).sum();

    Ok(Complex64::new(re, im))
}

/// Effective density of an internal mixture (volume-weighted sum).
pub fn effective_density(rho: &[f64], weights: &[f64]) -> Result<f64, GrowthError> {
    check_weights(rho.len(), weights.len())?;
    Ok(rho.iter().zip(weights).map(|(r, w)| r * w).sum())
}

/// Effective κ-Köhler coefficient of an internal mixture.
pub fn effective_kappa(kappas: &[f64], weights: &[f64]) -> Result<f64, GrowthError> {
    check_weights(kappas.len(), weights.len())?;
    Ok(kappas.iter().zip(weights).map(|(k, w)| k * w).sum())
}

fn check_weights(species: usize, weights: usize) -> Result<(), GrowthError> {
    if species != weights {
        return Err(GrowthError::WeightMismatch { species, weights });
    }
    Ok(())
}
