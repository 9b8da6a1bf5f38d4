//! # Aerosol Module
//!
//! Multi-modal lognormal aerosol size distributions and their closed-form
//! probability functions.
//!
//! A distribution is an ordered collection of [`Mode`]s, each a lognormal
//! characterized by a total number concentration `N`, geometric mean diameter
//! `GM`, and geometric standard deviation `GSD`, plus per-mode chemistry: a
//! hygroscopic growth coefficient κ, a dry density ρ, and a dry complex
//! refractive index. The [`AerosolDistribution`] answers `pdf` and `cdf`
//! queries for any weighting and base, optionally at a non-zero relative
//! humidity where each mode is grown per κ-Köhler theory.

pub mod distribution;
pub mod lognormal;
pub mod mode;

pub use distribution::{AerosolDistribution, DistributionError, load_distribution};
pub use mode::Mode;

use serde::{Deserialize, Serialize};

/// How a pdf/cdf query (or an OPC histogram) is weighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weight {
    Number,
    Surface,
    Volume,
    Mass,
}

/// The differential base of a pdf query: dX/dDp, dX/dlnDp, or dX/dlog10Dp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Base {
    None,
    Log,
    Log10,
}
