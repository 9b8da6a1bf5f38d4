//! # Core Module
//!
//! This module provides the stateless physics underlying the OPC simulation,
//! serving as the computational foundation of the library.
//!
//! ## Architecture
//!
//! The module is organized into specialized submodules that handle different
//! aspects of aerosol optics:
//!
//! - **Light Scattering** ([`mie`]) - Mie series coefficients, scattering
//!   amplitudes, and integrated scattering cross-sections for spheres
//! - **Size Distributions** ([`aerosol`]) - Multi-modal lognormal aerosol
//!   distributions with per-mode chemistry
//! - **Water Uptake** ([`growth`]) - Hygroscopic diameter growth and
//!   volume-weighted mixing rules (κ-Köhler theory)
//! - **Optical Constants** ([`materials`]) - Static lookup table of complex
//!   refractive indices for common aerosol materials
//!
//! ## Scientific Foundation
//!
//! The implementations follow established aerosol-science references:
//!
//! - **Mie theory** per Bohren & Huffman (1983), using the logarithmic
//!   derivative formulation with downward recurrence for numerical stability
//! - **Lognormal distributions** per Seinfeld & Pandis, *Atmospheric Chemistry
//!   and Physics* (equations 8.34/8.39 and relatives)
//! - **Hygroscopic growth** per Petters & Kreidenweis (2007) single-parameter
//!   κ-Köhler theory

pub mod aerosol;
pub mod growth;
pub mod materials;
pub mod mie;
