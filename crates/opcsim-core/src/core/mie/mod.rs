//! # Mie Scattering Module
//!
//! Exact electromagnetic scattering by a homogeneous sphere, after Bohren &
//! Huffman, *Absorption and Scattering of Light by Small Particles* (1983).
//!
//! The series is truncated at the standard size-dependent order
//! `n_c = round(2 + x + 4·x^(1/3))`, where `x = π·Dp/λ` is the dimensionless
//! size parameter. The angle-dependent functions and the logarithmic
//! derivative live in [`angular`]; the external-field coefficients, complex
//! scattering amplitudes, and the integrated scattering cross-section live in
//! [`scattering`].

pub mod angular;
pub mod scattering;

pub use angular::{angular_functions, log_derivative, series_length};
pub use scattering::{amplitudes, coefficients, scattering_cross_section, DEFAULT_ANGLE_STEPS};
