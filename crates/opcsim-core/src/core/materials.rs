//! Optical constants for common aerosol materials.
//!
//! The refractive indices below are representative visible-band values taken
//! from the aerosol literature. Since the refractive index is wavelength
//! dependent, OPCs operating far from ~650 nm should be calibrated with a
//! user-supplied value instead of the table entry.

use num_complex::Complex64;
use phf::{Map, phf_map};

/// Density of water at STP in g/cm³.
pub const RHO_H2O: f64 = 0.997;

static REFRACTIVE_INDICES: Map<&'static str, (f64, f64)> = phf_map! {
    "psl" => (1.59, 0.0),
    "ammonium_sulfate" => (1.521, 0.0),
    "sodium_chloride" => (1.5405, 0.0),
    "sodium_nitrate" => (1.448, 0.0),
    "black_carbon" => (1.95, 0.79),
    "sulfuric_acid" => (1.427, 0.0),
    "soa" => (1.4, 0.002),
    "h2o" => (1.333, 0.0),
    "urban_low" => (1.6, 0.034),
    "urban_high" => (1.73, 0.086),
};

/// Look up the complex refractive index of a named material. Lookups are
/// case-insensitive; `None` means the material is not in the table.
pub fn refractive_index(name: &str) -> Option<Complex64> {
    REFRACTIVE_INDICES
        .get(name.to_ascii_lowercase().as_str())
        .map(|&(re, im)| Complex64::new(re, im))
}

/// Refractive index of water, the wet component of every internal mixture.
pub fn water() -> Complex64 {
    Complex64::new(1.333, 0.0)
}

/// A calibration material: either a named entry in the lookup table or a
/// user-supplied complex refractive index.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Named(String),
    Index(Complex64),
}

impl From<&str> for Material {
    fn from(name: &str) -> Self {
        Material::Named(name.to_string())
    }
}

impl From<Complex64> for Material {
    fn from(refr: Complex64) -> Self {
        Material::Index(refr)
    }
}

impl From<f64> for Material {
    fn from(re: f64) -> Self {
        // a bare real index is treated as non-absorbing
        Material::Index(Complex64::new(re, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(refractive_index("PSL"), Some(Complex64::new(1.59, 0.0)));
        assert_eq!(refractive_index("psl"), Some(Complex64::new(1.59, 0.0)));
    }

    #[test]
    fn unknown_material_returns_none() {
        assert_eq!(refractive_index("unobtainium"), None);
    }

    #[test]
    fn absorbing_materials_carry_an_imaginary_part() {
        let bc = refractive_index("black_carbon").unwrap();
        assert!(bc.im > 0.0);
    }

    #[test]
    fn bare_real_material_converts_to_a_non_absorbing_index() {
        let m = Material::from(1.5);
        assert_eq!(m, Material::Index(Complex64::new(1.5, 0.0)));
    }
}
