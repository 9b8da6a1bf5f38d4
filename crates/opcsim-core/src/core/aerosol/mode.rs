use num_complex::Complex64;

/// One lognormal mode of an aerosol distribution.
///
/// Geometry is set by the number concentration `number` (particles/cm³),
/// geometric mean diameter `gm` (µm), and geometric standard deviation
/// `gsd`. Chemistry is set by the κ-Köhler coefficient `kappa`, the dry
/// density `rho` (g/cm³), and the dry complex refractive index `refr`.
/// When a distribution is queried at a non-zero relative humidity, the
/// refractive index and density are adjusted for water uptake; the stored
/// values are always the dry ones.
///
/// Modes are immutable once added to a distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct Mode {
    pub label: String,
    pub number: f64,
    pub gm: f64,
    pub gsd: f64,
    pub kappa: f64,
    pub rho: f64,
    pub refr: Complex64,
}

impl Mode {
    /// Create a mode with default chemistry: non-hygroscopic (κ = 0),
    /// unit density, and a non-absorbing refractive index of 1.5.
    pub fn new(label: impl Into<String>, number: f64, gm: f64, gsd: f64) -> Self {
        Self {
            label: label.into(),
            number,
            gm,
            gsd,
            kappa: 0.0,
            rho: 1.0,
            refr: Complex64::new(1.5, 0.0),
        }
    }

    pub fn with_kappa(mut self, kappa: f64) -> Self {
        self.kappa = kappa;
        self
    }

    pub fn with_density(mut self, rho: f64) -> Self {
        self.rho = rho;
        self
    }

    pub fn with_refractive_index(mut self, refr: Complex64) -> Self {
        self.refr = refr;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_mode_uses_dry_inert_defaults() {
        let mode = Mode::new("accumulation", 1000.0, 0.4, 1.5);

        assert_eq!(mode.kappa, 0.0);
        assert_eq!(mode.rho, 1.0);
        assert_eq!(mode.refr, Complex64::new(1.5, 0.0));
    }

    #[test]
    fn builder_methods_override_chemistry() {
        let mode = Mode::new("amm_sulf", 1000.0, 0.5, 1.5)
            .with_kappa(0.53)
            .with_density(1.77)
            .with_refractive_index(Complex64::new(1.521, 0.0));

        assert_eq!(mode.kappa, 0.53);
        assert_eq!(mode.rho, 1.77);
        assert_eq!(mode.refr, Complex64::new(1.521, 0.0));
    }
}
