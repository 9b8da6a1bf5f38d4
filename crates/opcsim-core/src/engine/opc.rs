//! The two-phase optical particle counter model.
//!
//! An [`Opc`] holds the instrument's optical configuration. Calibrating it
//! against a material produces a [`CalibratedOpc`], which owns the
//! cross-section calibration curve and exposes the evaluation surface:
//! per-bin counts, weighted histograms, and PM-style integrals.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::core::aerosol::{AerosolDistribution, Base, Weight};
use crate::core::growth;
use crate::core::materials::{self, Material};
use crate::core::mie::{DEFAULT_ANGLE_STEPS, scattering_cross_section};
use crate::engine::bins::BinTable;
use crate::engine::calibration::{CalibrationCurve, CalibrationMethod, squash_dips};
use crate::engine::error::EngineError;
use crate::engine::fit::{piecewise_power_law_fit, power_law_fit};

/// Default particle density assumed for mass weighting, in g/cm³.
const DEFAULT_RHO: f64 = 1.65;

/// Cap on the number of sub-bin boundaries used to discretize a
/// distribution during evaluation.
const MAX_EVAL_BOUNDARIES: usize = 250;

/// Optical configuration of an OPC: laser wavelength (µm), the scattering
/// collection angles (degrees), and the reported size bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpcConfig {
    pub wl: f64,
    pub theta: (f64, f64),
    pub bins: BinTable,
    pub label: Option<String>,
}

impl OpcConfig {
    pub fn new(
        wl: f64,
        theta: (f64, f64),
        bins: BinTable,
        label: Option<String>,
    ) -> Result<Self, EngineError> {
        if !(wl > 0.0) {
            return Err(EngineError::InvalidWavelength(wl));
        }
        if !(0.0 <= theta.0 && theta.0 < theta.1 && theta.1 <= 180.0) {
            return Err(EngineError::InvalidViewingAngles(theta.0, theta.1));
        }
        Ok(Self {
            wl,
            theta,
            bins,
            label,
        })
    }
}

/// An uncalibrated OPC. The only thing it can do is be calibrated; all
/// evaluation methods live on [`CalibratedOpc`], so using an instrument
/// before calibration is a type error rather than a runtime one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opc {
    config: OpcConfig,
}

impl Opc {
    pub fn new(config: OpcConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OpcConfig {
        &self.config
    }

    /// Calibrate against a material, producing the digitizer that maps a
    /// particle's scattering cross-section onto a bin.
    ///
    /// The raw curve is the cross-section computed at every bin boundary
    /// for the calibration material; the method then either smooths it in
    /// place or replaces it with a fitted power law.
    #[instrument(skip(self), fields(label = self.config.label.as_deref()))]
    pub fn calibrate(
        &self,
        material: impl Into<Material> + std::fmt::Debug,
        method: CalibrationMethod,
    ) -> Result<CalibratedOpc, EngineError> {
        let refr = match material.into() {
            Material::Named(name) => materials::refractive_index(&name)
                .ok_or(EngineError::UnknownMaterial(name))?,
            Material::Index(refr) => refr,
        };

        let edges = self.config.bins.boundaries();
        let raw: Vec<f64> = edges
            .iter()
            .map(|&dp| {
                scattering_cross_section(dp, self.config.wl, refr, self.config.theta, DEFAULT_ANGLE_STEPS)
            })
            .collect();

        let boundaries = match method {
            CalibrationMethod::Spline => squash_dips(&raw),
            CalibrationMethod::Linear => {
                let sigma: Vec<f64> = raw.iter().map(|&y| 10.0 * y).collect();
                let fit = power_law_fit(&edges, &raw, &sigma)?;
                edges.iter().map(|&dp| fit.eval(dp)).collect()
            }
            CalibrationMethod::Piecewise => {
                let sigma: Vec<f64> = raw.iter().map(|&y| 10.0 * y).collect();
                let fit = piecewise_power_law_fit(&edges, &raw, &sigma)?;
                edges.iter().map(|&dp| fit.eval(dp)).collect()
            }
        };

        info!(
            n_bins = self.config.bins.len(),
            re = refr.re,
            im = refr.im,
            "calibrated OPC"
        );

        Ok(CalibratedOpc {
            config: self.config.clone(),
            curve: CalibrationCurve {
                boundaries,
                refr,
                method,
            },
        })
    }
}

/// A calibrated OPC: configuration plus the calibration curve produced by
/// [`Opc::calibrate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibratedOpc {
    config: OpcConfig,
    curve: CalibrationCurve,
}

impl CalibratedOpc {
    pub fn config(&self) -> &OpcConfig {
        &self.config
    }

    pub fn curve(&self) -> &CalibrationCurve {
        &self.curve
    }

    /// Count the particles of a distribution into the instrument's bins.
    ///
    /// The continuous distribution is discretized into narrow log-spaced
    /// sub-bins spanning half the instrument's smallest diameter up to
    /// 10 µm; one Mie calculation per sub-bin midpoint then stands in for
    /// all of its particles. At non-zero RH each mode is grown per
    /// κ-Köhler theory and its refractive index is mixed with water by
    /// volume before the cross-sections are computed.
    pub fn evaluate(
        &self,
        distribution: &AerosolDistribution,
        rh: f64,
    ) -> Result<Vec<f64>, EngineError> {
        let span = (self.config.bins.dmin() / 2.0, 10.0);
        self.evaluate_within(distribution, rh, span)
    }

    /// [`Self::evaluate`] with an explicit sub-binning diameter span.
    #[instrument(skip(self, distribution), fields(dist = %distribution.label))]
    pub fn evaluate_within(
        &self,
        distribution: &AerosolDistribution,
        rh: f64,
        span: (f64, f64),
    ) -> Result<Vec<f64>, EngineError> {
        let ntot = distribution.cdf(0.0, 100.0, Weight::Number, None, 0.0, None)?;

        // One sub-bin per ~3 particles keeps the discretization error well
        // below the Mie resonance structure without wasting calculations
        // on sparse distributions.
        let n_edges = ((ntot / 3.0) as usize).clamp(2, MAX_EVAL_BOUNDARIES);
        let step = (span.1.log10() - span.0.log10()) / (n_edges - 1) as f64;
        let edges: Vec<f64> = (0..n_edges)
            .map(|i| 10f64.powf(span.0.log10() + step * i as f64))
            .collect();
        let diams: Vec<f64> = edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();

        let mut counts = vec![0.0; self.config.bins.len()];

        for mode in distribution.modes() {
            // Fraction of the wet particle volume that is dry core.
            let pct_dry = 1.0 / growth::wet_diameter(1.0, mode.kappa, rh)?.powi(3);
            let refr = growth::effective_refractive_index(
                &[mode.refr, materials::water()],
                &[pct_dry, 1.0 - pct_dry],
            )?;

            for (pair, &dp) in edges.windows(2).zip(diams.iter()) {
                let dn = distribution.cdf(
                    pair[0],
                    pair[1],
                    Weight::Number,
                    Some(&mode.label),
                    rh,
                    None,
                )?;

                let cscat = scattering_cross_section(
                    dp,
                    self.config.wl,
                    refr,
                    self.config.theta,
                    DEFAULT_ANGLE_STEPS,
                );

                if let Some(bin) = self.curve.digitize(cscat) {
                    counts[bin] += dn;
                }
            }
        }

        debug!(total = counts.iter().sum::<f64>(), "evaluated distribution");
        Ok(counts)
    }

    /// Per-bin histogram of what the instrument reports, weighted and
    /// normalized by bin width.
    ///
    /// `Base::Log10` divides by Δlog₁₀Dp, `Base::None` by ΔDp; the natural
    /// log base has no instrument-histogram convention and is rejected.
    /// `rho` sets the particle density for mass weighting (default 1.65
    /// g/cm³) and is ignored otherwise.
    pub fn histogram(
        &self,
        distribution: &AerosolDistribution,
        weight: Weight,
        base: Base,
        rh: f64,
        rho: Option<f64>,
    ) -> Result<Vec<f64>, EngineError> {
        let counts = self.evaluate(distribution, rh)?;
        let weighted = self.apply_weight(&counts, weight, rho);

        let widths = match base {
            Base::Log10 => self.config.bins.dlogdp(),
            Base::None => self.config.bins.ddp(),
            Base::Log => return Err(EngineError::UnsupportedBase(Base::Log)),
        };

        Ok(weighted.iter().zip(widths.iter()).map(|(v, w)| v / w).collect())
    }

    /// Integrate the instrument's view of the distribution between two
    /// diameters.
    ///
    /// Bins partially covered by `[dmin, dmax]` contribute the fraction of
    /// their width that overlaps the range, so a PM cut falling inside a
    /// bin takes a proportional share of it.
    pub fn integrate(
        &self,
        distribution: &AerosolDistribution,
        dmin: f64,
        dmax: f64,
        weight: Weight,
        rh: f64,
        rho: Option<f64>,
    ) -> Result<f64, EngineError> {
        if dmin >= dmax {
            return Err(EngineError::Distribution {
                source: crate::core::aerosol::DistributionError::InvalidDiameterRange { dmin, dmax },
            });
        }

        let counts = self.evaluate(distribution, rh)?;
        let weighted = self.apply_weight(&counts, weight, rho);

        let total = weighted
            .iter()
            .zip(self.config.bins.bins())
            .map(|(v, bin)| {
                let overlap = (dmax.min(bin.upper) - dmin.max(bin.lower)).max(0.0);
                v * (overlap / bin.width()).clamp(0.0, 1.0)
            })
            .sum();

        Ok(total)
    }

    fn apply_weight(&self, counts: &[f64], weight: Weight, rho: Option<f64>) -> Vec<f64> {
        use std::f64::consts::PI;

        let rho = rho.unwrap_or(DEFAULT_RHO);
        counts
            .iter()
            .zip(self.config.bins.midpoints())
            .map(|(&n, dp)| match weight {
                Weight::Number => n,
                Weight::Surface => PI * dp.powi(2) * n,
                Weight::Volume => PI / 6.0 * dp.powi(3) * n,
                Weight::Mass => rho * PI / 6.0 * dp.powi(3) * n,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aerosol::Mode;
    use num_complex::Complex64;

    fn ten_bin_opc() -> Opc {
        let bins = BinTable::from_bounds(0.3, 10.0, 10).unwrap();
        Opc::new(OpcConfig::new(0.658, (32.0, 88.0), bins, None).unwrap())
    }

    fn ammonium_sulfate() -> AerosolDistribution {
        let mut d = AerosolDistribution::new("amm_sulf");
        d.add_mode(
            Mode::new("mode 1", 1000.0, 0.4, 1.5)
                .with_kappa(0.53)
                .with_density(1.77)
                .with_refractive_index(Complex64::new(1.521, 0.0)),
        )
        .unwrap();
        d
    }

    #[test]
    fn config_rejects_bad_optics() {
        let bins = BinTable::from_bounds(0.5, 2.5, 5).unwrap();

        assert!(matches!(
            OpcConfig::new(0.0, (30.0, 90.0), bins.clone(), None),
            Err(EngineError::InvalidWavelength(_))
        ));
        assert!(matches!(
            OpcConfig::new(0.658, (90.0, 30.0), bins.clone(), None),
            Err(EngineError::InvalidViewingAngles(..))
        ));
        assert!(OpcConfig::new(0.658, (30.0, 190.0), bins, None).is_err());
    }

    #[test]
    fn calibrate_rejects_unknown_materials() {
        let err = ten_bin_opc()
            .calibrate("unobtainium", CalibrationMethod::Spline)
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownMaterial(_)));
    }

    #[test]
    fn spline_calibration_yields_a_monotone_enough_curve() {
        let opc = ten_bin_opc()
            .calibrate("psl", CalibrationMethod::Spline)
            .unwrap();

        let curve = opc.curve();
        assert_eq!(curve.n_bins(), 10);
        assert!(curve.boundaries.iter().all(|&v| v > 0.0));
        // cross-sections must grow strongly over a 0.3-10 µm span
        assert!(curve.boundaries[curve.boundaries.len() - 1] > curve.boundaries[0] * 1e3);
    }

    #[test]
    fn linear_calibration_is_a_pure_power_law() {
        let opc = ten_bin_opc()
            .calibrate("psl", CalibrationMethod::Linear)
            .unwrap();

        // A power law is strictly monotone, so every consecutive ratio of
        // thresholds at log-equal spacing must be identical.
        let b = &opc.curve().boundaries;
        let r0 = b[1] / b[0];
        for pair in b.windows(2) {
            assert!((pair[1] / pair[0] - r0).abs() < 1e-6 * r0);
        }
    }

    #[test]
    fn calibration_is_deterministic() {
        let a = ten_bin_opc()
            .calibrate("psl", CalibrationMethod::Spline)
            .unwrap();
        let b = ten_bin_opc()
            .calibrate("psl", CalibrationMethod::Spline)
            .unwrap();

        // bitwise identical, not approximately equal
        assert_eq!(a.curve().boundaries, b.curve().boundaries);
    }

    #[test]
    fn custom_index_calibration_matches_its_named_equivalent() {
        let named = ten_bin_opc()
            .calibrate("psl", CalibrationMethod::Spline)
            .unwrap();
        let custom = ten_bin_opc()
            .calibrate(Complex64::new(1.59, 0.0), CalibrationMethod::Spline)
            .unwrap();

        assert_eq!(named.curve().boundaries, custom.curve().boundaries);
    }

    #[test]
    fn evaluate_counts_a_reasonable_fraction_of_the_distribution() {
        let opc = ten_bin_opc()
            .calibrate("psl", CalibrationMethod::Spline)
            .unwrap();
        let d = ammonium_sulfate();

        let counts = opc.evaluate(&d, 0.0).unwrap();
        let seen: f64 = counts.iter().sum();

        assert_eq!(counts.len(), 10);
        // the instrument misses particles below its detection range, so it
        // sees some but not all of the 1000/cc
        assert!(seen > 0.0);
        assert!(seen < 1000.0);
    }

    #[test]
    fn humidity_moves_counts_into_larger_bins() {
        let opc = ten_bin_opc()
            .calibrate("psl", CalibrationMethod::Spline)
            .unwrap();
        let d = ammonium_sulfate();

        let dry = opc.evaluate(&d, 0.0).unwrap();
        let wet = opc.evaluate(&d, 90.0).unwrap();

        // hygroscopic growth shifts the distribution up in size, so the
        // instrument sees more total signal at high RH
        assert!(wet.iter().sum::<f64>() > dry.iter().sum::<f64>());
    }

    #[test]
    fn histogram_rejects_the_natural_log_base() {
        let opc = ten_bin_opc()
            .calibrate("psl", CalibrationMethod::Spline)
            .unwrap();
        let err = opc
            .histogram(&ammonium_sulfate(), Weight::Number, Base::Log, 0.0, None)
            .unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedBase(Base::Log)));
    }

    #[test]
    fn histogram_is_counts_over_bin_width() {
        let opc = ten_bin_opc()
            .calibrate("psl", CalibrationMethod::Spline)
            .unwrap();
        let d = ammonium_sulfate();

        let counts = opc.evaluate(&d, 0.0).unwrap();
        let hist = opc
            .histogram(&d, Weight::Number, Base::Log10, 0.0, None)
            .unwrap();
        let widths = opc.config().bins.dlogdp();

        for i in 0..counts.len() {
            assert!((hist[i] * widths[i] - counts[i]).abs() < 1e-9 * counts[i].max(1.0));
        }
    }

    #[test]
    fn mass_histogram_scales_linearly_with_density() {
        let opc = ten_bin_opc()
            .calibrate("psl", CalibrationMethod::Spline)
            .unwrap();
        let d = ammonium_sulfate();

        let m1 = opc
            .histogram(&d, Weight::Mass, Base::Log10, 0.0, Some(1.0))
            .unwrap();
        let m2 = opc
            .histogram(&d, Weight::Mass, Base::Log10, 0.0, Some(2.0))
            .unwrap();

        for (a, b) in m1.iter().zip(m2.iter()) {
            assert!((2.0 * a - b).abs() < 1e-9 * b.abs().max(1e-300));
        }
    }

    #[test]
    fn integrate_is_monotone_in_the_upper_cut() {
        let opc = ten_bin_opc()
            .calibrate("psl", CalibrationMethod::Spline)
            .unwrap();
        let d = ammonium_sulfate();

        let pm1 = opc.integrate(&d, 0.0, 1.0, Weight::Mass, 0.0, None).unwrap();
        let pm25 = opc.integrate(&d, 0.0, 2.5, Weight::Mass, 0.0, None).unwrap();
        let pm10 = opc
            .integrate(&d, 0.0, 10.0, Weight::Mass, 0.0, None)
            .unwrap();

        assert!(pm1 >= 0.0);
        assert!(pm25 >= pm1);
        assert!(pm10 >= pm25);
    }

    #[test]
    fn integrate_takes_a_proportional_share_of_a_split_bin() {
        let opc = ten_bin_opc()
            .calibrate("psl", CalibrationMethod::Spline)
            .unwrap();
        let d = ammonium_sulfate();

        let counts = opc.evaluate(&d, 0.0).unwrap();
        let bins = opc.config().bins.bins().to_vec();

        // cut exactly halfway through the first bin, covering nothing else
        let cut = 0.5 * (bins[0].lower + bins[0].upper);
        let partial = opc
            .integrate(&d, bins[0].lower, cut, Weight::Number, 0.0, None)
            .unwrap();

        assert!((partial - 0.5 * counts[0]).abs() < 1e-9 * counts[0].max(1.0));
    }

    #[test]
    fn integrate_rejects_inverted_ranges() {
        let opc = ten_bin_opc()
            .calibrate("psl", CalibrationMethod::Spline)
            .unwrap();
        assert!(
            opc.integrate(&ammonium_sulfate(), 2.5, 1.0, Weight::Number, 0.0, None)
                .is_err()
        );
    }
}
