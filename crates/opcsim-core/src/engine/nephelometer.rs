//! Integrating nephelometer model.
//!
//! Unlike an OPC, a nephelometer reports a single scattered-light signal
//! integrated over the whole distribution. Calibration records the ratio
//! of that signal to the PM1/PM2.5/PM10 mass of a reference distribution;
//! evaluation divides a new distribution's signal by those ratios to
//! produce the PM estimates the instrument would report.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::core::aerosol::{AerosolDistribution, Weight};
use crate::core::growth;
use crate::core::materials;
use crate::core::mie::{DEFAULT_ANGLE_STEPS, scattering_cross_section};
use crate::engine::error::EngineError;

/// Sub-bins used per mode when summing scattered light.
const SUM_BOUNDARIES: usize = 100;

/// What a calibrated nephelometer reports for one distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NephelometerReading {
    /// Total scattered signal, in cm².
    pub cscat: f64,
    /// PM1 estimate in µg/m³.
    pub pm1: f64,
    /// PM2.5 estimate in µg/m³.
    pub pm25: f64,
    /// PM10 estimate in µg/m³.
    pub pm10: f64,
}

/// An uncalibrated nephelometer: wavelength (µm) and viewing-angle span
/// (degrees). Wide angle ranges like the default (7°, 173°) approximate
/// total-scatter integration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Nephelometer {
    pub wl: f64,
    pub theta: (f64, f64),
}

impl Nephelometer {
    pub fn new(wl: f64, theta: (f64, f64)) -> Result<Self, EngineError> {
        if !(wl > 0.0) {
            return Err(EngineError::InvalidWavelength(wl));
        }
        if !(0.0 <= theta.0 && theta.0 < theta.1 && theta.1 <= 180.0) {
            return Err(EngineError::InvalidViewingAngles(theta.0, theta.1));
        }
        Ok(Self { wl, theta })
    }

    /// Calibrate against a reference distribution, recording the
    /// signal-to-mass ratios for each PM cut.
    #[instrument(skip(self, distribution), fields(dist = %distribution.label))]
    pub fn calibrate(
        &self,
        distribution: &AerosolDistribution,
        rh: f64,
    ) -> Result<CalibratedNephelometer, EngineError> {
        let pm1 = distribution.cdf(0.0, 1.0, Weight::Mass, None, 0.0, None)?;
        let pm25 = distribution.cdf(0.0, 2.5, Weight::Mass, None, 0.0, None)?;
        let pm10 = distribution.cdf(0.0, 10.0, Weight::Mass, None, 0.0, None)?;

        let total = self.sum_across_distribution(distribution, rh)?;

        info!(total, "calibrated nephelometer");

        Ok(CalibratedNephelometer {
            instrument: *self,
            pm1_ratio: total / pm1,
            pm25_ratio: total / pm25,
            pm10_ratio: total / pm10,
        })
    }

    /// Total scattered light across a distribution: each mode is grown per
    /// κ-Köhler theory, its refractive index mixed with water by volume,
    /// and its sub-binned counts multiplied by the per-diameter
    /// cross-sections.
    fn sum_across_distribution(
        &self,
        distribution: &AerosolDistribution,
        rh: f64,
    ) -> Result<f64, EngineError> {
        let mut total = 0.0;

        for mode in distribution.modes() {
            let gm_wet = growth::wet_diameter(mode.gm, mode.kappa, rh)?;
            let pct_dry = mode.gm.powi(3) / gm_wet.powi(3);
            let refr = growth::effective_refractive_index(
                &[mode.refr, materials::water()],
                &[pct_dry, 1.0 - pct_dry],
            )?;

            // four geometric standard deviations either side of the wet GM
            // capture essentially all of the mode
            let lo = (gm_wet / mode.gsd.powi(4)).log10();
            let hi = (gm_wet * mode.gsd.powi(4)).log10();
            let step = (hi - lo) / (SUM_BOUNDARIES - 1) as f64;
            let edges: Vec<f64> = (0..SUM_BOUNDARIES)
                .map(|i| 10f64.powf(lo + step * i as f64))
                .collect();

            for pair in edges.windows(2) {
                let dn = distribution.cdf(
                    pair[0],
                    pair[1],
                    Weight::Number,
                    Some(&mode.label),
                    rh,
                    None,
                )?;
                let dp = 0.5 * (pair[0] + pair[1]);
                total += dn
                    * scattering_cross_section(dp, self.wl, refr, self.theta, DEFAULT_ANGLE_STEPS);
            }
        }

        Ok(total)
    }
}

/// A calibrated nephelometer carrying the signal-to-mass ratios from its
/// reference distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibratedNephelometer {
    instrument: Nephelometer,
    pm1_ratio: f64,
    pm25_ratio: f64,
    pm10_ratio: f64,
}

impl CalibratedNephelometer {
    pub fn instrument(&self) -> &Nephelometer {
        &self.instrument
    }

    /// Evaluate a distribution: total scattered signal plus the PM values
    /// implied by the calibration ratios.
    pub fn evaluate(
        &self,
        distribution: &AerosolDistribution,
        rh: f64,
    ) -> Result<NephelometerReading, EngineError> {
        let cscat = self
            .instrument
            .sum_across_distribution(distribution, rh)?;

        Ok(NephelometerReading {
            cscat,
            pm1: cscat / self.pm1_ratio,
            pm25: cscat / self.pm25_ratio,
            pm10: cscat / self.pm10_ratio,
        })
    }
}
