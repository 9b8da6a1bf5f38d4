//! # Workflows Module
//!
//! High-level orchestration over the core and engine layers. The single
//! entry point, [`simulate`], runs the whole pipeline for one instrument
//! and one distribution: calibrate, count, histogram, and integrate the
//! standard PM cuts.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::core::aerosol::{AerosolDistribution, Base, Weight};
use crate::core::materials::Material;
use crate::engine::calibration::CalibrationMethod;
use crate::engine::error::EngineError;
use crate::engine::opc::{CalibratedOpc, Opc, OpcConfig};

/// Everything one simulation run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpcResponse {
    /// Particle counts per instrument bin, in cm⁻³.
    pub bin_counts: Vec<f64>,
    /// Number histogram, dN/dlog₁₀Dp.
    pub dn_dlogdp: Vec<f64>,
    /// PM1 mass estimate in µg/m³.
    pub pm1: f64,
    /// PM2.5 mass estimate in µg/m³.
    pub pm25: f64,
    /// PM10 mass estimate in µg/m³.
    pub pm10: f64,
}

/// Calibrate an OPC and evaluate it against a distribution in one step.
///
/// `rho` overrides the density used for the PM mass integrals; when `None`
/// the engine default applies.
#[instrument(skip(config, distribution), fields(dist = %distribution.label))]
pub fn simulate(
    config: OpcConfig,
    material: impl Into<Material> + std::fmt::Debug,
    method: CalibrationMethod,
    distribution: &AerosolDistribution,
    rh: f64,
    rho: Option<f64>,
) -> Result<OpcResponse, EngineError> {
    let opc = Opc::new(config).calibrate(material, method)?;
    let response = respond(&opc, distribution, rh, rho)?;

    info!(
        pm1 = response.pm1,
        pm25 = response.pm25,
        pm10 = response.pm10,
        "simulation complete"
    );
    Ok(response)
}

/// The evaluation half of [`simulate`], for callers that reuse one
/// calibrated instrument across many distributions or humidities.
pub fn respond(
    opc: &CalibratedOpc,
    distribution: &AerosolDistribution,
    rh: f64,
    rho: Option<f64>,
) -> Result<OpcResponse, EngineError> {
    let bin_counts = opc.evaluate(distribution, rh)?;
    let dn_dlogdp = opc.histogram(distribution, Weight::Number, Base::Log10, rh, rho)?;

    let pm1 = opc.integrate(distribution, 0.0, 1.0, Weight::Mass, rh, rho)?;
    let pm25 = opc.integrate(distribution, 0.0, 2.5, Weight::Mass, rh, rho)?;
    let pm10 = opc.integrate(distribution, 0.0, 10.0, Weight::Mass, rh, rho)?;

    Ok(OpcResponse {
        bin_counts,
        dn_dlogdp,
        pm1,
        pm25,
        pm10,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aerosol::load_distribution;
    use crate::engine::bins::BinTable;

    fn config() -> OpcConfig {
        let bins = BinTable::from_bounds(0.38, 10.0, 12).unwrap();
        OpcConfig::new(0.658, (32.0, 88.0), bins, Some("test-opc".to_string())).unwrap()
    }

    #[test]
    fn simulate_runs_the_full_pipeline_for_a_sample_distribution() {
        let d = load_distribution("urban").unwrap();
        let response =
            simulate(config(), "psl", CalibrationMethod::Spline, &d, 0.0, None).unwrap();

        assert_eq!(response.bin_counts.len(), 12);
        assert_eq!(response.dn_dlogdp.len(), 12);
        assert!(response.pm1 >= 0.0);
        assert!(response.pm25 >= response.pm1);
        assert!(response.pm10 >= response.pm25);
    }

    #[test]
    fn respond_reuses_a_calibration_across_humidities() {
        let mut d = AerosolDistribution::new("amm_sulf");
        d.add_mode(
            crate::core::aerosol::Mode::new("mode 1", 1000.0, 0.4, 1.5)
                .with_kappa(0.53)
                .with_density(1.77),
        )
        .unwrap();

        let opc = Opc::new(config())
            .calibrate("psl", CalibrationMethod::Spline)
            .unwrap();

        let dry = respond(&opc, &d, 0.0, None).unwrap();
        let wet = respond(&opc, &d, 85.0, None).unwrap();

        assert!(wet.pm25 > dry.pm25);
    }

    #[test]
    fn simulate_propagates_calibration_failures() {
        let d = load_distribution("urban").unwrap();
        let err = simulate(
            config(),
            "unobtainium",
            CalibrationMethod::Spline,
            &d,
            0.0,
            None,
        )
        .unwrap_err();

        assert!(matches!(err, EngineError::UnknownMaterial(_)));
    }
}
