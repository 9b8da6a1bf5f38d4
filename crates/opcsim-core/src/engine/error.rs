use crate::core::aerosol::{Base, DistributionError};
use crate::core::growth::GrowthError;
use crate::engine::bins::BinError;
use crate::engine::fit::FitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unknown calibration material: '{0}'")]
    UnknownMaterial(String),

    #[error("Wavelength must be positive, got {0}")]
    InvalidWavelength(f64),

    #[error("Viewing angles must satisfy 0 <= theta1 < theta2 <= 180, got ({0}, {1})")]
    InvalidViewingAngles(f64, f64),

    #[error("Histogram base {0:?} is not supported; use Log10 or None")]
    UnsupportedBase(Base),

    #[error("Bin table error: {source}")]
    Bins {
        #[from]
        source: BinError,
    },

    #[error("Distribution query failed: {source}")]
    Distribution {
        #[from]
        source: DistributionError,
    },

    #[error("Hygroscopic growth failed: {source}")]
    Growth {
        #[from]
        source: GrowthError,
    },

    #[error("Calibration fit failed: {source}")]
    Fit {
        #[from]
        source: FitError,
    },
}
