//! # Engine Module
//!
//! This module implements the instrument pipeline: everything between a
//! continuous aerosol distribution and the discrete per-bin counts an OPC
//! reports.
//!
//! ## Architecture
//!
//! - **Bin Tables** ([`bins`]) - instrument size bins, generated log-uniformly
//!   or supplied explicitly, with the contiguity invariants enforced
//! - **Calibration** ([`calibration`]) - cross-section-to-bin calibration
//!   curves, monotonic dip removal, and the digitizer
//! - **Curve Fitting** ([`fit`]) - damped least-squares power-law fits used by
//!   the linear and piecewise calibration methods
//! - **The OPC Model** ([`opc`]) - the two-phase [`opc::Opc`] /
//!   [`opc::CalibratedOpc`] types with `evaluate`, `histogram`, and
//!   `integrate`
//! - **Nephelometers** ([`nephelometer`]) - integrating-scatter instruments
//!   calibrated against a reference distribution
//! - **Error Handling** ([`error`]) - engine-level error type chaining the
//!   lower layers
//!
//! ## The Two-Phase OPC
//!
//! An [`opc::Opc`] holds configuration only; calling `calibrate` consumes
//! nothing and returns a [`opc::CalibratedOpc`] carrying the calibration
//! curve. Evaluation methods exist only on the calibrated type, so
//! "evaluated before calibration" is unrepresentable rather than a runtime
//! error.

pub mod bins;
pub mod calibration;
pub mod error;
pub mod fit;
pub mod nephelometer;
pub mod opc;
