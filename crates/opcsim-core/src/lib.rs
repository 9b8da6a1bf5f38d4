//! # opcsim Core Library
//!
//! A library for simulating the response of optical particle counters (OPCs)
//! to multi-modal lognormal aerosol size distributions, built on exact Mie
//! theory for homogeneous spheres.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless physics: the Mie scattering
//!   series (`mie`), lognormal aerosol distributions (`aerosol`), hygroscopic
//!   growth per κ-Köhler theory (`growth`), and the static table of common
//!   optical materials (`materials`).
//!
//! - **[`engine`]: The Logic Core.** This layer implements the instrument
//!   pipeline: bin tables (`bins`), scattering-cross-section calibration curves
//!   and their fitting (`calibration`, `fit`), and the two-phase OPC model
//!   (`opc`) that turns a continuous distribution into per-bin particle counts.
//!
//! - **[`workflows`]: The Public API.** The highest-level, user-facing layer. It
//!   ties the `engine` and `core` together to execute a complete simulation:
//!   build an OPC, calibrate it against a reference material, and report what
//!   the instrument "sees" for a given aerosol at a given relative humidity.

pub mod core;
pub mod engine;
pub mod workflows;
