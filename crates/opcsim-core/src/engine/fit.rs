//! Weighted power-law fitting for calibration curves.
//!
//! Both the linear and piecewise calibration methods reduce to fitting
//! `y = a * x^b` against a handful of (diameter, cross-section) points.
//! The fit is a damped Gauss-Newton (Levenberg-Marquardt) iteration on the
//! weighted residuals, seeded from an ordinary log-log regression so it
//! converges in a few steps for the well-behaved curves Mie theory
//! produces.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_ITERATIONS: usize = 200;
const CONVERGENCE_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Error, PartialEq)]
pub enum FitError {
    #[error("Need at least {needed} points to fit, got {got}")]
    TooFewPoints { needed: usize, got: usize },

    #[error("Fit did not converge within {MAX_ITERATIONS} iterations")]
    DidNotConverge,

    #[error("Normal equations are singular; the data do not constrain the fit")]
    Singular,
}

/// A fitted `y = a * x^b` relationship.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerLaw {
    pub a: f64,
    pub b: f64,
}

impl PowerLaw {
    pub fn eval(&self, x: f64) -> f64 {
        self.a * x.powf(self.b)
    }
}

/// Two power-law segments joined at a breakpoint, evaluated on the lower
/// segment for `x < breakpoint` and the upper one otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PiecewisePowerLaw {
    pub breakpoint: f64,
    pub lower: PowerLaw,
    pub upper: PowerLaw,
}

impl PiecewisePowerLaw {
    pub fn eval(&self, x: f64) -> f64 {
        if x < self.breakpoint {
            self.lower.eval(x)
        } else {
            self.upper.eval(x)
        }
    }
}

/// Seed estimate from a weighted regression of `ln y` on `ln x`.
fn log_log_seed(x: &[f64], y: &[f64], sigma: &[f64]) -> Result<PowerLaw, FitError> {
    let mut sw = 0.0;
    let mut swx = 0.0;
    let mut swy = 0.0;
    let mut swxx = 0.0;
    let mut swxy = 0.0;

    for ((&xi, &yi), &si) in x.iter().zip(y.iter()).zip(sigma.iter()) {
        let w = 1.0 / (si * si);
        let lx = xi.ln();
        let ly = yi.max(f64::MIN_POSITIVE).ln();
        sw += w;
        swx += w * lx;
        swy += w * ly;
        swxx += w * lx * lx;
        swxy += w * lx * ly;
    }

    let det = sw * swxx - swx * swx;
    if det.abs() < f64::EPSILON {
        return Err(FitError::Singular);
    }

    let b = (sw * swxy - swx * swy) / det;
    let ln_a = (swy - b * swx) / sw;
    Ok(PowerLaw { a: ln_a.exp(), b })
}

fn weighted_residuals(x: &[f64], y: &[f64], sigma: &[f64], p: PowerLaw) -> DVector<f64> {
    DVector::from_iterator(
        x.len(),
        x.iter()
            .zip(y.iter())
            .zip(sigma.iter())
            .map(|((&xi, &yi), &si)| (yi - p.eval(xi)) / si),
    )
}

fn chi_squared(x: &[f64], y: &[f64], sigma: &[f64], p: PowerLaw) -> f64 {
    weighted_residuals(x, y, sigma, p).norm_squared()
}

/// Fit `y = a * x^b` to the data, minimizing the sigma-weighted squared
/// residuals.
pub fn power_law_fit(x: &[f64], y: &[f64], sigma: &[f64]) -> Result<PowerLaw, FitError> {
    if x.len() < 2 {
        return Err(FitError::TooFewPoints {
            needed: 2,
            got: x.len(),
        });
    }
    debug_assert_eq!(x.len(), y.len());
    debug_assert_eq!(x.len(), sigma.len());

    let mut params = log_log_seed(x, y, sigma)?;
    let mut chi2 = chi_squared(x, y, sigma, params);
    let mut lambda = 1e-3;

    for _ in 0..MAX_ITERATIONS {
        // Jacobian of the weighted residuals with respect to (a, b).
        let jacobian = DMatrix::from_fn(x.len(), 2, |i, j| {
            let xb = x[i].powf(params.b);
            match j {
                0 => -xb / sigma[i],
                _ => -params.a * xb * x[i].ln() / sigma[i],
            }
        });
        let residuals = weighted_residuals(x, y, sigma, params);

        let jtj = jacobian.transpose() * &jacobian;
        let jtr = jacobian.transpose() * &residuals;

        let mut improved = false;
        for _ in 0..20 {
            let mut damped = jtj.clone();
            damped[(0, 0)] *= 1.0 + lambda;
            damped[(1, 1)] *= 1.0 + lambda;

            let Some(step) = damped.lu().solve(&(-&jtr)) else {
                return Err(FitError::Singular);
            };

            let trial = PowerLaw {
                a: params.a + step[0],
                b: params.b + step[1],
            };
            let trial_chi2 = chi_squared(x, y, sigma, trial);

            if trial_chi2 < chi2 {
                let delta = chi2 - trial_chi2;
                params = trial;
                chi2 = trial_chi2;
                lambda = (lambda * 0.1).max(1e-12);
                improved = true;

                if delta <= CONVERGENCE_TOLERANCE * chi2.max(CONVERGENCE_TOLERANCE) {
                    return Ok(params);
                }
                break;
            }
            lambda *= 10.0;
        }

        if !improved {
            // Damping saturated without improvement; the seed is already at
            // the minimum to within floating-point resolution.
            return Ok(params);
        }
    }

    Err(FitError::DidNotConverge)
}

/// Fit a two-segment power law, choosing the breakpoint that minimizes the
/// total weighted squared residual over all splits leaving at least two
/// points on each side.
pub fn piecewise_power_law_fit(
    x: &[f64],
    y: &[f64],
    sigma: &[f64],
) -> Result<PiecewisePowerLaw, FitError> {
    if x.len() < 4 {
        return Err(FitError::TooFewPoints {
            needed: 4,
            got: x.len(),
        });
    }

    let mut best: Option<(f64, PiecewisePowerLaw)> = None;

    for split in 2..=(x.len() - 2) {
        let lower = power_law_fit(&x[..split], &y[..split], &sigma[..split])?;
        let upper = power_law_fit(&x[split..], &y[split..], &sigma[split..])?;

        let cost = chi_squared(&x[..split], &y[..split], &sigma[..split], lower)
            + chi_squared(&x[split..], &y[split..], &sigma[split..], upper);

        if best.as_ref().is_none_or(|(c, _)| cost < *c) {
            best = Some((
                cost,
                PiecewisePowerLaw {
                    breakpoint: x[split],
                    lower,
                    upper,
                },
            ));
        }
    }

    best.map(|(_, fit)| fit).ok_or(FitError::Singular)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel_close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol * b.abs().max(1e-300)
    }

    fn synthetic(a: f64, b: f64, x: &[f64]) -> Vec<f64> {
        x.iter().map(|&xi| a * xi.powf(b)).collect()
    }

    #[test]
    fn recovers_exact_power_law_parameters() {
        let x: Vec<f64> = (1..=12).map(|i| 0.3 * i as f64).collect();
        let y = synthetic(2.5, 1.7, &x);
        let sigma: Vec<f64> = y.iter().map(|&yi| 10.0 * yi).collect();

        let fit = power_law_fit(&x, &y, &sigma).unwrap();
        assert!(rel_close(fit.a, 2.5, 1e-8));
        assert!(rel_close(fit.b, 1.7, 1e-8));
    }

    #[test]
    fn tolerates_mild_perturbation_of_the_data() {
        let x: Vec<f64> = (1..=10).map(|i| 0.5 * i as f64).collect();
        let mut y = synthetic(1.2, 2.1, &x);
        for (i, yi) in y.iter_mut().enumerate() {
            // Deterministic +/-1% wiggle.
            *yi *= 1.0 + 0.01 * if i % 2 == 0 { 1.0 } else { -1.0 };
        }
        let sigma: Vec<f64> = y.iter().map(|&yi| 10.0 * yi).collect();

        let fit = power_law_fit(&x, &y, &sigma).unwrap();
        assert!(rel_close(fit.a, 1.2, 0.05));
        assert!(rel_close(fit.b, 2.1, 0.05));
    }

    #[test]
    fn piecewise_fit_locates_the_breakpoint() {
        let x: Vec<f64> = (1..=16).map(|i| 0.25 * i as f64).collect();
        let y: Vec<f64> = x
            .iter()
            .map(|&xi| {
                if xi < 2.0 {
                    3.0 * xi.powf(2.0)
                } else {
                    3.0 * 2.0_f64.powf(2.0 - 0.5) * xi.powf(0.5)
                }
            })
            .collect();
        let sigma: Vec<f64> = y.iter().map(|&yi| 10.0 * yi).collect();

        let fit = piecewise_power_law_fit(&x, &y, &sigma).unwrap();
        assert!((fit.breakpoint - 2.0).abs() < 0.5);
        assert!(rel_close(fit.lower.b, 2.0, 0.05));
        assert!(rel_close(fit.upper.b, 0.5, 0.05));
    }

    #[test]
    fn piecewise_eval_uses_the_correct_segment() {
        let fit = PiecewisePowerLaw {
            breakpoint: 1.0,
            lower: PowerLaw { a: 1.0, b: 2.0 },
            upper: PowerLaw { a: 1.0, b: 0.5 },
        };
        assert!(rel_close(fit.eval(0.5), 0.25, 1e-12));
        assert!(rel_close(fit.eval(4.0), 2.0, 1e-12));
    }

    #[test]
    fn rejects_underdetermined_inputs() {
        assert_eq!(
            power_law_fit(&[1.0], &[1.0], &[1.0]).unwrap_err(),
            FitError::TooFewPoints { needed: 2, got: 1 }
        );
        assert_eq!(
            piecewise_power_law_fit(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0], &[1.0, 1.0, 1.0])
                .unwrap_err(),
            FitError::TooFewPoints { needed: 4, got: 3 }
        );
    }
}
