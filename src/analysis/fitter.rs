//! Nonlinear least-squares peak fitting.
//!
//! A Gaussian line shape is fit to a window of (energy, count) samples
//! around a predicted channel with damped Gauss-Newton (Levenberg-
//! Marquardt) iteration. The normal equations are solved per step via LU
//! decomposition; a step is accepted only when it lowers the residual
//! sum of squares, otherwise the damping is raised and the step retried.

use nalgebra::{DMatrix, DVector};

use crate::analysis::calibration::Calibration;
use crate::analysis::locator::PredictedPeak;
use crate::analysis::peak::{area_for, gaussian, Peak, FOUR_LN_2};
use crate::data::spectrum::SpectrumBuffer;
use crate::error::{Error, FitError, Result};

/// log10(2): a Gaussian falls to a tenth of its height about
/// fwhm / log10(2) wide, which sets the fit-window span.
const LOG10_TWO: f64 = 0.30102999566398120;

/// Fewest window samples a three-parameter fit is attempted on.
const MIN_WINDOW_SAMPLES: usize = 5;

/// Damping escalations tried per iteration before giving up on a step.
const MAX_DAMPING_RETRIES: usize = 16;

#[derive(Debug, Clone, Copy)]
pub struct FitSettings {
    /// Expected instrumental FWHM in MeV; sets the window span and the
    /// initial width guess.
    pub expected_fwhm: f64,
    /// Iteration cap of the nonlinear solver.
    pub max_iterations: usize,
    /// Relative step-size tolerance for convergence.
    pub tolerance: f64,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            expected_fwhm: 0.2,
            max_iterations: 100,
            tolerance: 1e-9,
        }
    }
}

/// Fit one Gaussian to the window around a predicted channel.
///
/// The window spans the tenth-height width of the expected instrumental
/// line shape, converted to channels through the calibration scale, and
/// both edges are clamped to the buffer. Degenerate windows and
/// non-convergence are fit errors; a non-physical result (non-positive
/// amplitude) is a validation error from `Peak::new`.
pub fn fit_peak(
    spectrum: &SpectrumBuffer,
    calibration: &Calibration,
    predicted: &PredictedPeak,
    settings: &FitSettings,
) -> Result<Peak> {
    let (scale_value, _) = calibration
        .constants()
        .ok_or(Error::State("must calibrate before fitting peaks"))?;
    if settings.expected_fwhm <= 0.0 {
        return Err(Error::Validation(format!(
            "expected fwhm must be positive, got {}",
            settings.expected_fwhm
        )));
    }

    let channel = predicted.channel;
    if channel == 0 || channel > spectrum.len() {
        return Err(FitError::DegenerateWindow {
            channel,
            reason: "outside the buffer".into(),
        }
        .into());
    }
    let tenth_width_channels = settings.expected_fwhm / LOG10_TWO / scale_value;
    let half = (tenth_width_channels / 2.0).ceil() as usize;

    let lo = channel.saturating_sub(half).max(1);
    let hi = (channel + half).min(spectrum.len());
    let samples = hi + 1 - lo;
    if samples < MIN_WINDOW_SAMPLES {
        return Err(FitError::DegenerateWindow {
            channel,
            reason: format!("{} samples", samples),
        }
        .into());
    }

    let xs: Vec<f64> = (lo..=hi)
        .map(|ch| calibration.energy_at(ch).unwrap_or(f64::NAN))
        .collect();
    let ys: Vec<f64> = (lo..=hi)
        .map(|ch| spectrum.count_at(ch).unwrap_or(0.0))
        .collect();

    if ys.iter().all(|&y| y == 0.0) {
        return Err(FitError::DegenerateWindow {
            channel,
            reason: "window holds no counts".into(),
        }
        .into());
    }

    let (mu, fwhm, amplitude) = fit_gaussian(&xs, &ys, settings)?;
    Peak::new(mu, fwhm, area_for(amplitude, fwhm))
}

/// Levenberg-Marquardt fit of (mu, fwhm, amplitude) to the samples.
///
/// Initial guesses come from the data itself: the maximum sample and its
/// position, and the half-maximum crossing width (falling back to the
/// expected instrumental width).
pub fn fit_gaussian(
    xs: &[f64],
    ys: &[f64],
    settings: &FitSettings,
) -> std::result::Result<(f64, f64, f64), FitError> {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len();

    let peak_idx = ys
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let amp0 = ys[peak_idx];
    let mu0 = xs[peak_idx];
    let fwhm0 = estimate_fwhm(xs, ys, peak_idx).unwrap_or(settings.expected_fwhm);

    let mut params = DVector::from_vec(vec![mu0, fwhm0, amp0]);
    let mut sse = sum_of_squares(xs, ys, &params);
    let mut lambda = 1e-3;

    for iteration in 0..settings.max_iterations {
        let jacobian = jacobian_at(xs, &params);
        let residuals = residuals_at(xs, ys, &params);
        let normal = jacobian.transpose() * &jacobian;
        let gradient = jacobian.transpose() * &residuals;

        let mut accepted = false;
        for _ in 0..MAX_DAMPING_RETRIES {
            let mut damped = normal.clone();
            for k in 0..3 {
                damped[(k, k)] += lambda * normal[(k, k)].max(1e-12);
            }

            let step = match damped.lu().solve(&gradient) {
                Some(step) => step,
                None => {
                    lambda *= 10.0;
                    continue;
                }
            };

            let trial = &params + &step;
            let trial_sse = sum_of_squares(xs, ys, &trial);
            if trial_sse.is_finite() && trial_sse < sse && trial[1].abs() > 1e-12 {
                let converged = step.norm() <= settings.tolerance * (1.0 + params.norm());
                params = trial;
                sse = trial_sse;
                lambda = (lambda * 0.1).max(1e-14);
                accepted = true;
                if converged {
                    return Ok((params[0], params[1].abs(), params[2]));
                }
                break;
            }
            lambda *= 10.0;
        }

        if !accepted {
            // No downhill step exists: either we sit at the minimum or
            // the problem is hopeless.
            let flat = gradient.norm() <= 1e-10 * (1.0 + sse) || sse <= 1e-18 * n as f64;
            if flat {
                return Ok((params[0], params[1].abs(), params[2]));
            }
            return Err(FitError::NoConvergence {
                iterations: iteration + 1,
            });
        }
    }

    Err(FitError::NoConvergence {
        iterations: settings.max_iterations,
    })
}

/// Half-maximum crossing width around the window maximum.
fn estimate_fwhm(xs: &[f64], ys: &[f64], peak_idx: usize) -> Option<f64> {
    let half_max = ys[peak_idx] / 2.0;
    if half_max <= 0.0 {
        return None;
    }

    let mut left = peak_idx;
    while left > 0 && ys[left] > half_max {
        left -= 1;
    }
    let mut right = peak_idx;
    while right + 1 < ys.len() && ys[right] > half_max {
        right += 1;
    }

    let width = xs[right] - xs[left];
    (width > 0.0).then_some(width)
}

fn residuals_at(xs: &[f64], ys: &[f64], params: &DVector<f64>) -> DVector<f64> {
    let (mu, fwhm, amp) = (params[0], params[1], params[2]);
    DVector::from_iterator(
        xs.len(),
        xs.iter()
            .zip(ys)
            .map(|(&x, &y)| y - gaussian(x, mu, fwhm, amp)),
    )
}

fn jacobian_at(xs: &[f64], params: &DVector<f64>) -> DMatrix<f64> {
    let (mu, fwhm, amp) = (params[0], params[1], params[2]);
    DMatrix::from_fn(xs.len(), 3, |row, col| {
        let x = xs[row];
        let shape = (-FOUR_LN_2 * (x - mu) * (x - mu) / (fwhm * fwhm)).exp();
        match col {
            0 => amp * shape * 2.0 * FOUR_LN_2 * (x - mu) / (fwhm * fwhm),
            1 => amp * shape * 2.0 * FOUR_LN_2 * (x - mu) * (x - mu) / (fwhm * fwhm * fwhm),
            _ => shape,
        }
    })
}

fn sum_of_squares(xs: &[f64], ys: &[f64], params: &DVector<f64>) -> f64 {
    residuals_at(xs, ys, params).norm_squared()
}
