//! Mapping of theoretical peak energies onto measured channels.

use serde::{Deserialize, Serialize};

use crate::analysis::calibration::Calibration;
use crate::error::{Error, Result};

/// A theoretical peak mapped onto the spectrum.
///
/// Keeps the originating excited-state energy so survivors stay paired
/// with their states after out-of-range predictions are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictedPeak {
    /// Predicted 1-based channel.
    pub channel: usize,
    /// Residual excited-state energy (MeV) this prediction came from.
    pub state_energy: f64,
    /// Theoretical fragment energy (MeV).
    pub energy: f64,
}

/// Invert the calibration for each theoretical energy and keep the
/// predictions that land inside the buffer.
///
/// `theory` pairs (state energy, fragment energy) in excited-state order;
/// the output preserves that order. Predictions at channel <= 0 or >=
/// `buffer_len` are discarded. Fails with a state error when
/// uncalibrated.
pub fn locate_peaks(
    calibration: &Calibration,
    theory: &[(f64, f64)],
    buffer_len: usize,
) -> Result<Vec<PredictedPeak>> {
    let (scale_value, scale_shift) = calibration
        .constants()
        .ok_or(Error::State("must calibrate before locating peaks"))?;

    let survivors: Vec<PredictedPeak> = theory
        .iter()
        .filter_map(|&(state_energy, energy)| {
            let channel = ((energy - scale_shift) / scale_value).round() as i64;
            if channel <= 0 || channel >= buffer_len as i64 {
                return None;
            }
            Some(PredictedPeak {
                channel: channel as usize,
                state_energy,
                energy,
            })
        })
        .collect();

    log::debug!(
        "{} of {} theoretical peaks fall inside the {}-channel buffer",
        survivors.len(),
        theory.len(),
        buffer_len
    );
    Ok(survivors)
}
