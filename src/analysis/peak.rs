//! Fitted peak parameters and the Gaussian line shape.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// 4 ln 2, the FWHM normalization constant of the Gaussian exponent.
pub(crate) const FOUR_LN_2: f64 = 2.772588722239781;

/// A fitted spectral peak: center, full width at half maximum, and area,
/// all in energy units. Width and area must be positive; violations are
/// rejected at construction so no partially-invalid peak exists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    center: f64,
    fwhm: f64,
    area: f64,
}

impl Peak {
    pub fn new(center: f64, fwhm: f64, area: f64) -> Result<Self> {
        if !fwhm.is_finite() || fwhm <= 0.0 {
            return Err(Error::Validation(format!(
                "peak fwhm must be positive, got {}",
                fwhm
            )));
        }
        if !area.is_finite() || area <= 0.0 {
            return Err(Error::Validation(format!(
                "peak area must be positive, got {}",
                area
            )));
        }
        Ok(Self { center, fwhm, area })
    }

    pub fn center(&self) -> f64 {
        self.center
    }

    pub fn fwhm(&self) -> f64 {
        self.fwhm
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    /// Peak height implied by area and width.
    pub fn amplitude(&self) -> f64 {
        amplitude_for(self.area, self.fwhm)
    }

    /// Line-shape value at `x`.
    pub fn value_at(&self, x: f64) -> f64 {
        gaussian(x, self.center, self.fwhm, self.amplitude())
    }
}

/// Gaussian in (center, fwhm, amplitude) form.
pub(crate) fn gaussian(x: f64, mu: f64, fwhm: f64, amplitude: f64) -> f64 {
    amplitude * (-FOUR_LN_2 * (x - mu) * (x - mu) / (fwhm * fwhm)).exp()
}

/// Height of a Gaussian with the given area and width.
pub(crate) fn amplitude_for(area: f64, fwhm: f64) -> f64 {
    area / (fwhm * (std::f64::consts::PI / FOUR_LN_2).sqrt())
}

/// Area of a Gaussian with the given height and width.
pub(crate) fn area_for(amplitude: f64, fwhm: f64) -> f64 {
    amplitude * fwhm * (std::f64::consts::PI / FOUR_LN_2).sqrt()
}
