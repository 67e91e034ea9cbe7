//! Affine channel-to-energy calibration.

use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One calibration reference: a channel matched to a known energy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// 1-based channel.
    pub channel: usize,
    /// Energy in MeV.
    pub energy: f64,
}

impl Anchor {
    pub fn new(channel: usize, energy: f64) -> Self {
        Self { channel, energy }
    }
}

/// Channel-to-energy map. Consumers match on the variant instead of
/// testing constants against sentinel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Calibration {
    Uncalibrated,
    Calibrated { scale_value: f64, scale_shift: f64 },
}

impl Calibration {
    /// Solve the affine map from two anchors.
    ///
    /// Anchors are ordered by descending channel before solving, so the
    /// caller may pass them in either order; the higher channel pairs
    /// with the higher energy. The solved scale must be positive, energy
    /// strictly increasing with channel.
    pub fn solve(first: Anchor, second: Anchor) -> Result<Self> {
        if first.channel == second.channel {
            return Err(Error::Validation(format!(
                "calibration anchors share channel {}",
                first.channel
            )));
        }
        let (high, low) = if first.channel > second.channel {
            (first, second)
        } else {
            (second, first)
        };

        let matrix = Matrix2::new(high.channel as f64, 1.0, low.channel as f64, 1.0);
        let rhs = Vector2::new(high.energy, low.energy);
        let solution = matrix
            .lu()
            .solve(&rhs)
            .ok_or_else(|| Error::Validation("calibration system is singular".into()))?;

        let (scale_value, scale_shift) = (solution[0], solution[1]);
        if scale_value <= 0.0 {
            return Err(Error::Validation(format!(
                "calibration scale must be positive, got {}",
                scale_value
            )));
        }

        log::info!(
            "calibrated: E(ch) = {:.6} * ch + {:.6}",
            scale_value,
            scale_shift
        );
        Ok(Self::Calibrated {
            scale_value,
            scale_shift,
        })
    }

    pub fn is_calibrated(&self) -> bool {
        matches!(self, Self::Calibrated { .. })
    }

    /// (scale_value, scale_shift) once calibrated.
    pub fn constants(&self) -> Option<(f64, f64)> {
        match *self {
            Self::Uncalibrated => None,
            Self::Calibrated {
                scale_value,
                scale_shift,
            } => Some((scale_value, scale_shift)),
        }
    }

    /// Energy of a 1-based channel, defined only once calibrated.
    pub fn energy_at(&self, channel: usize) -> Option<f64> {
        let (scale_value, scale_shift) = self.constants()?;
        Some(scale_value * channel as f64 + scale_shift)
    }

    /// Energies for channels `1..=len`.
    pub fn energy_view(&self, len: usize) -> Option<Vec<f64>> {
        let (scale_value, scale_shift) = self.constants()?;
        Some(
            (1..=len)
                .map(|ch| scale_value * ch as f64 + scale_shift)
                .collect(),
        )
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::Uncalibrated
    }
}
