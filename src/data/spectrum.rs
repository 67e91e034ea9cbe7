//! Raw detector spectrum container.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Consecutive zero channels that mark the acquisition dead zone.
const DEAD_RUN: usize = 50;
/// Channels kept as a margin in front of the dead zone.
const DEAD_MARGIN: usize = 20;

/// An ordered sequence of non-negative counts, one per detector channel.
///
/// Channels are 1-based: channel `ch` holds `counts()[ch - 1]`. The buffer
/// is mutated at most once, by [`SpectrumBuffer::truncate_dead_tail`], and
/// is immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectrumBuffer {
    counts: Vec<f64>,
    truncated: bool,
}

impl SpectrumBuffer {
    pub fn new(counts: Vec<f64>) -> Result<Self> {
        if counts.is_empty() {
            return Err(Error::Validation("spectrum must not be empty".into()));
        }
        if let Some(bad) = counts.iter().find(|c| !c.is_finite() || **c < 0.0) {
            return Err(Error::Validation(format!(
                "spectrum counts must be finite and non-negative, got {}",
                bad
            )));
        }
        Ok(Self {
            counts,
            truncated: false,
        })
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    /// Count at a 1-based channel.
    pub fn count_at(&self, channel: usize) -> Option<f64> {
        if channel == 0 {
            return None;
        }
        self.counts.get(channel - 1).copied()
    }

    /// Drop the trailing acquisition dead zone.
    ///
    /// Scans for the first run of [`DEAD_RUN`] consecutive zero channels;
    /// once the run is complete the buffer is cut [`DEAD_MARGIN`] channels
    /// before the scan position and scanning stops. Only the first
    /// qualifying run acts, and a run that ends flush with the buffer end
    /// never triggers. Returns the new length when a cut was made; later
    /// calls are no-ops.
    pub fn truncate_dead_tail(&mut self) -> Option<usize> {
        if self.truncated {
            return None;
        }
        self.truncated = true;

        let mut run = 0usize;
        for index in 0..self.counts.len() {
            if run >= DEAD_RUN {
                let keep = index - DEAD_MARGIN;
                self.counts.truncate(keep);
                log::debug!("spectrum truncated to {} channels", keep);
                return Some(keep);
            }
            if self.counts[index] == 0.0 {
                run += 1;
            } else {
                run = 0;
            }
        }
        None
    }
}
