//! Calibration and peak decomposition for nuclear-reaction detector
//! spectra.
//!
//! A raw channel-indexed spectrum is trimmed of its acquisition dead
//! zone, calibrated to an energy axis from two anchor points, and
//! decomposed into reaction-product peaks whose positions come from
//! two-body kinematics. Fitted peaks are reported as workbook blocks
//! that round-trip through the parser in [`workbook`].

pub mod analysis;
pub mod data;
pub mod error;
pub mod log;
pub mod physics;
pub mod workbook;

pub use error::{Error, FitError, Result};
