//! Crate-wide error type and `Result` alias.
//!
//! Every fallible operation in the crate returns [`Result`]. The variants
//! separate caller mistakes (configuration, ordering) from physics
//! (kinematically forbidden combinations) and from numerics (fit failures,
//! invariant violations), so callers can decide what is fatal and what is
//! recoverable per peak.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Unknown isotope, unrecognized element symbol, or malformed
    /// reaction notation.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An operation was requested out of order, e.g. peak location
    /// before calibration.
    #[error("state error: {0}")]
    State(&'static str),

    /// The requested angle/state combination has no real kinematic
    /// solution (negative discriminant).
    #[error("kinematically forbidden: state {state_mev} MeV at {angle_deg} deg")]
    Forbidden { state_mev: f64, angle_deg: f64 },

    /// A peak fit failed. Recoverable: batch fitting collects these
    /// instead of aborting.
    #[error(transparent)]
    Fit(#[from] FitError),

    /// An invariant was violated at a construction boundary
    /// (non-positive fwhm/area/scale, empty spectrum, ...).
    #[error("validation error: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Peak-fit failure modes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("degenerate fit window around channel {channel}: {reason}")]
    DegenerateWindow { channel: usize, reason: String },

    #[error("fit did not converge within {iterations} iterations")]
    NoConvergence { iterations: usize },
}
