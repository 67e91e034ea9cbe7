//! Per-angle analysis session and the session repository.
//!
//! A session owns everything belonging to one measured spectrum at one
//! lab angle: the (truncated) buffer, the reaction, the calibration
//! state, the fitted peaks, and the operation log. Calibration must
//! complete before peak location or fitting; that ordering is enforced
//! by an explicit state check, never by blocking.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::calibration::{Anchor, Calibration};
use crate::analysis::fitter::{fit_peak, FitSettings};
use crate::analysis::locator::{locate_peaks, PredictedPeak};
use crate::analysis::peak::Peak;
use crate::analysis::picks::PickQueue;
use crate::data::spectrum::SpectrumBuffer;
use crate::error::{Error, Result};
use crate::log::session_log::SessionLog;
use crate::physics::reaction::Reaction;
use crate::workbook::{format_report_block, ReportRow};

/// A failed peak fit inside a batch, kept alongside the successes.
#[derive(Debug)]
pub struct FitFailure {
    pub channel: usize,
    pub state_energy: f64,
    pub error: Error,
}

/// Outcome of a batch fit: every fitted peak so far plus the failures of
/// this batch.
#[derive(Debug)]
pub struct FitOutcome {
    pub peaks: Vec<Peak>,
    pub failures: Vec<FitFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSession {
    angle_deg: f64,
    spectrum: SpectrumBuffer,
    reaction: Reaction,
    calibration: Calibration,
    peaks: Vec<Peak>,
    /// Survivors of the last location pass, in excited-state order.
    predicted: Vec<PredictedPeak>,
    log: SessionLog,
}

impl AnalysisSession {
    /// Open a session: takes ownership of the raw spectrum and trims its
    /// trailing dead zone immediately.
    pub fn new(angle_deg: f64, mut spectrum: SpectrumBuffer, reaction: Reaction) -> Result<Self> {
        let mut log = SessionLog::new(format!("{} deg spectrum of {}", angle_deg, reaction));
        log.record(
            "open",
            &format!("{} channels, {}", spectrum.len(), reaction),
        );
        if let Some(keep) = spectrum.truncate_dead_tail() {
            log.record("truncate", &format!("cut to {} channels", keep));
        }

        Ok(Self {
            angle_deg,
            spectrum,
            reaction,
            calibration: Calibration::Uncalibrated,
            peaks: Vec::new(),
            predicted: Vec::new(),
            log,
        })
    }

    pub fn angle_deg(&self) -> f64 {
        self.angle_deg
    }

    pub fn spectrum(&self) -> &SpectrumBuffer {
        &self.spectrum
    }

    pub fn reaction(&self) -> &Reaction {
        &self.reaction
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Fitted peaks in fit order.
    pub fn peaks(&self) -> &[Peak] {
        &self.peaks
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    /// (excited-state energy, theoretical fragment energy) pairs for
    /// every tabulated residual state, in state order.
    pub fn theoretical_peaks(&self) -> Result<Vec<(f64, f64)>> {
        self.reaction
            .residual()
            .excited_states()?
            .iter()
            .map(|&state| {
                self.reaction
                    .fragment_energy(state, self.angle_deg)
                    .map(|energy| (state, energy))
            })
            .collect()
    }

    /// Solve the calibration from two explicit anchors. Re-invocation
    /// overwrites the previous calibration.
    pub fn calibrate(&mut self, first: Anchor, second: Anchor) -> Result<(f64, f64)> {
        self.calibration = Calibration::solve(first, second)?;
        let (scale_value, scale_shift) = self.calibration.constants().unwrap_or((0.0, 0.0));
        self.log.record(
            "calibrate",
            &format!("E(ch) = {:.3} * ch + {:.3}", scale_value, scale_shift),
        );
        Ok((scale_value, scale_shift))
    }

    /// Calibrate from two picked channels: the higher channel is matched
    /// to the ground-state peak energy, the lower to the first excited
    /// state.
    pub fn calibrate_from_channels(&mut self, first: usize, second: usize) -> Result<(f64, f64)> {
        let theory = self.theoretical_peaks()?;
        if theory.len() < 2 {
            return Err(Error::Validation(format!(
                "calibration needs two reference states, residual {} has {}",
                self.reaction.residual(),
                theory.len()
            )));
        }
        let (high, low) = if first > second {
            (first, second)
        } else {
            (second, first)
        };
        self.calibrate(
            Anchor::new(high, theory[0].1),
            Anchor::new(low, theory[1].1),
        )
    }

    /// Calibrate from the two most recent selection events in the queue.
    pub fn calibrate_from_picks(&mut self, picks: &PickQueue) -> Result<(f64, f64)> {
        let (first, second) = picks
            .latest_pair()
            .ok_or(Error::State("need two picked points to calibrate"))?;
        self.calibrate_from_channels(first.x.round() as usize, second.x.round() as usize)
    }

    /// Predicted channels for the theoretical peaks under the current
    /// calibration.
    pub fn try_find_peaks(&self) -> Result<Vec<PredictedPeak>> {
        if !self.calibration.is_calibrated() {
            return Err(Error::State("must calibrate before locating peaks"));
        }
        let theory = self.theoretical_peaks()?;
        locate_peaks(&self.calibration, &theory, self.spectrum.len())
    }

    /// Locate and fit every surviving prediction, appending successes to
    /// the session peak list. A failed fit never aborts the batch; the
    /// failures come back alongside the full current peak list.
    pub fn create_peaks(&mut self, settings: &FitSettings) -> Result<FitOutcome> {
        if !self.calibration.is_calibrated() {
            return Err(Error::State("must calibrate before creating peaks"));
        }

        let predicted = self.try_find_peaks()?;
        let mut failures = Vec::new();
        let mut fitted = Vec::new();

        for prediction in &predicted {
            match fit_peak(&self.spectrum, &self.calibration, prediction, settings) {
                Ok(peak) => {
                    self.log.record(
                        "fit peak",
                        &format!(
                            "channel {} -> center {:.3} MeV, fwhm {:.3}, area {:.3}",
                            prediction.channel,
                            peak.center(),
                            peak.fwhm(),
                            peak.area()
                        ),
                    );
                    fitted.push((*prediction, peak));
                }
                Err(error) => {
                    log::warn!(
                        "peak at channel {} failed to fit: {}",
                        prediction.channel,
                        error
                    );
                    failures.push(FitFailure {
                        channel: prediction.channel,
                        state_energy: prediction.state_energy,
                        error,
                    });
                }
            }
        }

        // Only fitted predictions stay paired with their states.
        self.predicted = fitted.iter().map(|(p, _)| *p).collect();
        self.peaks.extend(fitted.iter().map(|(_, peak)| *peak));

        Ok(FitOutcome {
            peaks: self.peaks.clone(),
            failures,
        })
    }

    /// Peaks sorted by descending center; a pure query, the canonical
    /// fit-order list is untouched.
    pub fn peaks_by_descending_center(&self) -> Vec<Peak> {
        let mut sorted = self.peaks.clone();
        sorted.sort_by(|a, b| b.center().total_cmp(&a.center()));
        sorted
    }

    /// Render the report block for this session.
    ///
    /// Peaks are paired positionally with the surviving predictions'
    /// excited states: descending centers against ascending states. The
    /// pairing is refused outright when the counts disagree.
    pub fn report(&self) -> Result<String> {
        let (scale_value, scale_shift) = self
            .calibration
            .constants()
            .ok_or(Error::State("must calibrate before reporting"))?;

        if self.peaks.len() != self.predicted.len() {
            return Err(Error::Validation(format!(
                "{} fitted peaks cannot pair with {} predictions",
                self.peaks.len(),
                self.predicted.len()
            )));
        }

        let sorted = self.peaks_by_descending_center();
        let rows: Vec<ReportRow> = sorted
            .iter()
            .zip(&self.predicted)
            .map(|(peak, prediction)| ReportRow {
                state: prediction.state_energy,
                center: peak.center(),
                fwhm: peak.fwhm(),
                area: peak.area(),
            })
            .collect();

        Ok(format_report_block(
            self.angle_deg,
            scale_value,
            scale_shift,
            &rows,
        ))
    }
}

/// Owned collection of sessions keyed by whole-degree angle, standing in
/// for whatever front end juggles several spectra at once.
#[derive(Debug, Default)]
pub struct SessionRepository {
    sessions: BTreeMap<u32, AnalysisSession>,
}

impl SessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, angle: u32, session: AnalysisSession) -> Option<AnalysisSession> {
        self.sessions.insert(angle, session)
    }

    pub fn get(&self, angle: u32) -> Option<&AnalysisSession> {
        self.sessions.get(&angle)
    }

    pub fn get_mut(&mut self, angle: u32) -> Option<&mut AnalysisSession> {
        self.sessions.get_mut(&angle)
    }

    pub fn remove(&mut self, angle: u32) -> Option<AnalysisSession> {
        self.sessions.remove(&angle)
    }

    pub fn angles(&self) -> Vec<u32> {
        self.sessions.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Concatenate every session's report block into workbook text.
    pub fn workbook_text(&self) -> Result<String> {
        let blocks: Vec<String> = self
            .sessions
            .values()
            .map(|session| session.report())
            .collect::<Result<_>>()?;
        Ok(blocks.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::peak::{amplitude_for, gaussian};
    use crate::physics::nuclide::Nuclide;

    // d + 7Li -> t + 6Li at 14.5 MeV, detector at 15 degrees.
    fn reaction() -> Reaction {
        Reaction::new(
            Nuclide::new(1, 2).unwrap(),
            Nuclide::new(3, 7).unwrap(),
            Nuclide::new(1, 3).unwrap(),
            14.5,
        )
        .unwrap()
    }

    /// A spectrum carrying a synthetic Gaussian at every channel the
    /// calibration E(ch) = scale * ch predicts for the reaction's states.
    fn synthetic_session(scale: f64, channels: usize, fwhm: f64) -> AnalysisSession {
        let reaction = reaction();
        let angle = 15.0;
        let states = reaction.residual().excited_states().unwrap();

        // A unit baseline keeps the dead-zone truncation out of the way.
        let mut counts = vec![1.0; channels];
        for &state in states {
            let energy = match reaction.fragment_energy(state, angle) {
                Ok(e) => e,
                Err(_) => continue,
            };
            let channel = (energy / scale).round();
            if channel < 1.0 || channel >= channels as f64 {
                continue;
            }
            let amplitude = amplitude_for(300.0, fwhm);
            for (slot, count) in counts.iter_mut().enumerate() {
                let x = scale * (slot + 1) as f64;
                *count += gaussian(x, energy, fwhm, amplitude);
            }
        }

        let spectrum = SpectrumBuffer::new(counts).unwrap();
        AnalysisSession::new(angle, spectrum, reaction).unwrap()
    }

    fn calibrate_synthetic(session: &mut AnalysisSession, scale: f64) -> (f64, f64) {
        let theory = session.theoretical_peaks().unwrap();
        let first = Anchor::new((theory[0].1 / scale).round() as usize, theory[0].1);
        let second = Anchor::new((theory[1].1 / scale).round() as usize, theory[1].1);
        session.calibrate(first, second).unwrap()
    }

    #[test]
    fn test_operations_require_calibration() {
        let session = synthetic_session(0.01, 1600, 0.08);
        assert!(matches!(session.try_find_peaks(), Err(Error::State(_))));

        let mut session = synthetic_session(0.01, 1600, 0.08);
        assert!(matches!(
            session.create_peaks(&FitSettings::default()),
            Err(Error::State(_))
        ));
        assert!(matches!(session.report(), Err(Error::State(_))));
    }

    #[test]
    fn test_full_analysis_pass() {
        let scale = 0.01;
        let fwhm = 0.08;
        let mut session = synthetic_session(scale, 1600, fwhm);
        calibrate_synthetic(&mut session, scale);

        let predicted = session.try_find_peaks().unwrap();
        assert!(predicted.len() >= 2);

        let settings = FitSettings {
            expected_fwhm: fwhm,
            ..FitSettings::default()
        };
        let outcome = session.create_peaks(&settings).unwrap();
        assert_eq!(outcome.peaks.len(), predicted.len());
        assert!(outcome.failures.is_empty());

        // Each fitted center sits within a percent of its prediction.
        for (peak, prediction) in outcome.peaks.iter().zip(&predicted) {
            assert!(
                (peak.center() - prediction.energy).abs() / prediction.energy < 0.01,
                "center {} vs predicted {}",
                peak.center(),
                prediction.energy
            );
        }
    }

    #[test]
    fn test_report_pairs_states_with_descending_centers() {
        let scale = 0.01;
        let mut session = synthetic_session(scale, 1600, 0.08);
        calibrate_synthetic(&mut session, scale);
        let settings = FitSettings {
            expected_fwhm: 0.08,
            ..FitSettings::default()
        };
        session.create_peaks(&settings).unwrap();

        let report = session.report().unwrap();
        let records = crate::workbook::parse_workbook(&report).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];

        // Ascending states pair with descending centers.
        for pair in record.rows.windows(2) {
            assert!(pair[0].state < pair[1].state);
            assert!(pair[0].center > pair[1].center);
        }
        // Formatting is a pure query: the canonical list keeps fit order.
        assert_eq!(session.peaks().len(), record.rows.len());
    }

    #[test]
    fn test_report_roundtrip_recovers_calibration() {
        let scale = 0.01;
        let mut session = synthetic_session(scale, 1600, 0.08);
        let (scale_value, scale_shift) = calibrate_synthetic(&mut session, scale);
        let settings = FitSettings {
            expected_fwhm: 0.08,
            ..FitSettings::default()
        };
        session.create_peaks(&settings).unwrap();

        let report = session.report().unwrap();
        let record = &crate::workbook::parse_workbook(&report).unwrap()[0];
        assert!((record.scale_value - scale_value).abs() <= 5e-4);
        assert!((record.scale_shift - scale_shift).abs() <= 5e-4);
    }

    #[test]
    fn test_calibrate_from_picks() {
        let scale = 0.01;
        let mut session = synthetic_session(scale, 1600, 0.08);
        let theory = session.theoretical_peaks().unwrap();

        let mut picks = PickQueue::new();
        picks.push((theory[1].1 / scale).round(), 40.0);
        picks.push((theory[0].1 / scale).round(), 90.0);
        let (scale_value, _) = session.calibrate_from_picks(&picks).unwrap();
        assert!((scale_value - scale).abs() / scale < 0.01);
    }

    #[test]
    fn test_recalibration_overwrites() {
        let mut session = synthetic_session(0.01, 1600, 0.08);
        session
            .calibrate(Anchor::new(100, 5.0), Anchor::new(200, 10.0))
            .unwrap();
        let (scale_value, _) = session
            .calibrate(Anchor::new(100, 4.0), Anchor::new(200, 12.0))
            .unwrap();
        assert!((scale_value - 0.08).abs() < 1e-12);
    }

    #[test]
    fn test_repository_owns_sessions() {
        let mut repo = SessionRepository::new();
        assert!(repo.is_empty());
        repo.insert(15, synthetic_session(0.01, 1600, 0.08));
        repo.insert(30, synthetic_session(0.01, 1600, 0.08));
        assert_eq!(repo.angles(), vec![15, 30]);
        assert!(repo.get(15).is_some());
        assert!(repo.get(45).is_none());
        assert!(repo.remove(30).is_some());
        assert_eq!(repo.len(), 1);
    }
}
