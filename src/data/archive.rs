//! On-disk spectrum archive: one text file of counts per detector angle.
//!
//! A measurement directory holds files named `<angle>.txt`, one count per
//! line (or whitespace-separated), angle in whole degrees. The archive
//! only surveys and loads; it never writes.

use std::path::{Path, PathBuf};

use crate::data::spectrum::SpectrumBuffer;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct SpectrumArchive {
    dir: PathBuf,
}

impl SpectrumArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Angles with a spectrum file present, ascending. Files whose stem
    /// is not a whole-degree angle are ignored.
    pub fn angles(&self) -> Result<Vec<u32>> {
        let mut angles = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            if let Some(angle) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u32>().ok())
            {
                angles.push(angle);
            }
        }
        angles.sort_unstable();
        Ok(angles)
    }

    /// Load the spectrum measured at an angle.
    pub fn load(&self, angle: u32) -> Result<SpectrumBuffer> {
        let path = self.dir.join(format!("{}.txt", angle));
        let text = std::fs::read_to_string(&path).map_err(|e| {
            Error::Configuration(format!("no spectrum for {} deg: {}", angle, e))
        })?;

        let counts: Vec<f64> = text
            .split_whitespace()
            .map(|token| {
                token.parse::<f64>().map_err(|_| {
                    Error::Configuration(format!(
                        "{}: unreadable count {:?}",
                        path.display(),
                        token
                    ))
                })
            })
            .collect::<Result<_>>()?;

        log::info!("loaded {} channels from {}", counts.len(), path.display());
        SpectrumBuffer::new(counts)
    }
}
