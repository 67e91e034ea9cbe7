//! Workbook serialization: the per-angle report block and its parser.
//!
//! The workbook is a plain-text file holding one report block per
//! analyzed angle, blocks separated by a blank line. The layout is a
//! contract: external tooling re-parses it, so the writer and parser in
//! this module must stay in lockstep.
//!
//! ```text
//! 30 - angle spectrum analysis:
//! Calibrated by equation: E(ch) = 0.050 * ch + 0.000
//!                      --Peaks analysis info--
//! Fragment state, MeV      center, MeV       fwhm, MeV          area
//!        0.000               13.044            0.300           512.000
//! ```

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const HEADER_SUFFIX: &str = " - angle spectrum analysis: ";
const EQUATION_PREFIX: &str = "Calibrated by equation: E(ch) = ";
const EQUATION_JOINER: &str = " * ch + ";
const BANNER: &str = "--Peaks analysis info--";
const BANNER_WIDTH: usize = 66;

/// One peak row of a report block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Residual excited-state energy, MeV.
    pub state: f64,
    /// Fitted center, MeV.
    pub center: f64,
    /// Fitted full width at half maximum, MeV.
    pub fwhm: f64,
    /// Fitted area.
    pub area: f64,
}

/// A parsed report block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub angle: f64,
    pub scale_value: f64,
    pub scale_shift: f64,
    pub rows: Vec<ReportRow>,
}

/// Center-pad `text` to `width` (extra padding goes to the right).
fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let left = (width - len) / 2;
    let right = width - len - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

fn round3(value: f64) -> String {
    format!("{:.3}", value)
}

/// Render one report block. Ends with a newline after the last row; no
/// trailing blank line (the writer adds the block separator).
pub fn format_report_block(
    angle: f64,
    scale_value: f64,
    scale_shift: f64,
    rows: &[ReportRow],
) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}{}\n", angle, HEADER_SUFFIX));
    out.push_str(&format!(
        "{}{}{}{}\n",
        EQUATION_PREFIX,
        round3(scale_value),
        EQUATION_JOINER,
        round3(scale_shift)
    ));
    out.push_str(&center(BANNER, BANNER_WIDTH));
    out.push('\n');
    out.push_str(&format!(
        "{}\t{}\t{}\t{}\n",
        center("Fragment state, MeV", 20),
        center("center, MeV", 15),
        center("fwhm, MeV", 15),
        center("area", 15)
    ));
    for row in rows {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\n",
            center(&round3(row.state), 20),
            center(&round3(row.center), 15),
            center(&round3(row.fwhm), 15),
            center(&round3(row.area), 15)
        ));
    }
    out
}

/// Parse a whole workbook back into records.
pub fn parse_workbook(text: &str) -> Result<Vec<ReportRecord>> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(parse_block)
        .collect()
}

fn parse_block(block: &str) -> Result<ReportRecord> {
    let malformed = |what: &str| Error::Configuration(format!("workbook block: {}", what));

    let mut lines = block.lines();
    let header = lines.next().ok_or_else(|| malformed("empty block"))?;
    let angle: f64 = header
        .split_once(" - angle spectrum analysis")
        .map(|(prefix, _)| prefix.trim())
        .ok_or_else(|| malformed("missing header line"))?
        .parse()
        .map_err(|_| malformed("unreadable angle"))?;

    let equation = lines.next().ok_or_else(|| malformed("missing equation"))?;
    let constants = equation
        .strip_prefix(EQUATION_PREFIX)
        .ok_or_else(|| malformed("missing calibration equation"))?;
    let (scale_text, shift_text) = constants
        .split_once(EQUATION_JOINER)
        .ok_or_else(|| malformed("unreadable calibration equation"))?;
    let scale_value: f64 = scale_text
        .trim()
        .parse()
        .map_err(|_| malformed("unreadable scale value"))?;
    let scale_shift: f64 = shift_text
        .trim()
        .parse()
        .map_err(|_| malformed("unreadable scale shift"))?;

    // Banner and column-header lines.
    let banner = lines.next().ok_or_else(|| malformed("missing banner"))?;
    if !banner.contains(BANNER) {
        return Err(malformed("missing peaks banner"));
    }
    lines.next().ok_or_else(|| malformed("missing table header"))?;

    let mut rows = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<f64> = line
            .split_whitespace()
            .map(|token| token.parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| malformed("unreadable peak row"))?;
        if fields.len() != 4 {
            return Err(malformed("peak row must have 4 columns"));
        }
        rows.push(ReportRow {
            state: fields[0],
            center: fields[1],
            fwhm: fields[2],
            area: fields[3],
        });
    }

    Ok(ReportRecord {
        angle,
        scale_value,
        scale_shift,
        rows,
    })
}

/// Append-only workbook file.
#[derive(Debug, Clone)]
pub struct WorkbookWriter {
    path: PathBuf,
}

impl WorkbookWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a report block, separated from any previous block by a
    /// blank line.
    pub fn append_block(&self, block: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(block.as_bytes())?;
        file.write_all(b"\n")?;
        log::info!("report block appended to {}", self.path.display());
        Ok(())
    }
}

/// Read a workbook file back into records.
pub fn read_workbook(path: &Path) -> Result<Vec<ReportRecord>> {
    let text = std::fs::read_to_string(path)?;
    parse_workbook(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rows() -> Vec<ReportRow> {
        vec![
            ReportRow {
                state: 0.0,
                center: 13.044,
                fwhm: 0.31,
                area: 512.4,
            },
            ReportRow {
                state: 2.186,
                center: 11.02,
                fwhm: 0.29,
                area: 203.7,
            },
        ]
    }

    #[test]
    fn test_block_layout() {
        let block = format_report_block(30.0, 0.05, 0.0, &sample_rows());
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("30 - angle spectrum analysis"));
        assert_eq!(lines[1], "Calibrated by equation: E(ch) = 0.050 * ch + 0.000");
        assert!(lines[2].contains("--Peaks analysis info--"));
        assert!(lines[3].contains("Fragment state, MeV"));
        assert!(lines[4].contains("13.044"));
        assert!(lines[5].contains("2.186"));
    }

    #[test]
    fn test_roundtrip_recovers_constants() {
        let block = format_report_block(30.0, 0.05173, 0.4129, &sample_rows());
        let records = parse_workbook(&block).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.angle, 30.0);
        assert!((record.scale_value - 0.05173).abs() <= 5e-4);
        assert!((record.scale_shift - 0.4129).abs() <= 5e-4);
        assert_eq!(record.rows.len(), 2);
        assert!((record.rows[1].center - 11.02).abs() <= 5e-4);
    }

    #[test]
    fn test_multiple_blocks() {
        let mut text = format_report_block(15.0, 0.05, 0.0, &sample_rows());
        text.push('\n');
        text.push_str(&format_report_block(30.0, 0.048, 0.12, &sample_rows()[..1]));
        let records = parse_workbook(&text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].angle, 15.0);
        assert_eq!(records[1].angle, 30.0);
        assert_eq!(records[1].rows.len(), 1);
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(parse_workbook("not a workbook").is_err());
        let truncated = "30 - angle spectrum analysis: \nCalibrated by equation: E(ch)";
        assert!(parse_workbook(truncated).is_err());
    }

    #[test]
    fn test_writer_appends_blocks() {
        let dir = std::env::temp_dir().join("reaction-spectra-workbook-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("workbook.txt");
        let _ = std::fs::remove_file(&path);

        let writer = WorkbookWriter::new(&path);
        writer
            .append_block(&format_report_block(15.0, 0.05, 0.0, &sample_rows()))
            .unwrap();
        writer
            .append_block(&format_report_block(30.0, 0.048, 0.1, &sample_rows()))
            .unwrap();

        let records = read_workbook(&path).unwrap();
        assert_eq!(records.len(), 2);
        std::fs::remove_file(&path).unwrap();
    }
}
