//! reaction-spectra — analyze one measured spectrum end to end.
//!
//! Loads `<angle>.txt` from the spectrum directory, builds the reaction
//! from its textual notation, calibrates from two anchor channels,
//! fits the predicted peaks, and appends the report block to the
//! workbook.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use reaction_spectra::analysis::fitter::FitSettings;
use reaction_spectra::analysis::session::AnalysisSession;
use reaction_spectra::data::archive::SpectrumArchive;
use reaction_spectra::physics::notation;
use reaction_spectra::workbook::WorkbookWriter;

#[derive(Parser)]
#[command(
    name = "reaction-spectra",
    version,
    about = "Calibrate a reaction spectrum and fit its kinematic peaks"
)]
struct Cli {
    /// Directory with <angle>.txt spectrum files
    #[arg(short, long)]
    dir: PathBuf,

    /// Reaction notation, e.g. "Li7(d,t)Li6" or "Li7 + d -> Li6 + t"
    #[arg(short, long)]
    reaction: String,

    /// Beam energy in MeV
    #[arg(short, long)]
    energy: f64,

    /// Detector angle in degrees; must match a file in --dir
    #[arg(short, long)]
    angle: u32,

    /// Two anchor channels "ch1,ch2"; the higher channel is matched to
    /// the ground-state peak, the lower to the first excited state
    #[arg(long)]
    anchors: String,

    /// Expected instrumental FWHM in MeV
    #[arg(long, default_value_t = 0.2)]
    fwhm: f64,

    /// Workbook file the report block is appended to
    #[arg(short, long, default_value = "workbook.txt")]
    workbook: PathBuf,

    /// Print the session operation log afterwards
    #[arg(long, default_value_t = false)]
    show_log: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> reaction_spectra::Result<()> {
    let archive = SpectrumArchive::new(&cli.dir);
    let available = archive.angles()?;
    log::info!("angles available: {:?}", available);

    let spectrum = archive.load(cli.angle)?;
    let reaction = notation::parse(&cli.reaction, cli.energy)?;
    let mut session = AnalysisSession::new(cli.angle as f64, spectrum, reaction)?;

    let (first, second) = parse_anchor_channels(&cli.anchors)?;
    session.calibrate_from_channels(first, second)?;

    let settings = FitSettings {
        expected_fwhm: cli.fwhm,
        ..FitSettings::default()
    };
    let outcome = session.create_peaks(&settings)?;
    for failure in &outcome.failures {
        log::warn!(
            "state {:.3} MeV at channel {} not fitted: {}",
            failure.state_energy,
            failure.channel,
            failure.error
        );
    }
    log::info!("{} peaks fitted", outcome.peaks.len());

    let report = session.report()?;
    print!("{}", report);

    WorkbookWriter::new(&cli.workbook).append_block(&report)?;

    if cli.show_log {
        print!("\n{}", session.log().to_text());
    }
    Ok(())
}

fn parse_anchor_channels(text: &str) -> reaction_spectra::Result<(usize, usize)> {
    let invalid = || {
        reaction_spectra::Error::Configuration(format!(
            "anchors must be two channels \"ch1,ch2\", got {:?}",
            text
        ))
    };
    let (first, second) = text.split_once(',').ok_or_else(invalid)?;
    let first: usize = first.trim().parse().map_err(|_| invalid())?;
    let second: usize = second.trim().parse().map_err(|_| invalid())?;
    Ok((first, second))
}
