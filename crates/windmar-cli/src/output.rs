//! Output formatting for command results.
//!
//! Every command produces a serialisable value. `--format json` prints it as
//! pretty JSON; `--format text` uses the renderers below or the library's
//! plain-text summaries.

use std::fmt::Write as _;
use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use windmar_lib::{
    CalibrationOutcome, Error as LibError, FuelEstimate, FuelScenario, VesselProfileView,
};

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Write a value as pretty JSON followed by a newline.
///
/// # Errors
///
/// Returns an error if JSON serialization or writing fails.
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, value).map_err(io::Error::other)?;
    stdout.write_all(b"\n")?;
    Ok(())
}

/// Plain-text rendering of one leg's fuel estimate.
pub fn render_fuel(estimate: &FuelEstimate) -> String {
    let mut buffer = String::new();
    let _ = writeln!(buffer, "Fuel: {:.2} t", estimate.fuel_mt);
    let _ = writeln!(
        buffer,
        "Power: {:.0} kW ({:.0}% MCR)",
        estimate.power_kw,
        estimate.engine_load * 100.0
    );
    let _ = writeln!(
        buffer,
        "Time: {:.2} h at {:.2} kn over ground",
        estimate.time_hours, estimate.speed_over_ground_kts
    );
    let parts = &estimate.fuel_breakdown;
    let _ = writeln!(
        buffer,
        "Breakdown: calm {:.2} t, wind {:.2} t, waves {:.2} t",
        parts.calm, parts.wind, parts.wave
    );
    let resistance = &estimate.resistance_breakdown_kn;
    let _ = writeln!(
        buffer,
        "Resistance: calm {:.1} kN, wind {:.1} kN, waves {:.1} kN, total {:.1} kN",
        resistance.calm_water, resistance.wind, resistance.waves, resistance.total
    );
    buffer
}

/// Plain-text table of comparison scenarios.
pub fn render_scenarios(scenarios: &[FuelScenario]) -> String {
    let width = scenarios
        .iter()
        .map(|scenario| scenario.name.len())
        .max()
        .unwrap_or(0);
    let mut buffer = String::new();
    for scenario in scenarios {
        let _ = writeln!(
            buffer,
            "{:<width$}  {:>7.2} t  {:>6.0} kW  {}",
            scenario.name, scenario.fuel_mt, scenario.power_kw, scenario.conditions
        );
    }
    buffer
}

/// The calibrator's own report, which already reads as text.
pub fn render_calibration(outcome: &CalibrationOutcome) -> String {
    outcome.report.clone()
}

/// Plain-text view of the active vessel.
pub fn render_profile(view: &VesselProfileView) -> String {
    let specs = &view.specs;
    let mut buffer = String::new();
    let _ = writeln!(
        buffer,
        "Vessel: {:.0} dwt, {:.1} m x {:.1} m",
        specs.dwt, specs.loa, specs.beam
    );
    let _ = writeln!(
        buffer,
        "Drafts: laden {:.1} m, ballast {:.1} m",
        specs.draft_laden, specs.draft_ballast
    );
    let _ = writeln!(
        buffer,
        "Engine: {:.0} kW MCR, SFOC {:.0} g/kWh ({} curve)",
        specs.mcr_kw, specs.sfoc_at_mcr, view.consumption_curve
    );
    let _ = writeln!(
        buffer,
        "Service speed: laden {:.1} kn, ballast {:.1} kn",
        specs.service_speed_laden, specs.service_speed_ballast
    );
    for (label, hull) in [("laden", &view.laden), ("ballast", &view.ballast)] {
        let _ = writeln!(
            buffer,
            "Hull ({label}): displacement {:.0} t, Cb {:.3}, wetted surface {:.0} m2",
            hull.displacement_t, hull.block_coefficient, hull.wetted_surface_m2
        );
    }
    let factors = &view.factors;
    let _ = writeln!(
        buffer,
        "Calibration: calm water {:.3}, wind {:.3}, waves {:.3}",
        factors.calm_water, factors.wind, factors.waves
    );
    buffer
}

/// Error as printed by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorOutput {
    pub kind: String,
    pub message: String,
}

impl ErrorOutput {
    /// Classify an error chain. Library errors keep their kind; anything else is a
    /// CLI usage error.
    pub fn from_error(err: &anyhow::Error) -> Self {
        let kind = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<LibError>())
            .map(|lib| lib.kind().to_string())
            .unwrap_or_else(|| "cli".to_string());
        Self {
            kind,
            message: format!("{err:#}"),
        }
    }

    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => format!("error[{}]: {}", self.kind, self.message),
            OutputFormat::Json => serde_json::to_string(self)
                .unwrap_or_else(|_| format!("{{\"kind\":\"{}\"}}", self.kind)),
        }
    }
}
