//! Calibrate command handler: fit the model's factors to noon reports.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use windmar_lib::vessel::{current_profile, set_calibration};
use windmar_lib::{load_noon_reports, CalibrationFactors, Calibrator, WindmarConfig};

use super::CommandContext;
use crate::output::render_calibration;

/// Arguments for the calibrate command.
#[derive(Debug, Clone, Args)]
pub struct CalibrateArgs {
    /// Noon reports as CSV.
    #[arg(long)]
    pub reports: PathBuf,
    /// Start from unit factors instead of the configured ones.
    #[arg(long)]
    pub reset: bool,
    /// Write the configuration with the fitted factors to this path.
    #[arg(long)]
    pub save: Option<PathBuf>,
}

/// Handle the calibrate subcommand.
pub fn handle_calibrate(ctx: &CommandContext, args: &CalibrateArgs) -> Result<()> {
    let reports = load_noon_reports(&args.reports)
        .with_context(|| format!("failed to read noon reports from {}", args.reports.display()))?;
    let initial = if args.reset {
        CalibrationFactors::default()
    } else {
        current_profile().factors
    };

    let calibrator = Calibrator::new(ctx.model()?).with_config(ctx.config.calibration)?;
    let outcome = calibrator
        .calibrate(&reports, initial)
        .context("calibration failed")?;
    let profile = set_calibration(outcome.factors).context("fitted factors were rejected")?;

    if let Some(path) = &args.save {
        let mut config = ctx.config.clone();
        config.vessel = *profile;
        save_config(path, &config)?;
        info!(path = %path.display(), "saved calibrated configuration");
    }

    ctx.emit(&outcome, render_calibration)
}

fn save_config(path: &Path, config: &WindmarConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config).context("failed to serialise configuration")?;
    fs::write(path, json + "\n")
        .with_context(|| format!("failed to write configuration to {}", path.display()))
}
